//! grindpix-core: Core types for coffee grind particle analysis.
//!
//! This crate provides the data model shared by the segmentation and
//! statistics stages: grayscale rasters and masks, calibration, size
//! categories, particle measurements, analysis results and errors.
//!

pub mod calibration;
pub mod category;
pub mod error;
pub mod grind;
pub mod image;
pub mod particle;
pub mod result;

pub use calibration::{Calibration, CalibrationSource};
pub use category::{CategoryRange, CategoryTable, SizeCategory};
pub use error::{Error, Result};
pub use grind::{GrindAssessment, GrindProfile, GrindType, GrindVerdict};
pub use image::{GrayImage, PixelCoord, PixelMask};
pub use particle::{AnalyzedParticle, BoundingBox, Particle};
pub use result::{
    AnalysisOutcome, AnalysisResult, CategoryShare, DistributionMetrics, DistributionSummary,
    ExtractionMetrics, PoissonInterval, WeightedHistogram,
};
