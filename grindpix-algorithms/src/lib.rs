//! grindpix-algorithms: Segmentation and statistics for grind analysis.
//!
//! This crate turns a grayscale capture into a calibrated particle-size
//! distribution:
//! - **Binarize** - fixed or Otsu threshold, dark grounds as foreground
//! - **Components** - 8-connected flood fill with post-growth size filter
//! - **Geometry** - Moore-neighbor boundary, equivalent diameter, shape
//! - **Statistics** - weighted moments, percentiles, histogram, Poisson
//!   intervals and a spherical extraction model
//!
#![warn(missing_docs)]

pub mod binarize;
pub mod boundary;
mod cancel;
pub mod classifier;
pub mod components;
pub mod extraction;
pub mod geometry;
pub mod histogram;
pub mod poisson;
mod processing;
pub mod reference;
pub mod statistics;
mod worker;

pub use binarize::{binarize, otsu_threshold, ThresholdMode, DEFAULT_THRESHOLD};
pub use boundary::{boundary_length, contour_length, trace_boundary};
pub use cancel::CancellationToken;
pub use classifier::category_shares;
pub use components::{
    Component, ComponentConfig, ComponentExtractor, ComponentSet, ComponentStatistics,
};
pub use extraction::{extraction_metrics, ExtractionModel};
pub use geometry::{analyze_components, circularity, equivalent_diameter, measure};
pub use histogram::weighted_histogram;
pub use poisson::{poisson_interval, poisson_interval_with_sigma};
pub use processing::{
    analyze, analyze_mask, analyze_with_cancel, compute_distribution, confidence, summarize,
    AnalysisConfig, Weighting,
};
pub use reference::{calibrate_from_reference, find_reference};
pub use statistics::{distribution_summary, percentile, weighted_mean, weighted_std_dev};
pub use worker::{spawn_analysis, AnalysisHandle, AnalysisMessage};

// Re-export the core data model used throughout the public API.
pub use grindpix_core::{
    AnalysisOutcome, AnalysisResult, Calibration, CalibrationSource, CategoryTable, Error,
    GrayImage, PixelMask, Result,
};
