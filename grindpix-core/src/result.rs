//! Analysis output types.
//!
//! Everything here is owned data with no ties to the transient buffers of a
//! run. With the `serde` feature enabled every type round-trips through JSON.

use std::time::Duration;

use crate::category::SizeCategory;
use crate::particle::AnalyzedParticle;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Percentile summary of a diameter population.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DistributionSummary {
    /// 10th percentile.
    pub d10: f64,
    /// Median.
    pub d50: f64,
    /// 90th percentile.
    pub d90: f64,
    /// `(d90 - d10) / d50`.
    pub span: f64,
    /// `1 / (1 + span)`, in `[0, 1]`; higher is more uniform.
    pub uniformity: f64,
}

/// Weighted histogram over equally spaced bins.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WeightedHistogram {
    /// `bins + 1` strictly increasing edges.
    pub edges: Vec<f64>,
    /// Accumulated weight per bin.
    pub counts: Vec<f64>,
    /// `counts` divided by the total weight; sums to 1 for non-empty input.
    pub normalized: Vec<f64>,
    /// Number of particles per bin, independent of weighting.
    pub occupancy: Vec<usize>,
}

impl WeightedHistogram {
    /// Number of bins.
    #[must_use]
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// Bin centers.
    #[must_use]
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }

    /// Whether the histogram holds no bins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Counting-noise interval around an observed count.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoissonInterval {
    /// Observed count.
    pub count: usize,
    /// Lower bound, 0 for a zero count.
    pub lower: f64,
    /// Upper bound, strictly positive even for a zero count.
    pub upper: f64,
}

impl PoissonInterval {
    /// Interval width divided by the count; infinite for a zero count.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn relative_width(&self) -> f64 {
        if self.count == 0 {
            return f64::INFINITY;
        }
        (self.upper - self.lower) / self.count as f64
    }
}

/// Brewing model derived from equivalent-sphere particle geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtractionMetrics {
    /// Sum of particle volumes in cubic microns.
    pub total_volume_um3: f64,
    /// Sum of reachable volumes in cubic microns.
    pub attainable_volume_um3: f64,
    /// Total particle mass in micrograms.
    pub total_mass_ug: f64,
    /// Reachable particle mass in micrograms.
    pub attainable_mass_ug: f64,
    /// Mean per-particle extraction yield, in `[0, 100]`.
    pub mean_yield_percent: f64,
    /// Mean surface area in square microns.
    pub mean_surface_um2: f64,
    /// Surface area standard deviation in square microns.
    pub surface_std_dev_um2: f64,
    /// `mean_surface / surface_std_dev`, 0 when the deviation is 0.
    pub quality_score: f64,
}

impl ExtractionMetrics {
    /// Share of the total mass that is reachable by extraction, in percent.
    ///
    /// Exactly 100 when every particle is fully attainable; 0 for an empty
    /// population.
    #[must_use]
    pub fn efficiency(&self) -> f64 {
        if self.total_mass_ug > 0.0 {
            self.attainable_mass_ug / self.total_mass_ug * 100.0
        } else {
            0.0
        }
    }
}

/// Distribution metrics over calibrated diameters.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DistributionMetrics {
    /// 10th percentile diameter (um).
    pub d10: f64,
    /// Median diameter (um).
    pub d50: f64,
    /// 90th percentile diameter (um).
    pub d90: f64,
    /// `(d90 - d10) / d50`.
    pub span: f64,
    /// Bounded inverse of the span.
    pub uniformity: f64,
    /// Weighted mean diameter (um).
    pub weighted_mean: f64,
    /// Weighted standard deviation of the diameter (um).
    pub weighted_std_dev: f64,
    /// Weighted diameter histogram.
    pub histogram: WeightedHistogram,
    /// Counting-noise interval per histogram bin.
    pub poisson_intervals: Vec<PoissonInterval>,
    /// Extraction and mass model.
    pub extraction: ExtractionMetrics,
}

impl DistributionMetrics {
    /// The percentile part of the metrics.
    #[must_use]
    pub fn summary(&self) -> DistributionSummary {
        DistributionSummary {
            d10: self.d10,
            d50: self.d50,
            d90: self.d90,
            span: self.span,
            uniformity: self.uniformity,
        }
    }
}

/// Particle count and share for one size category.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CategoryShare {
    /// The category.
    pub category: SizeCategory,
    /// Particles assigned to it.
    pub count: usize,
    /// Share of all particles, in percent.
    pub percentage: f64,
}

/// Result of analysing one image.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisResult {
    /// Particles that survived noise filtering.
    pub particle_count: usize,
    /// Distribution metrics.
    pub distribution: DistributionMetrics,
    /// Per-category breakdown in table order.
    pub size_distribution: Vec<CategoryShare>,
    /// Share of particles in the finest category, in percent.
    pub fines_percentage: f64,
    /// Share of particles in the coarse categories, in percent.
    pub coarse_percentage: f64,
    /// Arithmetic mean diameter (um).
    pub average_size: f64,
    /// Median diameter (um).
    pub median_size: f64,
    /// Population standard deviation of the diameter (um).
    pub std_dev_size: f64,
    /// Smallest diameter (um).
    pub min_size: f64,
    /// Largest diameter (um).
    pub max_size: f64,
    /// Uniformity in percent (`uniformity * 100`).
    pub uniformity_score: f64,
    /// Count-based confidence in `[0, 100]`.
    pub confidence: f64,
    /// Microns per pixel used for this run.
    pub microns_per_pixel: f64,
    /// Wall-clock time of the analysis.
    pub processing_duration: Duration,
    /// Per-particle measurements, in discovery order.
    pub particles: Vec<AnalyzedParticle>,
}

impl AnalysisResult {
    /// Share of a given category, 0 when absent.
    #[must_use]
    pub fn percentage_of(&self, category: SizeCategory) -> f64 {
        self.size_distribution
            .iter()
            .find(|s| s.category == category)
            .map_or(0.0, |s| s.percentage)
    }
}

/// Outcome of a completed analysis.
///
/// An image without particles is an expected outcome, not an error: it
/// still carries a complete result with neutral statistics.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// At least one particle was measured.
    Analyzed(AnalysisResult),
    /// Segmentation found no particles.
    NoParticlesDetected(AnalysisResult),
}

impl AnalysisOutcome {
    /// The result, regardless of particle count.
    #[must_use]
    pub fn result(&self) -> &AnalysisResult {
        match self {
            Self::Analyzed(r) | Self::NoParticlesDetected(r) => r,
        }
    }

    /// Consumes the outcome, returning the result.
    #[must_use]
    pub fn into_result(self) -> AnalysisResult {
        match self {
            Self::Analyzed(r) | Self::NoParticlesDetected(r) => r,
        }
    }

    /// Whether no particles were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoParticlesDetected(_))
    }

    /// Converts the no-particle case into [`Error::NoParticlesDetected`].
    ///
    /// # Errors
    /// Returns [`Error::NoParticlesDetected`] when nothing was segmented.
    pub fn require_particles(self) -> Result<AnalysisResult> {
        match self {
            Self::Analyzed(r) => Ok(r),
            Self::NoParticlesDetected(_) => Err(Error::NoParticlesDetected),
        }
    }
}
