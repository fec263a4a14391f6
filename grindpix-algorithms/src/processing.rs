//! End-to-end analysis: binarize, extract, measure, calibrate, summarize.
#![allow(clippy::cast_precision_loss)]

use std::f64::consts::PI;
use std::time::{Duration, Instant};

use grindpix_core::{
    AnalysisOutcome, AnalysisResult, AnalyzedParticle, CalibrationSource,
    CategoryTable, DistributionMetrics, Error, GrayImage, PixelMask, Result,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::binarize::{binarize, ThresholdMode};
use crate::cancel::CancellationToken;
use crate::classifier::{category_shares, coarse_percentage, fines_percentage};
use crate::components::{ComponentConfig, ComponentExtractor};
use crate::extraction::{extraction_metrics, ExtractionModel};
use crate::geometry::{analyze_particles, measure_components};
use crate::histogram::weighted_histogram;
use crate::poisson::{poisson_interval, poisson_intervals};
use crate::reference::calibrate_from_reference;
use crate::statistics::{
    distribution_summary, mean, percentile, sorted, std_dev, weighted_mean, weighted_std_dev,
};

/// Per-particle weight used by the weighted statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Weighting {
    /// Every particle counts once.
    Count,
    /// Weight by pixel area.
    #[default]
    Area,
    /// Weight by equivalent-sphere volume, a proxy for mass.
    Volume,
}

impl Weighting {
    /// Weight of one particle.
    #[must_use]
    pub fn weight(self, particle: &AnalyzedParticle) -> f64 {
        match self {
            Self::Count => 1.0,
            Self::Area => particle.area_pixels() as f64,
            Self::Volume => PI / 6.0 * particle.diameter_um.powi(3),
        }
    }
}

/// Configuration for one analysis run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisConfig {
    /// Binarization threshold.
    pub threshold: ThresholdMode,
    /// Components with fewer pixels are discarded as noise.
    pub min_particle_pixels: usize,
    /// Components with more pixels are discarded as artifacts.
    pub max_particle_pixels: Option<usize>,
    /// Number of histogram bins.
    pub histogram_bins: usize,
    /// Weight for mean, standard deviation and histogram.
    pub weighting: Weighting,
    /// Use the `sum(weight) - 1` denominator for the weighted deviation.
    pub unbiased_std_dev: bool,
    /// Extraction model constants.
    pub extraction: ExtractionModel,
    /// Size category table.
    pub categories: CategoryTable,
    /// Measure particles on the rayon pool.
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold: ThresholdMode::default(),
            min_particle_pixels: 10,
            max_particle_pixels: None,
            histogram_bins: 20,
            weighting: Weighting::default(),
            unbiased_std_dev: false,
            extraction: ExtractionModel::default(),
            categories: CategoryTable::default(),
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the threshold mode.
    #[must_use]
    pub fn with_threshold(mut self, threshold: ThresholdMode) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the minimum particle size in pixels.
    #[must_use]
    pub fn with_min_particle_pixels(mut self, pixels: usize) -> Self {
        self.min_particle_pixels = pixels;
        self
    }

    /// Sets the maximum particle size in pixels.
    #[must_use]
    pub fn with_max_particle_pixels(mut self, pixels: usize) -> Self {
        self.max_particle_pixels = Some(pixels);
        self
    }

    /// Sets the histogram bin count.
    #[must_use]
    pub fn with_histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = bins;
        self
    }

    /// Sets the weighting.
    #[must_use]
    pub fn with_weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// Selects the unbiased weighted deviation.
    #[must_use]
    pub fn with_unbiased_std_dev(mut self, unbiased: bool) -> Self {
        self.unbiased_std_dev = unbiased;
        self
    }

    /// Sets the extraction model.
    #[must_use]
    pub fn with_extraction(mut self, extraction: ExtractionModel) -> Self {
        self.extraction = extraction;
        self
    }

    /// Sets the category table.
    #[must_use]
    pub fn with_categories(mut self, categories: CategoryTable) -> Self {
        self.categories = categories;
        self
    }

    /// Enables or disables parallel measurement.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Checks the size filter and extraction constants.
    ///
    /// # Errors
    /// [`Error::InvalidConfig`] on an inverted size filter or a
    /// non-positive extraction constant.
    pub fn validate(&self) -> Result<()> {
        if let Some(max) = self.max_particle_pixels {
            if max < self.min_particle_pixels {
                return Err(Error::InvalidConfig(format!(
                    "max_particle_pixels ({max}) is below min_particle_pixels ({})",
                    self.min_particle_pixels
                )));
            }
        }
        let ExtractionModel {
            extractable_depth_um,
            density_g_per_cm3,
        } = self.extraction;
        if !(extractable_depth_um.is_finite() && extractable_depth_um > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "extractable depth must be positive, got {extractable_depth_um}"
            )));
        }
        if !(density_g_per_cm3.is_finite() && density_g_per_cm3 > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "density must be positive, got {density_g_per_cm3}"
            )));
        }
        Ok(())
    }

    fn component_config(&self) -> ComponentConfig {
        let config = ComponentConfig::new().with_min_size(self.min_particle_pixels);
        match self.max_particle_pixels {
            Some(max) => config.with_max_size(max),
            None => config,
        }
    }
}

/// Analyzes one grayscale image.
///
/// # Errors
/// [`Error::InvalidCalibration`] when the calibration cannot be
/// established, [`Error::InvalidConfig`] for an inconsistent configuration.
pub fn analyze(
    image: &GrayImage,
    source: &CalibrationSource,
    config: &AnalysisConfig,
) -> Result<AnalysisOutcome> {
    analyze_with_cancel(image, source, config, None)
}

/// Analyzes one grayscale image, stopping early when `cancel` fires.
///
/// # Errors
/// As [`analyze`], plus [`Error::Cancelled`].
pub fn analyze_with_cancel(
    image: &GrayImage,
    source: &CalibrationSource,
    config: &AnalysisConfig,
    cancel: Option<&CancellationToken>,
) -> Result<AnalysisOutcome> {
    run(image, source, config, cancel, &mut |_, _| {})
}

/// Analyzes an already binarized mask.
///
/// # Errors
/// As [`analyze_with_cancel`].
pub fn analyze_mask(
    mask: &PixelMask,
    source: &CalibrationSource,
    config: &AnalysisConfig,
    cancel: Option<&CancellationToken>,
) -> Result<AnalysisOutcome> {
    config.validate()?;
    let start = Instant::now();
    segment_and_summarize(mask, source, config, cancel, &mut |_, _| {}, start)
}

pub(crate) fn run(
    image: &GrayImage,
    source: &CalibrationSource,
    config: &AnalysisConfig,
    cancel: Option<&CancellationToken>,
    progress: &mut dyn FnMut(f32, &str),
) -> Result<AnalysisOutcome> {
    config.validate()?;
    let start = Instant::now();

    progress(0.0, "binarizing");
    let threshold = config.threshold.resolve(image);
    let mask = binarize(image, threshold);
    log::debug!(
        "binarized {}x{} image at threshold {threshold}: {} foreground px",
        image.width(),
        image.height(),
        mask.foreground_count()
    );

    segment_and_summarize(&mask, source, config, cancel, progress, start)
}

fn segment_and_summarize(
    mask: &PixelMask,
    source: &CalibrationSource,
    config: &AnalysisConfig,
    cancel: Option<&CancellationToken>,
    progress: &mut dyn FnMut(f32, &str),
    start: Instant,
) -> Result<AnalysisOutcome> {
    if !mask.is_empty() && mask.foreground_count() == mask.as_slice().len() {
        log::warn!("mask is entirely foreground; check lighting or threshold");
    }

    progress(0.2, "extracting components");
    let set = ComponentExtractor::new(config.component_config()).extract(mask, cancel)?;

    progress(0.6, "measuring particles");
    let mut measured = measure_components(&set.components, config.parallel);
    drop(set);

    let calibration = match *source {
        CalibrationSource::Fixed(calibration) => Some(calibration),
        CalibrationSource::Reference { .. } if measured.is_empty() => None,
        CalibrationSource::Reference {
            known_diameter_um,
            min_circularity,
        } => Some(calibrate_from_reference(
            &mut measured,
            known_diameter_um,
            min_circularity,
        )?),
    };

    let particles = match calibration {
        Some(cal) => analyze_particles(measured, &cal, &config.categories, config.parallel),
        None => Vec::new(),
    };

    progress(0.8, "computing statistics");
    let microns_per_pixel = calibration.map_or(0.0, |c| c.microns_per_pixel());
    let mut result = summarize(particles, microns_per_pixel, config);
    result.processing_duration = start.elapsed();
    log::debug!(
        "analysis finished: {} particles, d50 {:.1} um in {:?}",
        result.particle_count,
        result.distribution.d50,
        result.processing_duration
    );
    progress(1.0, "done");

    Ok(if result.particle_count == 0 {
        AnalysisOutcome::NoParticlesDetected(result)
    } else {
        AnalysisOutcome::Analyzed(result)
    })
}

/// Distribution metrics over calibrated diameters.
///
/// Never fails; an empty population yields neutral values.
#[must_use]
pub fn compute_distribution(
    particles: &[AnalyzedParticle],
    config: &AnalysisConfig,
) -> DistributionMetrics {
    let diameters: Vec<f64> = particles.iter().map(|p| p.diameter_um).collect();
    let weights: Vec<f64> = particles.iter().map(|p| config.weighting.weight(p)).collect();
    let summary = distribution_summary(&sorted(&diameters));
    let histogram = weighted_histogram(&diameters, &weights, config.histogram_bins);
    let poisson = poisson_intervals(&histogram.occupancy);

    DistributionMetrics {
        d10: summary.d10,
        d50: summary.d50,
        d90: summary.d90,
        span: summary.span,
        uniformity: summary.uniformity,
        weighted_mean: weighted_mean(&diameters, &weights),
        weighted_std_dev: weighted_std_dev(&diameters, &weights, config.unbiased_std_dev),
        histogram,
        poisson_intervals: poisson,
        extraction: extraction_metrics(particles, &config.extraction),
    }
}

/// Count-based confidence in `[0, 100]` from the counting noise of the
/// particle total; 0 without particles.
#[must_use]
pub fn confidence(particle_count: usize) -> f64 {
    if particle_count == 0 {
        return 0.0;
    }
    let interval = poisson_interval(particle_count);
    (100.0 * (1.0 - interval.relative_width() / 2.0)).clamp(0.0, 100.0)
}

/// Assembles the full result for a calibrated particle population.
///
/// The processing duration is left at zero for the caller to fill in.
#[must_use]
pub fn summarize(
    particles: Vec<AnalyzedParticle>,
    microns_per_pixel: f64,
    config: &AnalysisConfig,
) -> AnalysisResult {
    let diameters = sorted(&particles.iter().map(|p| p.diameter_um).collect::<Vec<_>>());
    let distribution = compute_distribution(&particles, config);
    let shares = category_shares(&particles, &config.categories);

    AnalysisResult {
        particle_count: particles.len(),
        fines_percentage: fines_percentage(&shares),
        coarse_percentage: coarse_percentage(&shares),
        size_distribution: shares,
        average_size: mean(&diameters),
        median_size: percentile(&diameters, 0.5),
        std_dev_size: std_dev(&diameters),
        min_size: diameters.first().copied().unwrap_or(0.0),
        max_size: diameters.last().copied().unwrap_or(0.0),
        uniformity_score: distribution.uniformity * 100.0,
        confidence: confidence(particles.len()),
        microns_per_pixel,
        processing_duration: Duration::ZERO,
        distribution,
        particles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use grindpix_core::{Calibration, SizeCategory};

    fn image_with_squares(squares: &[(u32, u32, u32)]) -> GrayImage {
        let mut image = GrayImage::filled(64, 64, 230);
        for &(x0, y0, side) in squares {
            for y in y0..y0 + side {
                for x in x0..x0 + side {
                    image.put(x, y, 20);
                }
            }
        }
        image
    }

    fn fixed(mpp: f64) -> CalibrationSource {
        Calibration::new(mpp).unwrap().into()
    }

    #[test]
    fn test_config_builder() {
        let config = AnalysisConfig::new()
            .with_threshold(ThresholdMode::Otsu)
            .with_min_particle_pixels(4)
            .with_max_particle_pixels(400)
            .with_histogram_bins(8)
            .with_weighting(Weighting::Count)
            .with_unbiased_std_dev(true)
            .with_parallel(false);
        assert_eq!(config.threshold, ThresholdMode::Otsu);
        assert_eq!(config.min_particle_pixels, 4);
        assert_eq!(config.max_particle_pixels, Some(400));
        assert_eq!(config.histogram_bins, 8);
        assert_eq!(config.weighting, Weighting::Count);
        assert!(config.unbiased_std_dev);
        assert!(!config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_filter() {
        let config = AnalysisConfig::new()
            .with_min_particle_pixels(50)
            .with_max_particle_pixels(10);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config =
            AnalysisConfig::new().with_extraction(ExtractionModel::new().with_density(0.0));
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_squares_counted_and_ordered() {
        let image = image_with_squares(&[(40, 4, 6), (4, 4, 3), (10, 30, 12)]);
        let config = AnalysisConfig::new().with_min_particle_pixels(1);
        let outcome = analyze(&image, &fixed(20.0), &config).unwrap();
        let result = outcome.require_particles().unwrap();
        assert_eq!(result.particle_count, 3);
        let areas: Vec<usize> = result.particles.iter().map(AnalyzedParticle::area_pixels).collect();
        // Row-major discovery: (4,4) before (40,4) before (10,30).
        assert_eq!(areas, vec![9, 36, 144]);
        assert_relative_eq!(result.microns_per_pixel, 20.0);
        assert!(result.min_size <= result.median_size && result.median_size <= result.max_size);
    }

    #[test]
    fn test_noise_filter() {
        let image = image_with_squares(&[(4, 4, 3), (30, 30, 10)]);
        let config = AnalysisConfig::new().with_min_particle_pixels(10);
        let result = analyze(&image, &fixed(10.0), &config).unwrap().into_result();
        assert_eq!(result.particle_count, 1);
        assert_eq!(result.particles[0].area_pixels(), 100);
    }

    #[test]
    fn test_empty_image_is_no_particles() {
        let image = GrayImage::filled(32, 32, 255);
        let outcome = analyze(&image, &fixed(10.0), &AnalysisConfig::default()).unwrap();
        assert!(outcome.is_empty());
        let result = outcome.into_result();
        assert_eq!(result.particle_count, 0);
        assert_relative_eq!(result.confidence, 0.0);
        assert_relative_eq!(result.distribution.extraction.efficiency(), 0.0);
        assert!(result.size_distribution.iter().all(|s| s.percentage == 0.0));
    }

    #[test]
    fn test_zero_size_image() {
        let image = GrayImage::new(0, 0, Vec::new()).unwrap();
        let outcome = analyze(&image, &fixed(10.0), &AnalysisConfig::default()).unwrap();
        assert!(outcome.is_empty());
    }

    #[test]
    fn test_reference_calibration_excludes_reference() {
        // The 12x12 square is the largest round-enough blob.
        let image = image_with_squares(&[(4, 4, 5), (40, 4, 6), (10, 30, 12)]);
        let equivalent = 2.0 * (144.0 / PI).sqrt();
        let source = CalibrationSource::Reference {
            known_diameter_um: 5000.0,
            min_circularity: 0.5,
        };
        let result = analyze(&image, &source, &AnalysisConfig::default())
            .unwrap()
            .into_result();
        assert_eq!(result.particle_count, 2);
        assert_relative_eq!(result.microns_per_pixel, 5000.0 / equivalent, epsilon = 1e-9);
    }

    #[test]
    fn test_reference_without_candidate() {
        // A 1-pixel-high line is far from round.
        let mut image = GrayImage::filled(64, 8, 255);
        for x in 2..60 {
            image.put(x, 3, 0);
        }
        let result = analyze(&image, &CalibrationSource::reference(1000.0), &AnalysisConfig::default());
        assert!(matches!(result, Err(Error::InvalidCalibration(_))));
    }

    #[test]
    fn test_cancelled() {
        let image = image_with_squares(&[(4, 4, 5)]);
        let token = CancellationToken::new();
        token.cancel();
        let result = analyze_with_cancel(&image, &fixed(10.0), &AnalysisConfig::default(), Some(&token));
        assert_eq!(result.unwrap_err(), Error::Cancelled);
    }

    #[test]
    fn test_confidence_grows_with_count() {
        assert_relative_eq!(confidence(0), 0.0);
        assert!(confidence(10) < confidence(100));
        assert!(confidence(100) < confidence(10_000));
        assert!(confidence(10_000) <= 100.0);
    }

    #[test]
    fn test_weighting() {
        let image = image_with_squares(&[(4, 4, 4), (30, 30, 16)]);
        let count = analyze(
            &image,
            &fixed(10.0),
            &AnalysisConfig::new().with_weighting(Weighting::Count),
        )
        .unwrap()
        .into_result();
        let area = analyze(&image, &fixed(10.0), &AnalysisConfig::default())
            .unwrap()
            .into_result();
        assert_relative_eq!(count.distribution.weighted_mean, count.average_size);
        assert!(area.distribution.weighted_mean > count.distribution.weighted_mean);
    }

    #[test]
    fn test_summarize_percentages() {
        let image = image_with_squares(&[(4, 4, 4), (30, 30, 16)]);
        // 4x4 -> ~4.5 px -> ~226 um (Fines); 16x16 -> ~18 px -> ~903 um (Coarse).
        let result = analyze(&image, &fixed(50.0), &AnalysisConfig::default())
            .unwrap()
            .into_result();
        assert_relative_eq!(result.fines_percentage, 50.0);
        assert_relative_eq!(result.coarse_percentage, 50.0);
        assert_relative_eq!(result.percentage_of(SizeCategory::Coarse), 50.0);
        assert!(result.fines_percentage + result.coarse_percentage <= 100.0);
    }
}
