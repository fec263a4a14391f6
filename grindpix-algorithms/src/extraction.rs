//! Spherical-particle extraction and mass model.
//!
//! Each particle is treated as a sphere with its calibrated equivalent
//! diameter. Water reaches a fixed depth below the surface; any core deeper
//! than that is unreachable.

use std::f64::consts::PI;

use grindpix_core::{AnalyzedParticle, ExtractionMetrics};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::statistics::{mean, std_dev};

/// Physical constants of the extraction model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtractionModel {
    /// Depth below the surface reached by extraction, in microns.
    pub extractable_depth_um: f64,
    /// Bulk density of roasted coffee, in g/cm^3.
    pub density_g_per_cm3: f64,
}

impl Default for ExtractionModel {
    fn default() -> Self {
        Self {
            extractable_depth_um: 100.0,
            density_g_per_cm3: 1.2,
        }
    }
}

impl ExtractionModel {
    /// Creates a model with default constants.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the extractable depth.
    #[must_use]
    pub fn with_extractable_depth_um(mut self, depth: f64) -> Self {
        self.extractable_depth_um = depth;
        self
    }

    /// Sets the density.
    #[must_use]
    pub fn with_density(mut self, density_g_per_cm3: f64) -> Self {
        self.density_g_per_cm3 = density_g_per_cm3;
        self
    }

    /// Density in micrograms per cubic micron.
    #[must_use]
    pub fn density_ug_per_um3(&self) -> f64 {
        // 1 g/cm^3 = 1e6 ug / 1e12 um^3
        self.density_g_per_cm3 * 1e-6
    }

    /// Volume and reachable volume of a sphere of radius `radius_um`.
    ///
    /// The reachable volume equals the full volume exactly when the radius
    /// does not exceed the extractable depth.
    #[must_use]
    pub fn volumes(&self, radius_um: f64) -> (f64, f64) {
        let r = radius_um.max(0.0);
        let volume = sphere_volume(r);
        let depth = self.extractable_depth_um.max(0.0);
        let attainable = if r <= depth {
            volume
        } else {
            volume - sphere_volume(r - depth)
        };
        (volume, attainable)
    }

    /// Reachable share of a particle's volume, in `[0, 100]`.
    ///
    /// Decreases as the particle (and its surface) grows.
    #[must_use]
    pub fn yield_percent(&self, radius_um: f64) -> f64 {
        let (volume, attainable) = self.volumes(radius_um);
        if volume > 0.0 {
            (attainable / volume * 100.0).clamp(0.0, 100.0)
        } else {
            100.0
        }
    }
}

fn sphere_volume(r: f64) -> f64 {
    4.0 / 3.0 * PI * r.powi(3)
}

fn sphere_surface(r: f64) -> f64 {
    4.0 * PI * r * r
}

/// Aggregates the extraction model over a particle population.
///
/// An empty population yields all-zero metrics.
#[must_use]
pub fn extraction_metrics(
    particles: &[AnalyzedParticle],
    model: &ExtractionModel,
) -> ExtractionMetrics {
    if particles.is_empty() {
        return ExtractionMetrics::default();
    }

    let density = model.density_ug_per_um3();
    let mut metrics = ExtractionMetrics::default();
    let mut yields = Vec::with_capacity(particles.len());
    let mut surfaces = Vec::with_capacity(particles.len());

    for particle in particles {
        let radius = particle.radius_um();
        let (volume, attainable) = model.volumes(radius);
        metrics.total_volume_um3 += volume;
        metrics.attainable_volume_um3 += attainable;
        yields.push(model.yield_percent(radius));
        surfaces.push(sphere_surface(radius));
    }

    metrics.total_mass_ug = metrics.total_volume_um3 * density;
    metrics.attainable_mass_ug = metrics.attainable_volume_um3 * density;
    metrics.mean_yield_percent = mean(&yields);
    metrics.mean_surface_um2 = mean(&surfaces);
    metrics.surface_std_dev_um2 = std_dev(&surfaces);
    metrics.quality_score = if metrics.surface_std_dev_um2 > 0.0 {
        metrics.mean_surface_um2 / metrics.surface_std_dev_um2
    } else {
        0.0
    };
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use grindpix_core::{BoundingBox, Particle, PixelCoord, SizeCategory};

    fn particle_with_diameter(diameter_um: f64) -> AnalyzedParticle {
        AnalyzedParticle {
            particle: Particle {
                bounding_box: BoundingBox::from_pixel(PixelCoord::new(0, 0)),
                area_pixels: 1,
                boundary_length_pixels: 0.0,
            },
            diameter_px: 1.0,
            diameter_um,
            circularity: 0.0,
            aspect_ratio: 1.0,
            category: SizeCategory::Medium,
        }
    }

    #[test]
    fn test_fully_attainable_efficiency_is_exact() {
        // Radii 50 and 100 um, both within the 100 um depth.
        let particles = [particle_with_diameter(100.0), particle_with_diameter(200.0)];
        let metrics = extraction_metrics(&particles, &ExtractionModel::default());
        assert_eq!(metrics.attainable_mass_ug, metrics.total_mass_ug);
        assert_eq!(metrics.efficiency(), 100.0);
        assert_relative_eq!(metrics.mean_yield_percent, 100.0);
    }

    #[test]
    fn test_core_reduces_efficiency() {
        let particles = [particle_with_diameter(100.0), particle_with_diameter(900.0)];
        let metrics = extraction_metrics(&particles, &ExtractionModel::default());
        assert!(metrics.efficiency() < 100.0);
        assert!(metrics.efficiency() > 0.0);
    }

    #[test]
    fn test_yield_decreases_with_size() {
        let model = ExtractionModel::default();
        let yields: Vec<f64> = [150.0, 300.0, 600.0, 1200.0]
            .iter()
            .map(|&r| model.yield_percent(r))
            .collect();
        assert!(yields.windows(2).all(|w| w[1] < w[0]));
        assert!(yields.iter().all(|y| (0.0..=100.0).contains(y)));
    }

    #[test]
    fn test_mass_uses_density() {
        let model = ExtractionModel::default().with_density(1.0);
        let particles = [particle_with_diameter(200.0)];
        let metrics = extraction_metrics(&particles, &model);
        assert_relative_eq!(metrics.total_mass_ug, metrics.total_volume_um3 * 1e-6);
    }

    #[test]
    fn test_quality_score() {
        let same = [particle_with_diameter(400.0), particle_with_diameter(400.0)];
        let metrics = extraction_metrics(&same, &ExtractionModel::default());
        assert_relative_eq!(metrics.quality_score, 0.0);

        let mixed = [particle_with_diameter(200.0), particle_with_diameter(600.0)];
        let metrics = extraction_metrics(&mixed, &ExtractionModel::default());
        assert_relative_eq!(
            metrics.quality_score,
            metrics.mean_surface_um2 / metrics.surface_std_dev_um2
        );
    }

    #[test]
    fn test_empty_population() {
        let metrics = extraction_metrics(&[], &ExtractionModel::default());
        assert_eq!(metrics, ExtractionMetrics::default());
        assert_eq!(metrics.efficiency(), 0.0);
    }
}
