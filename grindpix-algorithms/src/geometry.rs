//! Particle geometry: area, boundary, equivalent diameter and shape.
#![allow(clippy::cast_precision_loss)]

use std::f64::consts::PI;

use grindpix_core::{AnalyzedParticle, Calibration, CategoryTable, Particle};
use rayon::prelude::*;

use crate::boundary::boundary_length;
use crate::components::Component;

/// Diameter of the circle with the same area.
#[inline]
#[must_use]
pub fn equivalent_diameter(area_pixels: usize) -> f64 {
    2.0 * (area_pixels as f64 / PI).sqrt()
}

/// `4 pi A / P^2`, or 0 when the boundary length is 0.
///
/// Not clamped: a digital contour runs through pixel centers and is
/// shorter than the true outline, which pushes small blobs above 1.
#[inline]
#[must_use]
pub fn circularity(area_pixels: usize, boundary_length: f64) -> f64 {
    if boundary_length > 0.0 {
        4.0 * PI * area_pixels as f64 / (boundary_length * boundary_length)
    } else {
        0.0
    }
}

/// Measures one component in pixel space.
///
/// Returns `None` for an empty component, which the extractor never emits.
#[must_use]
pub fn measure(component: &Component) -> Option<Particle> {
    if component.is_empty() {
        return None;
    }
    Some(Particle {
        bounding_box: component.bounding_box(),
        area_pixels: component.len(),
        boundary_length_pixels: boundary_length(component),
    })
}

/// Calibrates and classifies a measured particle.
#[must_use]
pub fn analyze_particle(
    particle: Particle,
    calibration: &Calibration,
    categories: &CategoryTable,
) -> AnalyzedParticle {
    let diameter_px = equivalent_diameter(particle.area_pixels);
    let diameter_um = calibration.to_microns(diameter_px);
    let bbox = particle.bounding_box;
    AnalyzedParticle {
        particle,
        diameter_px,
        diameter_um,
        circularity: circularity(particle.area_pixels, particle.boundary_length_pixels),
        aspect_ratio: f64::from(bbox.width()) / f64::from(bbox.height()),
        category: categories.classify(diameter_um),
    }
}

/// Measures every component, in discovery order.
///
/// With `parallel` set the per-component work runs on the rayon pool; the
/// output is identical either way.
#[must_use]
pub fn measure_components(components: &[Component], parallel: bool) -> Vec<Particle> {
    if parallel {
        components.par_iter().filter_map(measure).collect()
    } else {
        components.iter().filter_map(measure).collect()
    }
}

/// Calibrates and classifies measured particles, preserving order.
#[must_use]
pub fn analyze_particles(
    particles: Vec<Particle>,
    calibration: &Calibration,
    categories: &CategoryTable,
    parallel: bool,
) -> Vec<AnalyzedParticle> {
    if parallel {
        particles
            .into_par_iter()
            .map(|p| analyze_particle(p, calibration, categories))
            .collect()
    } else {
        particles
            .into_iter()
            .map(|p| analyze_particle(p, calibration, categories))
            .collect()
    }
}

/// Measures, calibrates and classifies every component, in discovery order.
#[must_use]
pub fn analyze_components(
    components: &[Component],
    calibration: &Calibration,
    categories: &CategoryTable,
    parallel: bool,
) -> Vec<AnalyzedParticle> {
    analyze_particles(
        measure_components(components, parallel),
        calibration,
        categories,
        parallel,
    )
}
