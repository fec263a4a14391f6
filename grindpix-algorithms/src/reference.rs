//! Reference-object calibration.
//!
//! A disc of known size (a coin, a calibration dot) is placed in the frame.
//! It is the largest sufficiently round particle in the image.

use grindpix_core::{Calibration, Error, Particle, Result};

use crate::geometry::{circularity, equivalent_diameter};

/// Index of the reference particle: the largest by area among those with
/// circularity of at least `min_circularity`. Ties keep the earliest.
#[must_use]
pub fn find_reference(particles: &[Particle], min_circularity: f64) -> Option<usize> {
    particles
        .iter()
        .enumerate()
        .filter(|(_, p)| circularity(p.area_pixels, p.boundary_length_pixels) >= min_circularity)
        .fold(None, |best: Option<(usize, usize)>, (idx, p)| match best {
            Some((_, area)) if area >= p.area_pixels => best,
            _ => Some((idx, p.area_pixels)),
        })
        .map(|(idx, _)| idx)
}

/// Removes the reference particle from `particles` and derives the
/// calibration from its equivalent diameter.
///
/// # Errors
/// [`Error::InvalidCalibration`] when no particle qualifies or the known
/// diameter is not positive.
pub fn calibrate_from_reference(
    particles: &mut Vec<Particle>,
    known_diameter_um: f64,
    min_circularity: f64,
) -> Result<Calibration> {
    let idx = find_reference(particles, min_circularity).ok_or_else(|| {
        Error::InvalidCalibration(format!(
            "no reference object with circularity >= {min_circularity}"
        ))
    })?;
    let reference = particles.remove(idx);
    let measured_px = equivalent_diameter(reference.area_pixels);
    let calibration = Calibration::from_reference(known_diameter_um, measured_px)?;
    log::debug!(
        "reference object: {} px area, {measured_px:.2} px diameter -> {:.4} um/px",
        reference.area_pixels,
        calibration.microns_per_pixel()
    );
    Ok(calibration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use grindpix_core::{BoundingBox, PixelCoord};

    fn particle(area_pixels: usize, boundary_length_pixels: f64) -> Particle {
        Particle {
            bounding_box: BoundingBox::from_pixel(PixelCoord::new(0, 0)),
            area_pixels,
            boundary_length_pixels,
        }
    }

    #[test]
    fn test_picks_largest_round_particle() {
        // Round: 4 pi 314 / 63^2 ~ 0.99. Elongated: 4 pi 1000 / 400^2 ~ 0.08.
        let particles = vec![particle(50, 26.0), particle(1000, 400.0), particle(314, 63.0)];
        assert_eq!(find_reference(&particles, 0.8), Some(2));
        assert_eq!(find_reference(&particles, 0.0), Some(1));
    }

    #[test]
    fn test_no_candidate() {
        let particles = vec![particle(1000, 400.0)];
        assert_eq!(find_reference(&particles, 0.8), None);
        assert_eq!(find_reference(&[], 0.0), None);

        let mut particles = particles;
        assert!(matches!(
            calibrate_from_reference(&mut particles, 24_260.0, 0.8),
            Err(Error::InvalidCalibration(_))
        ));
        assert_eq!(particles.len(), 1);
    }

    #[test]
    fn test_calibration_removes_reference() {
        let mut particles = vec![particle(30, 20.0), particle(314, 63.0)];
        let cal = calibrate_from_reference(&mut particles, 2000.0, 0.8).unwrap();
        assert_eq!(particles.len(), 1);
        assert_eq!(particles[0].area_pixels, 30);
        assert_relative_eq!(
            cal.microns_per_pixel(),
            2000.0 / equivalent_diameter(314),
            epsilon = 1e-9
        );
    }
}
