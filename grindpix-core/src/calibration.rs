//! Pixel-to-micron calibration.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Microns-per-pixel scale for one analysis run.
///
/// Construction validates the factor, so a `Calibration` in hand is always
/// finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Calibration {
    microns_per_pixel: f64,
}

impl Calibration {
    /// Creates a calibration from a known microns-per-pixel factor.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCalibration`] for zero, negative, or
    /// non-finite factors.
    pub fn new(microns_per_pixel: f64) -> Result<Self> {
        if !microns_per_pixel.is_finite() || microns_per_pixel <= 0.0 {
            return Err(Error::InvalidCalibration(format!(
                "microns per pixel must be positive and finite, got {microns_per_pixel}"
            )));
        }
        Ok(Self { microns_per_pixel })
    }

    /// Derives the factor from a reference object of known physical size.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCalibration`] if either diameter is not
    /// strictly positive.
    pub fn from_reference(known_diameter_um: f64, measured_diameter_px: f64) -> Result<Self> {
        if !known_diameter_um.is_finite() || known_diameter_um <= 0.0 {
            return Err(Error::InvalidCalibration(format!(
                "reference diameter must be positive, got {known_diameter_um} um"
            )));
        }
        if !measured_diameter_px.is_finite() || measured_diameter_px <= 0.0 {
            return Err(Error::InvalidCalibration(format!(
                "measured reference diameter must be positive, got {measured_diameter_px} px"
            )));
        }
        Self::new(known_diameter_um / measured_diameter_px)
    }

    /// The microns-per-pixel factor.
    #[inline]
    #[must_use]
    pub fn microns_per_pixel(&self) -> f64 {
        self.microns_per_pixel
    }

    /// Converts a pixel length to microns.
    #[inline]
    #[must_use]
    pub fn to_microns(&self, pixels: f64) -> f64 {
        pixels * self.microns_per_pixel
    }
}

/// Where the calibration for a run comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationSource {
    /// A factor supplied by the caller.
    Fixed(Calibration),
    /// A disc of known diameter in the frame, e.g. a coin.
    ///
    /// The largest particle with circularity of at least `min_circularity`
    /// is used as the reference and excluded from the statistics.
    Reference {
        /// Physical diameter of the reference object in microns.
        known_diameter_um: f64,
        /// Minimum circularity for a particle to qualify.
        min_circularity: f64,
    },
}

impl CalibrationSource {
    /// Reference-object calibration with the default circularity gate.
    #[must_use]
    pub fn reference(known_diameter_um: f64) -> Self {
        Self::Reference {
            known_diameter_um,
            min_circularity: 0.8,
        }
    }
}

impl From<Calibration> for CalibrationSource {
    fn from(calibration: Calibration) -> Self {
        Self::Fixed(calibration)
    }
}
