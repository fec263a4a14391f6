//! Grayscale thresholding into a foreground mask.
//!
//! Grounds are dark on a light background, so foreground is
//! `intensity < threshold`.

use grindpix_core::{GrayImage, PixelMask};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Threshold used when no better choice is available.
pub const DEFAULT_THRESHOLD: u8 = 128;

/// How the binarization threshold is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ThresholdMode {
    /// A fixed intensity threshold.
    Fixed(u8),
    /// Otsu's method on the image histogram.
    Otsu,
}

impl Default for ThresholdMode {
    fn default() -> Self {
        Self::Fixed(DEFAULT_THRESHOLD)
    }
}

impl ThresholdMode {
    /// Resolves the mode to a concrete threshold for `image`.
    #[must_use]
    pub fn resolve(self, image: &GrayImage) -> u8 {
        match self {
            Self::Fixed(t) => t,
            Self::Otsu => otsu_threshold(image),
        }
    }
}

/// Marks every pixel darker than `threshold` as foreground.
///
/// A zero-size image yields an empty mask.
#[must_use]
pub fn binarize(image: &GrayImage, threshold: u8) -> PixelMask {
    let mut mask = PixelMask::new(image.width(), image.height());
    let width = image.width() as usize;
    if width == 0 {
        return mask;
    }
    for (idx, &value) in image.as_raw().iter().enumerate() {
        if value < threshold {
            #[allow(clippy::cast_possible_truncation)]
            mask.set((idx % width) as u32, (idx / width) as u32, true);
        }
    }
    mask
}

/// Otsu threshold, expressed so that `intensity < threshold` selects the
/// darker class.
///
/// Images with a single intensity (or no pixels) have no class split and
/// return [`DEFAULT_THRESHOLD`].
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn otsu_threshold(image: &GrayImage) -> u8 {
    let mut hist = [0u64; 256];
    for &v in image.as_raw() {
        hist[v as usize] += 1;
    }

    let total = image.as_raw().len() as f64;
    let sum_all: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &n)| i as f64 * n as f64)
        .sum();

    let mut weight_bg = 0.0;
    let mut sum_bg = 0.0;
    let mut best_variance = 0.0;
    let mut best = None;

    for (t, &n) in hist.iter().enumerate() {
        weight_bg += n as f64;
        if weight_bg == 0.0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg <= 0.0 {
            break;
        }
        sum_bg += t as f64 * n as f64;
        let mean_bg = sum_bg / weight_bg;
        let mean_fg = (sum_all - sum_bg) / weight_fg;
        let between = weight_bg * weight_fg * (mean_bg - mean_fg).powi(2);
        if between > best_variance {
            best_variance = between;
            best = Some(t);
        }
    }

    best.map_or(DEFAULT_THRESHOLD, |t| (t + 1).min(255) as u8)
}
