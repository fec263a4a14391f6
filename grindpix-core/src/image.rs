//! Raster types: grayscale input images and binary foreground masks.

use crate::{Error, Result};

/// Pixel coordinate in an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PixelCoord {
    /// X coordinate (column).
    pub x: u32,
    /// Y coordinate (row).
    pub y: u32,
}

impl PixelCoord {
    /// Creates a new pixel coordinate.
    #[inline]
    #[must_use]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Checks if this coordinate is adjacent to another (8-connectivity).
    #[inline]
    #[must_use]
    pub fn is_adjacent(&self, other: &Self) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx <= 1 && dy <= 1 && (dx != 0 || dy != 0)
    }
}

/// 8-bit grayscale raster in row-major order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrayImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl GrayImage {
    /// Wraps a row-major buffer of `width * height` intensity samples.
    ///
    /// # Errors
    /// Returns [`Error::ImageProcessingFailure`] when the buffer length does
    /// not match the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = pixel_count(width, height)?;
        if data.len() != expected {
            return Err(Error::ImageProcessingFailure(format!(
                "buffer holds {} samples but {width}x{height} needs {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Creates an image filled with a single intensity.
    #[must_use]
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }

    /// Converts interleaved 8-bit RGB samples to luma (Rec. 601 weights).
    ///
    /// # Errors
    /// Returns [`Error::ImageProcessingFailure`] on a length mismatch.
    pub fn from_rgb8(width: u32, height: u32, rgb: &[u8]) -> Result<Self> {
        Self::from_interleaved(width, height, rgb, 3)
    }

    /// Converts interleaved 8-bit RGBA samples to luma, ignoring alpha.
    ///
    /// # Errors
    /// Returns [`Error::ImageProcessingFailure`] on a length mismatch.
    pub fn from_rgba8(width: u32, height: u32, rgba: &[u8]) -> Result<Self> {
        Self::from_interleaved(width, height, rgba, 4)
    }

    fn from_interleaved(width: u32, height: u32, samples: &[u8], channels: usize) -> Result<Self> {
        let expected = pixel_count(width, height)?.saturating_mul(channels);
        if samples.len() != expected {
            return Err(Error::ImageProcessingFailure(format!(
                "expected {expected} interleaved samples ({channels} channels), got {}",
                samples.len()
            )));
        }
        let data = samples
            .chunks_exact(channels)
            .map(|px| luma(px[0], px[1], px[2]))
            .collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Image width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns true for a zero-area image.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw row-major samples.
    #[inline]
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Intensity at `(x, y)`, or `None` outside the image.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Writes an intensity; out-of-bounds writes are ignored.
    pub fn put(&mut self, x: u32, y: u32, value: u8) {
        if x < self.width && y < self.height {
            let idx = y as usize * self.width as usize + x as usize;
            if let Some(px) = self.data.get_mut(idx) {
                *px = value;
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    y.round().clamp(0.0, 255.0) as u8
}

fn pixel_count(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| Error::ImageProcessingFailure(format!("{width}x{height} overflows")))
}

/// Width x height boolean grid; `true` marks foreground.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl PixelMask {
    /// Creates an all-background mask.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    /// Mask width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns true for a zero-area mask.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Whether `(x, y)` is foreground. Out-of-bounds reads are background.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width
            && y < self.height
            && self
                .bits
                .get(y as usize * self.width as usize + x as usize)
                .copied()
                .unwrap_or(false)
    }

    /// Sets `(x, y)`; out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if x < self.width && y < self.height {
            let idx = y as usize * self.width as usize + x as usize;
            if let Some(bit) = self.bits.get_mut(idx) {
                *bit = value;
            }
        }
    }

    /// Row-major foreground flags.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Number of foreground pixels.
    #[must_use]
    pub fn foreground_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Fraction of the mask that is foreground, 0 for an empty mask.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn foreground_fraction(&self) -> f64 {
        if self.bits.is_empty() {
            0.0
        } else {
            self.foreground_count() as f64 / self.bits.len() as f64
        }
    }
}
