//! Particle measurement types.

use crate::category::SizeCategory;
use crate::image::PixelCoord;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Inclusive pixel bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    /// Leftmost column.
    pub min_x: u32,
    /// Topmost row.
    pub min_y: u32,
    /// Rightmost column.
    pub max_x: u32,
    /// Bottom row.
    pub max_y: u32,
}

impl BoundingBox {
    /// A box covering exactly one pixel.
    #[must_use]
    pub fn from_pixel(p: PixelCoord) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }

    /// Grows the box to include `p`.
    pub fn include(&mut self, p: PixelCoord) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    /// Width in pixels (at least 1).
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    /// Height in pixels (at least 1).
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Whether `p` lies inside the box.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: PixelCoord) -> bool {
        (self.min_x..=self.max_x).contains(&p.x) && (self.min_y..=self.max_y).contains(&p.y)
    }
}

/// Raw pixel-space measurements of one segmented particle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Particle {
    /// Bounding box of the member pixels.
    pub bounding_box: BoundingBox,
    /// Exact member pixel count.
    pub area_pixels: usize,
    /// Length of the traced outer boundary, in pixels.
    pub boundary_length_pixels: f64,
}

/// A particle with calibrated size, shape descriptors and category.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalyzedParticle {
    /// Pixel-space measurements.
    pub particle: Particle,
    /// Equivalent circular diameter in pixels.
    pub diameter_px: f64,
    /// Equivalent circular diameter in microns.
    pub diameter_um: f64,
    /// `4 pi A / P^2`.
    ///
    /// Digital boundaries under-estimate the perimeter of small blobs, so
    /// values slightly above 1 occur and are reported as measured.
    pub circularity: f64,
    /// Bounding box width over height.
    pub aspect_ratio: f64,
    /// Assigned size category.
    pub category: SizeCategory,
}

impl AnalyzedParticle {
    /// Pixel area.
    #[inline]
    #[must_use]
    pub fn area_pixels(&self) -> usize {
        self.particle.area_pixels
    }

    /// Equivalent-sphere radius in microns.
    #[inline]
    #[must_use]
    pub fn radius_um(&self) -> f64 {
        self.diameter_um / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_growth() {
        let mut bbox = BoundingBox::from_pixel(PixelCoord::new(5, 5));
        assert_eq!((bbox.width(), bbox.height()), (1, 1));

        bbox.include(PixelCoord::new(2, 7));
        bbox.include(PixelCoord::new(8, 6));
        assert_eq!(bbox.min_x, 2);
        assert_eq!(bbox.max_x, 8);
        assert_eq!(bbox.min_y, 5);
        assert_eq!(bbox.max_y, 7);
        assert_eq!((bbox.width(), bbox.height()), (7, 3));
        assert!(bbox.contains(PixelCoord::new(4, 6)));
        assert!(!bbox.contains(PixelCoord::new(9, 6)));
    }
}
