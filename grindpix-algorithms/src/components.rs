//! Connected-component extraction.
//!
//! Iterative flood fill with 8-connectivity over a binary mask. A visited
//! grid of the same size guarantees every foreground pixel is claimed by
//! exactly one component. Components are emitted in row-major order of
//! their first (top-left) pixel, and the size filter runs only after a
//! component has finished growing.

use grindpix_core::{BoundingBox, Error, PixelCoord, PixelMask, Result};

use crate::cancel::CancellationToken;

/// Offsets of the eight neighbors (cardinal and diagonal).
pub(crate) const NEIGHBORS_8: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Configuration for component extraction.
#[derive(Debug, Clone)]
pub struct ComponentConfig {
    /// Components with fewer pixels are discarded as noise.
    pub min_size: usize,
    /// Components with more pixels are discarded as artifacts.
    pub max_size: Option<usize>,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            min_size: 10,
            max_size: None,
        }
    }
}

impl ComponentConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum component size.
    #[must_use]
    pub fn with_min_size(mut self, size: usize) -> Self {
        self.min_size = size;
        self
    }

    /// Sets the maximum component size.
    #[must_use]
    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_size = Some(size);
        self
    }

    fn accepts(&self, size: usize) -> bool {
        size >= self.min_size && self.max_size.is_none_or(|max| size <= max)
    }
}

/// A maximal 8-connected set of foreground pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pixels: Vec<PixelCoord>,
    bounding_box: BoundingBox,
}

impl Component {
    /// Builds a component from its member pixels; `None` when empty.
    #[must_use]
    pub fn from_pixels(pixels: Vec<PixelCoord>) -> Option<Self> {
        let first = *pixels.first()?;
        let mut bounding_box = BoundingBox::from_pixel(first);
        for &p in &pixels {
            bounding_box.include(p);
        }
        Some(Self {
            pixels,
            bounding_box,
        })
    }

    /// Member pixels in fill order.
    #[must_use]
    pub fn pixels(&self) -> &[PixelCoord] {
        &self.pixels
    }

    /// Number of member pixels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Always false for components produced by the extractor.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Bounding box of the member pixels.
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }
}

/// Counters from one extraction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComponentStatistics {
    /// Foreground pixels in the mask.
    pub foreground_pixels: usize,
    /// Components discovered before filtering.
    pub components_found: usize,
    /// Components that passed the size filter.
    pub components_kept: usize,
    /// Pixels belonging to discarded components.
    pub discarded_pixels: usize,
}

/// Components that survived filtering, plus counters.
#[derive(Debug, Clone, Default)]
pub struct ComponentSet {
    /// Retained components in discovery order.
    pub components: Vec<Component>,
    /// Extraction counters.
    pub statistics: ComponentStatistics,
}

/// Flood-fill connected-component extractor.
#[derive(Debug, Clone, Default)]
pub struct ComponentExtractor {
    config: ComponentConfig,
}

impl ComponentExtractor {
    /// Create with custom configuration.
    #[must_use]
    pub fn new(config: ComponentConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &ComponentConfig {
        &self.config
    }

    /// Extracts the connected components of `mask`.
    ///
    /// The cancellation token, if any, is checked before each new
    /// component is grown and at the start of every row.
    ///
    /// # Errors
    /// Returns [`Error::Cancelled`] when the token fires.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn extract(
        &self,
        mask: &PixelMask,
        cancel: Option<&CancellationToken>,
    ) -> Result<ComponentSet> {
        let width = mask.width() as usize;
        let height = mask.height() as usize;
        let bits = mask.as_slice();
        let mut set = ComponentSet::default();
        if bits.is_empty() {
            return Ok(set);
        }

        let is_cancelled = || cancel.is_some_and(CancellationToken::is_cancelled);
        let mut visited = vec![false; bits.len()];
        let mut stack: Vec<usize> = Vec::new();

        for start in 0..bits.len() {
            if start % width == 0 && is_cancelled() {
                return Err(Error::Cancelled);
            }
            if !bits[start] || visited[start] {
                continue;
            }
            if is_cancelled() {
                return Err(Error::Cancelled);
            }

            visited[start] = true;
            stack.push(start);
            let mut pixels = Vec::new();

            while let Some(idx) = stack.pop() {
                let (x, y) = (idx % width, idx / width);
                pixels.push(PixelCoord::new(x as u32, y as u32));

                for (dx, dy) in NEIGHBORS_8 {
                    let nx = x as isize + dx;
                    let ny = y as isize + dy;
                    if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                        continue;
                    }
                    let n = ny as usize * width + nx as usize;
                    if bits[n] && !visited[n] {
                        visited[n] = true;
                        stack.push(n);
                    }
                }
            }

            set.statistics.components_found += 1;
            set.statistics.foreground_pixels += pixels.len();
            if !self.config.accepts(pixels.len()) {
                set.statistics.discarded_pixels += pixels.len();
                continue;
            }
            if let Some(component) = Component::from_pixels(pixels) {
                set.components.push(component);
            }
        }

        set.statistics.components_kept = set.components.len();
        log::debug!(
            "extracted {} of {} components ({} foreground px, {} discarded px)",
            set.statistics.components_kept,
            set.statistics.components_found,
            set.statistics.foreground_pixels,
            set.statistics.discarded_pixels
        );
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from_rows(rows: &[&str]) -> PixelMask {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.len()) as u32;
        let mut mask = PixelMask::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                mask.set(x as u32, y as u32, ch == '#');
            }
        }
        mask
    }

    fn extract_all(mask: &PixelMask) -> ComponentSet {
        ComponentExtractor::new(ComponentConfig::new().with_min_size(1))
            .extract(mask, None)
            .unwrap()
    }

    #[test]
    fn test_diagonal_pixels_connect() {
        let mask = mask_from_rows(&["#..", ".#.", "..#"]);
        let set = extract_all(&mask);
        assert_eq!(set.components.len(), 1);
        assert_eq!(set.components[0].len(), 3);
    }

    #[test]
    fn test_row_major_discovery_order() {
        let mask = mask_from_rows(&["...##", "#....", "#..#."]);
        let set = extract_all(&mask);
        let firsts: Vec<PixelCoord> = set
            .components
            .iter()
            .map(|c| c.pixels()[0])
            .collect();
        assert_eq!(
            firsts,
            vec![
                PixelCoord::new(3, 0),
                PixelCoord::new(0, 1),
                PixelCoord::new(3, 2),
            ]
        );
        let sizes: Vec<usize> = set.components.iter().map(Component::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn test_min_size_applies_after_growth() {
        // A 1-pixel-wide snake of 6 pixels must survive min_size = 5 even
        // though every local neighborhood is tiny.
        let mask = mask_from_rows(&["######", "......", "#....."]);
        let set = ComponentExtractor::new(ComponentConfig::new().with_min_size(5))
            .extract(&mask, None)
            .unwrap();
        assert_eq!(set.components.len(), 1);
        assert_eq!(set.components[0].len(), 6);
        assert_eq!(set.statistics.components_found, 2);
        assert_eq!(set.statistics.discarded_pixels, 1);
    }

    #[test]
    fn test_max_size_filter() {
        let mask = mask_from_rows(&["###.#", "###..", "###.."]);
        let config = ComponentConfig::new().with_min_size(1).with_max_size(4);
        let set = ComponentExtractor::new(config).extract(&mask, None).unwrap();
        assert_eq!(set.components.len(), 1);
        assert_eq!(set.components[0].len(), 1);
    }

    #[test]
    fn test_empty_mask() {
        let set = extract_all(&PixelMask::new(0, 0));
        assert!(set.components.is_empty());
        let set = extract_all(&PixelMask::new(4, 4));
        assert!(set.components.is_empty());
        assert_eq!(set.statistics.foreground_pixels, 0);
    }

    #[test]
    fn test_cancelled_before_start() {
        let mask = mask_from_rows(&["##", "##"]);
        let token = CancellationToken::new();
        token.cancel();
        let result = ComponentExtractor::default().extract(&mask, Some(&token));
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_bounding_box() {
        let mask = mask_from_rows(&[".....", ".##..", "..##.", "....."]);
        let set = extract_all(&mask);
        let bbox = set.components[0].bounding_box();
        assert_eq!((bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y), (1, 1, 3, 2));
    }
}
