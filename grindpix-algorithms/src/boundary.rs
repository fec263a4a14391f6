//! Outer boundary tracing (Moore-neighbor) and boundary length.
//!
//! The trace starts at the component's first pixel in row-major order,
//! whose west neighbor is background, and walks the outer contour
//! clockwise. It stops when the first move is about to be repeated, which
//! also handles one-pixel-wide spurs that are crossed twice.

use std::f64::consts::SQRT_2;

use grindpix_core::PixelCoord;

use crate::components::Component;

/// Clockwise neighbor ring starting at west, with y growing downward.
const RING: [(i64, i64); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

fn ring_index(offset: (i64, i64)) -> Option<usize> {
    RING.iter().position(|&o| o == offset)
}

/// Local occupancy grid of one component, padded by one pixel on each side.
struct LocalGrid {
    width: usize,
    cells: Vec<bool>,
    origin_x: u32,
    origin_y: u32,
}

impl LocalGrid {
    fn new(component: &Component) -> Self {
        let bbox = component.bounding_box();
        let width = bbox.width() as usize + 2;
        let height = bbox.height() as usize + 2;
        let mut cells = vec![false; width * height];
        for p in component.pixels() {
            let lx = (p.x - bbox.min_x) as usize + 1;
            let ly = (p.y - bbox.min_y) as usize + 1;
            if let Some(cell) = cells.get_mut(ly * width + lx) {
                *cell = true;
            }
        }
        Self {
            width,
            cells,
            origin_x: bbox.min_x,
            origin_y: bbox.min_y,
        }
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn is_set(&self, (x, y): (i64, i64)) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.cells
            .get(y as usize * self.width + x as usize)
            .copied()
            .unwrap_or(false)
    }

    #[allow(clippy::cast_possible_wrap)]
    fn first_set(&self) -> Option<(i64, i64)> {
        let idx = self.cells.iter().position(|&c| c)?;
        Some(((idx % self.width) as i64, (idx / self.width) as i64))
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn to_image(&self, (x, y): (i64, i64)) -> PixelCoord {
        PixelCoord::new(
            self.origin_x + (x - 1) as u32,
            self.origin_y + (y - 1) as u32,
        )
    }
}

/// Traces the outer boundary of `component` clockwise.
///
/// The returned contour is closed: the start pixel appears first and, for
/// components of two or more pixels, again last. A single-pixel component
/// yields a one-element contour; an empty component yields an empty one.
#[must_use]
pub fn trace_boundary(component: &Component) -> Vec<PixelCoord> {
    let grid = LocalGrid::new(component);
    let Some(start) = grid.first_set() else {
        return Vec::new();
    };

    let mut contour = vec![grid.to_image(start)];
    let mut current = start;
    // The west neighbor of the first row-major pixel is always background.
    let mut backtrack = 0usize;
    let mut first_move = None;
    let max_steps = 4 * component.len() + 8;

    for _ in 0..max_steps {
        let found = (1..=8).map(|i| (backtrack + i) % 8).find_map(|d| {
            let (dx, dy) = RING[d];
            let candidate = (current.0 + dx, current.1 + dy);
            grid.is_set(candidate).then_some((d, candidate))
        });
        let Some((dir, next)) = found else {
            break;
        };

        match first_move {
            None => first_move = Some((current, next)),
            Some(m) if m == (current, next) => break,
            Some(_) => {}
        }

        let (px, py) = RING[(dir + 7) % 8];
        let examined = (current.0 + px, current.1 + py);
        let Some(b) = ring_index((examined.0 - next.0, examined.1 - next.1)) else {
            break;
        };
        backtrack = b;
        current = next;
        contour.push(grid.to_image(current));
    }

    contour
}

/// Length of a traced contour: 1 per axial step, sqrt(2) per diagonal step.
#[must_use]
pub fn contour_length(contour: &[PixelCoord]) -> f64 {
    contour
        .windows(2)
        .map(|w| {
            let dx = w[0].x.abs_diff(w[1].x);
            let dy = w[0].y.abs_diff(w[1].y);
            if dx != 0 && dy != 0 {
                SQRT_2
            } else if dx != 0 || dy != 0 {
                1.0
            } else {
                0.0
            }
        })
        .sum()
}

/// Traces and measures the outer boundary of `component`.
#[must_use]
pub fn boundary_length(component: &Component) -> f64 {
    contour_length(&trace_boundary(component))
}
