//! Counting-noise intervals (Gehrels 1986 approximation).
#![allow(clippy::cast_precision_loss)]

use grindpix_core::PoissonInterval;

/// One-sigma interval on an observed count.
#[must_use]
pub fn poisson_interval(count: usize) -> PoissonInterval {
    poisson_interval_with_sigma(count, 1.0)
}

/// Interval on an observed count at `sigma` standard deviations.
///
/// Upper: `n + S sqrt(n + 3/4) + (S^2 + 3) / 4`.
/// Lower: `n (1 - 1/(9n) - S/(3 sqrt n))^3`, floored at 0, and 0 for `n = 0`.
#[must_use]
pub fn poisson_interval_with_sigma(count: usize, sigma: f64) -> PoissonInterval {
    let n = count as f64;
    let upper = n + sigma * (n + 0.75).sqrt() + (sigma * sigma + 3.0) / 4.0;
    let lower = if count == 0 {
        0.0
    } else {
        (n * (1.0 - 1.0 / (9.0 * n) - sigma / (3.0 * n.sqrt())).powi(3)).max(0.0)
    };
    PoissonInterval {
        count,
        lower,
        upper,
    }
}

/// Intervals for each bin occupancy.
#[must_use]
pub fn poisson_intervals(counts: &[usize]) -> Vec<PoissonInterval> {
    counts.iter().map(|&c| poisson_interval(c)).collect()
}
