//! Weighted moments and percentiles over diameter populations.
//!
//! Every function returns a defined neutral value (0) for degenerate input
//! instead of NaN.
#![allow(clippy::cast_precision_loss)]

use grindpix_core::DistributionSummary;

/// `sum(value * weight) / sum(weight)`; 0 for empty input or zero total weight.
///
/// Extra values or weights beyond the shorter slice are ignored.
#[must_use]
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> f64 {
    let (sum, total) = values
        .iter()
        .zip(weights)
        .fold((0.0, 0.0), |(s, t), (&v, &w)| (s + v * w, t + w));
    if total > 0.0 {
        sum / total
    } else {
        0.0
    }
}

/// Weighted standard deviation around the weighted mean.
///
/// The population form divides by `sum(weight)`; `unbiased` divides by
/// `sum(weight) - 1` instead. Returns 0 for fewer than two values or a
/// non-positive denominator.
#[must_use]
pub fn weighted_std_dev(values: &[f64], weights: &[f64], unbiased: bool) -> f64 {
    let n = values.len().min(weights.len());
    if n < 2 {
        return 0.0;
    }
    let mean = weighted_mean(values, weights);
    let (sum_sq, total) = values
        .iter()
        .zip(weights)
        .fold((0.0, 0.0), |(s, t), (&v, &w)| (s + w * (v - mean).powi(2), t + w));
    let denominator = if unbiased { total - 1.0 } else { total };
    if denominator > 0.0 {
        (sum_sq / denominator).sqrt()
    } else {
        0.0
    }
}

/// Arithmetic mean; 0 for empty input.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Population standard deviation; 0 for fewer than two values.
#[must_use]
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Linear-interpolation percentile of an ascending slice.
///
/// The rank is `p * (n - 1)` with `p` clamped to `[0, 1]`. Integral ranks
/// return the element itself; others interpolate between the bracketing
/// elements. Empty input gives 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted {
        [] => 0.0,
        [only] => *only,
        _ => {
            let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
            let rank = p * (sorted.len() - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let (Some(&lo), Some(&hi)) = (sorted.get(lower), sorted.get(upper)) else {
                return 0.0;
            };
            if lower == upper {
                lo
            } else {
                lo + (hi - lo) * (rank - lower as f64)
            }
        }
    }
}

/// Sorts a copy of `values` ascending, placing NaN last.
#[must_use]
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// D10/D50/D90, span and uniformity of an ascending slice.
///
/// Empty input and a zero median both give an all-zero summary.
#[must_use]
pub fn distribution_summary(sorted: &[f64]) -> DistributionSummary {
    let d50 = percentile(sorted, 0.5);
    if sorted.is_empty() || d50 <= 0.0 {
        return DistributionSummary::default();
    }
    let d10 = percentile(sorted, 0.1);
    let d90 = percentile(sorted, 0.9);
    let span = (d90 - d10) / d50;
    DistributionSummary {
        d10,
        d50,
        d90,
        span,
        uniformity: 1.0 / (1.0 + span.max(0.0)),
    }
}
