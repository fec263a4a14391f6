//! Weighted histogram over equally spaced bins.
#![allow(clippy::cast_precision_loss)]

use grindpix_core::WeightedHistogram;

/// Builds a `bins`-bin weighted histogram spanning `min..=max` of `values`.
///
/// A value equal to the maximum lands in the last bin. When every value is
/// equal, or the spread is too small for `bins` distinct edges, the
/// histogram collapses to one bin of unit width centered on that
/// value. Empty input yields `bins` zero-filled bins over `[0, 1]`. A bin
/// count of 0 is treated as 1. Non-finite values are skipped.
#[must_use]
pub fn weighted_histogram(values: &[f64], weights: &[f64], bins: usize) -> WeightedHistogram {
    let bins = bins.max(1);
    let samples: Vec<(f64, f64)> = values
        .iter()
        .zip(weights)
        .filter(|(v, w)| v.is_finite() && w.is_finite())
        .map(|(&v, &w)| (v, w))
        .collect();

    let (min, max) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(v, _)| {
            (lo.min(v), hi.max(v))
        });

    if samples.is_empty() {
        return zeroed(equal_edges(0.0, 1.0, bins));
    }

    let edges = Some(equal_edges(min, max, bins))
        .filter(|edges| edges.windows(2).all(|w| w[0] < w[1]))
        .unwrap_or_else(|| vec![min - 0.5, min + 0.5]);
    let mut hist = zeroed(edges);
    let lo = hist.edges[0];
    let width = (hist.edges[hist.edges.len() - 1] - lo) / hist.counts.len() as f64;
    let last = hist.counts.len() - 1;

    for (v, w) in samples {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let idx = (((v - lo) / width).floor() as usize).min(last);
        hist.counts[idx] += w;
        hist.occupancy[idx] += 1;
    }

    let total: f64 = hist.counts.iter().sum();
    if total > 0.0 {
        hist.normalized = hist.counts.iter().map(|c| c / total).collect();
    }
    hist
}

fn equal_edges(min: f64, max: f64, bins: usize) -> Vec<f64> {
    let step = (max - min) / bins as f64;
    (0..=bins)
        .map(|i| if i == bins { max } else { min + step * i as f64 })
        .collect()
}

fn zeroed(edges: Vec<f64>) -> WeightedHistogram {
    let bins = edges.len().saturating_sub(1);
    WeightedHistogram {
        edges,
        counts: vec![0.0; bins],
        normalized: vec![0.0; bins],
        occupancy: vec![0; bins],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalized_sums_to_one() {
        let values = [120.0, 340.0, 360.0, 800.0, 1020.0, 410.0];
        let weights = [1.0, 4.0, 2.5, 9.0, 0.5, 3.0];
        let hist = weighted_histogram(&values, &weights, 5);
        assert_eq!(hist.bins(), 5);
        assert_eq!(hist.edges.len(), 6);
        assert_relative_eq!(hist.normalized.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(hist.counts.iter().sum::<f64>(), 20.0);
        assert_eq!(hist.occupancy.iter().sum::<usize>(), values.len());
    }

    #[test]
    fn test_edges_strictly_increasing() {
        let hist = weighted_histogram(&[1.0, 2.0, 10.0], &[1.0; 3], 7);
        assert!(hist.edges.windows(2).all(|w| w[0] < w[1]));
        assert_relative_eq!(hist.edges[0], 1.0);
        assert_relative_eq!(hist.edges[7], 10.0);
    }

    #[test]
    fn test_maximum_lands_in_last_bin() {
        let hist = weighted_histogram(&[0.0, 10.0], &[1.0, 1.0], 4);
        assert_eq!(hist.occupancy, vec![1, 0, 0, 1]);
    }

    #[test]
    fn test_constant_values_single_bin() {
        let hist = weighted_histogram(&[42.0, 42.0, 42.0], &[1.0, 2.0, 3.0], 10);
        assert_eq!(hist.bins(), 1);
        assert_eq!(hist.edges, vec![41.5, 42.5]);
        assert_relative_eq!(hist.counts[0], 6.0);
        assert_relative_eq!(hist.normalized[0], 1.0);
    }

    #[test]
    fn test_nearly_constant_values_single_bin() {
        let hist = weighted_histogram(&[1.0, 1.0 + f64::EPSILON], &[1.0, 1.0], 20);
        assert_eq!(hist.bins(), 1);
        assert!(hist.edges.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(hist.occupancy, vec![2]);
        assert_relative_eq!(hist.normalized[0], 1.0);
    }

    #[test]
    fn test_empty_input() {
        let hist = weighted_histogram(&[], &[], 3);
        assert_eq!(hist.bins(), 3);
        assert!(hist.normalized.iter().all(|&n| n == 0.0));
        assert!(hist.counts.iter().all(|&n| n == 0.0));
    }

    #[test]
    fn test_zero_bins_treated_as_one() {
        let hist = weighted_histogram(&[1.0, 3.0], &[1.0, 1.0], 0);
        assert_eq!(hist.bins(), 1);
        assert_relative_eq!(hist.normalized[0], 1.0);
    }

    #[test]
    fn test_zero_total_weight() {
        let hist = weighted_histogram(&[1.0, 3.0], &[0.0, 0.0], 2);
        assert_eq!(hist.occupancy, vec![1, 1]);
        assert!(hist.normalized.iter().all(|&n| n == 0.0));
    }
}
