//! Per-category breakdown of a classified particle population.
#![allow(clippy::cast_precision_loss)]

use grindpix_core::{AnalyzedParticle, CategoryShare, CategoryTable, SizeCategory};

/// Count and percentage of particles per table category, in table order.
///
/// Every table category is listed, including empty ones. Percentages are 0
/// for an empty population.
#[must_use]
pub fn category_shares(particles: &[AnalyzedParticle], table: &CategoryTable) -> Vec<CategoryShare> {
    table
        .categories()
        .map(|category| {
            let count = particles.iter().filter(|p| p.category == category).count();
            CategoryShare {
                category,
                count,
                percentage: percent(count, particles.len()),
            }
        })
        .collect()
}

/// Share of particles in the finest table category, in percent.
#[must_use]
pub fn fines_percentage(shares: &[CategoryShare]) -> f64 {
    shares.first().map_or(0.0, |s| s.percentage)
}

/// Share of particles in coarse categories, in percent.
///
/// The finest category never counts as coarse, so fines and coarse
/// together never exceed 100.
#[must_use]
pub fn coarse_percentage(shares: &[CategoryShare]) -> f64 {
    shares
        .iter()
        .skip(1)
        .filter(|s| SizeCategory::is_coarse(s.category))
        .map(|s| s.percentage)
        .sum()
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
