//! Size categories and the category table used by the classifier.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ordered particle size category, finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SizeCategory {
    /// Dust-like particles; over-extraction risk.
    Fines,
    /// Fine grounds.
    Fine,
    /// Medium grounds.
    Medium,
    /// Coarse grounds.
    Coarse,
    /// Boulders; under-extraction risk.
    ExtraCoarse,
}

impl SizeCategory {
    /// All categories in ascending size order.
    pub const ALL: [Self; 5] = [
        Self::Fines,
        Self::Fine,
        Self::Medium,
        Self::Coarse,
        Self::ExtraCoarse,
    ];

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Fines => "Fines",
            Self::Fine => "Fine",
            Self::Medium => "Medium",
            Self::Coarse => "Coarse",
            Self::ExtraCoarse => "Extra Coarse",
        }
    }

    /// Whether the category counts toward the coarse share of a result.
    #[must_use]
    pub fn is_coarse(self) -> bool {
        matches!(self, Self::Coarse | Self::ExtraCoarse)
    }
}

impl std::fmt::Display for SizeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of a category table: `[min_um, max_um)`; `max_um = None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CategoryRange {
    /// Category assigned to diameters in this range.
    pub category: SizeCategory,
    /// Inclusive lower bound in microns.
    pub min_um: f64,
    /// Exclusive upper bound in microns.
    pub max_um: Option<f64>,
}

impl CategoryRange {
    /// Creates a bounded range.
    #[must_use]
    pub fn new(category: SizeCategory, min_um: f64, max_um: f64) -> Self {
        Self {
            category,
            min_um,
            max_um: Some(max_um),
        }
    }

    /// Creates a range with no upper bound.
    #[must_use]
    pub fn open(category: SizeCategory, min_um: f64) -> Self {
        Self {
            category,
            min_um,
            max_um: None,
        }
    }

    /// Whether `diameter_um` falls inside the range.
    #[inline]
    #[must_use]
    pub fn contains(&self, diameter_um: f64) -> bool {
        diameter_um >= self.min_um && self.max_um.is_none_or(|max| diameter_um < max)
    }
}

/// Ordered, gap-free partition of `[0, inf)` into size categories.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CategoryTable {
    ranges: Vec<CategoryRange>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self {
            ranges: vec![
                CategoryRange::new(SizeCategory::Fines, 0.0, 400.0),
                CategoryRange::new(SizeCategory::Fine, 400.0, 600.0),
                CategoryRange::new(SizeCategory::Medium, 600.0, 800.0),
                CategoryRange::new(SizeCategory::Coarse, 800.0, 1000.0),
                CategoryRange::open(SizeCategory::ExtraCoarse, 1000.0),
            ],
        }
    }
}

impl CategoryTable {
    /// Validates and wraps a list of ranges.
    ///
    /// The first range must start at 0, each range must start where the
    /// previous one ended, bounds must increase, categories must ascend,
    /// and only the last range may be open-ended.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] describing the first violation.
    #[allow(clippy::float_cmp)]
    pub fn new(ranges: Vec<CategoryRange>) -> Result<Self> {
        let Some(first) = ranges.first() else {
            return Err(Error::InvalidConfig("category table is empty".into()));
        };
        if first.min_um != 0.0 {
            return Err(Error::InvalidConfig(format!(
                "category table must start at 0 um, starts at {}",
                first.min_um
            )));
        }

        for pair in ranges.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            let Some(max) = lower.max_um else {
                return Err(Error::InvalidConfig(format!(
                    "{} is open-ended but is not the last range",
                    lower.category
                )));
            };
            if max <= lower.min_um {
                return Err(Error::InvalidConfig(format!(
                    "{} has an empty range [{}, {max})",
                    lower.category, lower.min_um
                )));
            }
            if upper.min_um != max {
                return Err(Error::InvalidConfig(format!(
                    "gap or overlap between {} and {} at {max} um",
                    lower.category, upper.category
                )));
            }
            if upper.category <= lower.category {
                return Err(Error::InvalidConfig(format!(
                    "categories out of order: {} follows {}",
                    upper.category, lower.category
                )));
            }
        }

        if let Some(last) = ranges.last() {
            if last.max_um.is_some_and(|max| max <= last.min_um) {
                return Err(Error::InvalidConfig(format!(
                    "{} has an empty range",
                    last.category
                )));
            }
        }

        Ok(Self { ranges })
    }

    /// The table rows in ascending order.
    #[must_use]
    pub fn ranges(&self) -> &[CategoryRange] {
        &self.ranges
    }

    /// The coarsest category, used as catch-all above every bound.
    #[must_use]
    pub fn coarsest(&self) -> SizeCategory {
        self.ranges
            .last()
            .map_or(SizeCategory::ExtraCoarse, |r| r.category)
    }

    /// Assigns a calibrated diameter to the first range containing it.
    ///
    /// Diameters above every bound fall into the coarsest category;
    /// non-finite or negative inputs fall into the finest.
    #[must_use]
    pub fn classify(&self, diameter_um: f64) -> SizeCategory {
        if diameter_um.is_nan() || diameter_um < 0.0 {
            return self
                .ranges
                .first()
                .map_or(SizeCategory::Fines, |r| r.category);
        }
        self.ranges
            .iter()
            .find(|r| r.contains(diameter_um))
            .map_or_else(|| self.coarsest(), |r| r.category)
    }

    /// Categories present in the table, finest first.
    pub fn categories(&self) -> impl Iterator<Item = SizeCategory> + '_ {
        self.ranges.iter().map(|r| r.category)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for CategoryTable {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            ranges: Vec<CategoryRange>,
        }
        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.ranges).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_classification() {
        let table = CategoryTable::default();
        assert_eq!(table.classify(0.0), SizeCategory::Fines);
        assert_eq!(table.classify(300.0), SizeCategory::Fines);
        assert_eq!(table.classify(400.0), SizeCategory::Fine);
        assert_eq!(table.classify(599.9), SizeCategory::Fine);
        assert_eq!(table.classify(700.0), SizeCategory::Medium);
        assert_eq!(table.classify(900.0), SizeCategory::Coarse);
        assert_eq!(table.classify(1000.0), SizeCategory::ExtraCoarse);
        assert_eq!(table.classify(1.0e9), SizeCategory::ExtraCoarse);
        assert_eq!(table.classify(f64::NAN), SizeCategory::Fines);
    }

    #[test]
    fn test_bounded_table_catch_all() {
        let table = CategoryTable::new(vec![
            CategoryRange::new(SizeCategory::Fines, 0.0, 100.0),
            CategoryRange::new(SizeCategory::Medium, 100.0, 500.0),
        ])
        .unwrap();
        assert_eq!(table.classify(50.0), SizeCategory::Fines);
        assert_eq!(table.classify(5_000.0), SizeCategory::Medium);
    }

    #[test]
    fn test_rejects_gaps_and_overlaps() {
        let gap = CategoryTable::new(vec![
            CategoryRange::new(SizeCategory::Fines, 0.0, 100.0),
            CategoryRange::open(SizeCategory::Fine, 150.0),
        ]);
        assert!(matches!(gap, Err(Error::InvalidConfig(_))));

        let overlap = CategoryTable::new(vec![
            CategoryRange::new(SizeCategory::Fines, 0.0, 100.0),
            CategoryRange::open(SizeCategory::Fine, 90.0),
        ]);
        assert!(overlap.is_err());

        let not_zero = CategoryTable::new(vec![CategoryRange::open(SizeCategory::Fine, 10.0)]);
        assert!(not_zero.is_err());

        let open_middle = CategoryTable::new(vec![
            CategoryRange::open(SizeCategory::Fines, 0.0),
            CategoryRange::open(SizeCategory::Fine, 100.0),
        ]);
        assert!(open_middle.is_err());

        let unordered = CategoryTable::new(vec![
            CategoryRange::new(SizeCategory::Coarse, 0.0, 100.0),
            CategoryRange::open(SizeCategory::Fine, 100.0),
        ]);
        assert!(unordered.is_err());

        assert!(CategoryTable::new(Vec::new()).is_err());
    }

    #[test]
    fn test_coarse_flags() {
        assert!(!SizeCategory::Fines.is_coarse());
        assert!(!SizeCategory::Medium.is_coarse());
        assert!(SizeCategory::Coarse.is_coarse());
        assert!(SizeCategory::ExtraCoarse.is_coarse());
        assert!(SizeCategory::Fines < SizeCategory::ExtraCoarse);
    }
}
