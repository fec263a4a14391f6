//! Brew-method grind targets.
//!
//! Profiles only grade a finished result; they never change how the
//! statistics are computed.

use crate::result::AnalysisResult;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Brewing method the grounds are intended for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GrindType {
    /// Turkish / ibrik.
    Turkish,
    /// Espresso.
    Espresso,
    /// Pour-over (V60, Kalita).
    PourOver,
    /// Batch filter.
    Filter,
    /// French press.
    FrenchPress,
    /// Cold brew.
    ColdBrew,
}

impl GrindType {
    /// Target median range and acceptable fines share for the method.
    #[must_use]
    pub fn profile(self) -> GrindProfile {
        let (target_min_um, target_max_um, max_fines_percent) = match self {
            Self::Turkish => (50.0, 200.0, 40.0),
            Self::Espresso => (200.0, 400.0, 30.0),
            Self::PourOver => (500.0, 800.0, 20.0),
            Self::Filter => (600.0, 900.0, 20.0),
            Self::FrenchPress => (900.0, 1200.0, 15.0),
            Self::ColdBrew => (1000.0, 1400.0, 10.0),
        };
        GrindProfile {
            grind_type: self,
            target_min_um,
            target_max_um,
            max_fines_percent,
        }
    }
}

impl std::fmt::Display for GrindType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Turkish => write!(f, "Turkish"),
            Self::Espresso => write!(f, "Espresso"),
            Self::PourOver => write!(f, "Pour Over"),
            Self::Filter => write!(f, "Filter"),
            Self::FrenchPress => write!(f, "French Press"),
            Self::ColdBrew => write!(f, "Cold Brew"),
        }
    }
}

/// Target window for one brew method.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GrindProfile {
    /// The method.
    pub grind_type: GrindType,
    /// Lower bound of the target median diameter (um).
    pub target_min_um: f64,
    /// Upper bound of the target median diameter (um).
    pub target_max_um: f64,
    /// Largest acceptable fines share, in percent.
    pub max_fines_percent: f64,
}

/// Where the median falls relative to the target window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GrindVerdict {
    /// Nothing to grade.
    NoData,
    /// Median below the window.
    TooFine,
    /// Median inside the window.
    InRange,
    /// Median above the window.
    TooCoarse,
}

/// Grade of a result against a profile.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GrindAssessment {
    /// Profile used.
    pub profile: GrindProfile,
    /// Median position.
    pub verdict: GrindVerdict,
    /// Whether the fines share is within the profile limit.
    pub fines_acceptable: bool,
}

impl GrindProfile {
    /// Grades a result against this profile.
    #[must_use]
    pub fn assess(&self, result: &AnalysisResult) -> GrindAssessment {
        let verdict = if result.particle_count == 0 {
            GrindVerdict::NoData
        } else if result.distribution.d50 < self.target_min_um {
            GrindVerdict::TooFine
        } else if result.distribution.d50 > self.target_max_um {
            GrindVerdict::TooCoarse
        } else {
            GrindVerdict::InRange
        };
        GrindAssessment {
            profile: *self,
            verdict,
            fines_acceptable: result.fines_percentage <= self.max_fines_percent,
        }
    }
}
