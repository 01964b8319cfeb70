//! Marks prediction and study advice.
//!
//! Both functions are pure: the same inputs always give the same output, so
//! derived columns can be recomputed at any time from `Study Hours` and
//! `Mode` alone.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::util::round_to;

/// Study pace chosen for a subject.
///
/// `Unrecognized` is the default for any label outside the three
/// known ones and scores with a multiplier of 1. Loading in strict mode turns
/// that fallback into an error instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    Normal,
    Intermediate,
    Fast,
    #[default]
    Unrecognized,
}

impl Mode {
    /// The modes offered by the entry form, in display order.
    pub const SELECTABLE: [Mode; 3] = [Mode::Normal, Mode::Intermediate, Mode::Fast];

    /// Exact, case-sensitive match on the label.
    pub fn from_label(label: &str) -> Mode {
        match label {
            "Normal" => Mode::Normal,
            "Intermediate" => Mode::Intermediate,
            "Fast" => Mode::Fast,
            _ => Mode::Unrecognized,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Normal => "Normal",
            Mode::Intermediate => "Intermediate",
            Mode::Fast => "Fast",
            Mode::Unrecognized => "Unrecognized",
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            Mode::Normal => 10.0,
            Mode::Intermediate => 8.0,
            Mode::Fast => 5.0,
            Mode::Unrecognized => 1.0,
        }
    }

    pub fn is_recognized(self) -> bool {
        self != Mode::Unrecognized
    }

    pub fn score(self, study_hours: f64) -> f64 {
        round_to(study_hours * self.multiplier(), 2)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Predicted marks for `study_hours` at the given mode label, rounded to two
/// decimals. Unknown labels fall back to a multiplier of 1; negative or NaN
/// hours pass through the arithmetic unchanged.
pub fn score(study_hours: f64, mode: &str) -> f64 {
    Mode::from_label(mode).score(study_hours)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Take adequate sleep")]
    TakeAdequateSleep,
    #[serde(rename = "Practice meditation / yoga")]
    PracticeMeditation,
    #[serde(rename = "Maintain regular study schedule")]
    MaintainSchedule,
}

impl Recommendation {
    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::TakeAdequateSleep => "Take adequate sleep",
            Recommendation::PracticeMeditation => "Practice meditation / yoga",
            Recommendation::MaintainSchedule => "Maintain regular study schedule",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Both comparisons are strict, so 5 and 8 hours (and NaN) fall into the
/// middle bucket.
pub fn recommend(study_hours: f64) -> Recommendation {
    if study_hours > 8.0 {
        Recommendation::TakeAdequateSleep
    } else if study_hours < 5.0 {
        Recommendation::PracticeMeditation
    } else {
        Recommendation::MaintainSchedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_table() {
        assert_eq!(score(6.0, "Normal"), 60.0);
        assert_eq!(score(6.0, "Intermediate"), 48.0);
        assert_eq!(score(6.0, "Fast"), 30.0);
        assert_eq!(score(6.0, "Slow"), 6.0);
    }

    #[test]
    fn test_mode_labels_are_case_sensitive() {
        assert_eq!(Mode::from_label("normal"), Mode::Unrecognized);
        assert_eq!(Mode::from_label(" Fast"), Mode::Unrecognized);
        assert_eq!(score(3.0, "normal"), 3.0);
    }

    #[test]
    fn test_score_rounds_to_two_decimals() {
        assert_eq!(score(1.2341, "Normal"), 12.34);
        assert_eq!(score(1.2368, "Normal"), 12.37);
        assert_eq!(score(0.3334, "Intermediate"), 2.67);
        assert_eq!(score(2.5, "Intermediate"), 20.0);
    }

    #[test]
    fn test_score_passes_invalid_hours_through() {
        assert_eq!(score(-2.0, "Normal"), -20.0);
        assert!(score(f64::NAN, "Fast").is_nan());
    }

    #[test]
    fn test_recommendation_thresholds() {
        assert_eq!(recommend(9.0).as_str(), "Take adequate sleep");
        assert_eq!(recommend(4.0).as_str(), "Practice meditation / yoga");
        assert_eq!(recommend(5.0).as_str(), "Maintain regular study schedule");
        assert_eq!(recommend(8.0).as_str(), "Maintain regular study schedule");
        assert_eq!(recommend(8.01), Recommendation::TakeAdequateSleep);
        assert_eq!(recommend(4.99), Recommendation::PracticeMeditation);
    }

    #[test]
    fn test_recommendation_nan_is_middle_bucket() {
        assert_eq!(recommend(f64::NAN), Recommendation::MaintainSchedule);
    }

    #[test]
    fn test_default_mode_is_unrecognized() {
        assert_eq!(Mode::default(), Mode::Unrecognized);
        assert!(!Mode::default().is_recognized());
        assert!(Mode::SELECTABLE.iter().all(|m| m.is_recognized()));
    }

    #[test]
    fn test_recommendation_serializes_as_text() {
        let json = serde_json::to_string(&Recommendation::PracticeMeditation).unwrap();
        assert_eq!(json, "\"Practice meditation / yoga\"");
    }
}
