//! Category score type.
//!
//! A score is either a measured 0-100 value or `Unavailable`. The two are never
//! conflated: `Unavailable` only collapses to 0 when a report is assembled.

use serde::{Deserialize, Serialize};

/// A 0-100 category score, or a marker that the category was not measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Score {
    Valid(u8),
    #[default]
    Unavailable,
}

impl Score {
    /// Build a valid score, clamping into 0-100.
    pub fn new(value: i64) -> Self {
        Self::Valid(value.clamp(0, 100) as u8)
    }

    /// Convert a raw 0.0-1.0 analyzer value. `None` or a non-finite value means unavailable.
    pub fn from_fraction(raw: Option<f64>) -> Self {
        match raw {
            Some(v) if v.is_finite() => Self::new((v * 100.0).round() as i64),
            _ => Self::Unavailable,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn value(&self) -> Option<u8> {
        match self {
            Self::Valid(v) => Some(*v),
            Self::Unavailable => None,
        }
    }

    /// Collapse to a number for the caller-facing report.
    pub fn or_zero(&self) -> u8 {
        self.value().unwrap_or(0)
    }

    /// Higher of two scores. An unavailable side is skipped, never compared as 0.
    pub fn best_of(self, other: Score) -> Score {
        match (self, other) {
            (Self::Valid(a), Self::Valid(b)) => Self::Valid(a.max(b)),
            (Self::Valid(a), Self::Unavailable) => Self::Valid(a),
            (Self::Unavailable, Self::Valid(b)) => Self::Valid(b),
            (Self::Unavailable, Self::Unavailable) => Self::Unavailable,
        }
    }

    /// This score if valid, otherwise `fallback`.
    pub fn or(self, fallback: Score) -> Score {
        if self.is_valid() {
            self
        } else {
            fallback
        }
    }
}

impl From<u8> for Score {
    fn from(v: u8) -> Self {
        Self::new(v as i64)
    }
}

/// The four category scores as measured, before report assembly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub seo: Score,
    pub performance: Score,
    pub accessibility: Score,
    pub best_practices: Score,
}

impl ScoreCard {
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// True when every category carries a measured value.
    pub fn is_complete(&self) -> bool {
        self.seo.is_valid()
            && self.performance.is_valid()
            && self.accessibility.is_valid()
            && self.best_practices.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_rounds_to_percent() {
        assert_eq!(Score::from_fraction(Some(0.873)), Score::Valid(87));
        assert_eq!(Score::from_fraction(Some(0.875)), Score::Valid(88));
        assert_eq!(Score::from_fraction(Some(1.0)), Score::Valid(100));
        assert_eq!(Score::from_fraction(None), Score::Unavailable);
        assert_eq!(Score::from_fraction(Some(f64::NAN)), Score::Unavailable);
    }

    #[test]
    fn zero_is_a_real_score() {
        let zero = Score::from_fraction(Some(0.0));
        assert!(zero.is_valid());
        assert_ne!(zero, Score::Unavailable);
        assert_eq!(Score::Unavailable.or_zero(), 0);
    }

    #[test]
    fn best_of_skips_unavailable() {
        assert_eq!(Score::Valid(60).best_of(Score::Valid(80)), Score::Valid(80));
        assert_eq!(Score::Valid(60).best_of(Score::Unavailable), Score::Valid(60));
        assert_eq!(Score::Unavailable.best_of(Score::Valid(0)), Score::Valid(0));
        assert_eq!(Score::Unavailable.best_of(Score::Unavailable), Score::Unavailable);
    }

    #[test]
    fn new_clamps() {
        assert_eq!(Score::new(-6), Score::Valid(0));
        assert_eq!(Score::new(140), Score::Valid(100));
    }
}
