// ============================================================
// Layer 3: Verdict Types
// ============================================================
// What the classifier hands back to callers:
//   - an AI probability in [0, 1]
//   - a three-way confidence tier derived from it
//
// Tier boundaries (percent of AI probability):
//   [0, 60)   → Human
//   [60, 80)  → Mixed
//   [80, 100] → AI
//
// Lower bounds are inclusive: exactly 60% is Mixed and
// exactly 80% is AI.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIXED_THRESHOLD_PCT: f64 = 60.0;
pub const AI_THRESHOLD_PCT:    f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Human,
    Mixed,
    #[serde(rename = "AI")]
    Ai,
}

impl Tier {
    /// Map a probability in [0, 1] onto a tier.
    pub fn from_probability(probability: f64) -> Self {
        Self::from_percent(probability * 100.0)
    }

    pub fn from_percent(percent: f64) -> Self {
        if percent >= AI_THRESHOLD_PCT {
            Tier::Ai
        } else if percent >= MIXED_THRESHOLD_PCT {
            Tier::Mixed
        } else {
            Tier::Human
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Human => write!(f, "Human"),
            Tier::Mixed => write!(f, "Mixed"),
            Tier::Ai    => write!(f, "AI"),
        }
    }
}

/// Output of one model forward pass over one text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    ai_probability: f64,
    tier:           Tier,
}

impl Prediction {
    /// Clamped to [0, 1]. None for NaN or infinite input, which has no tier.
    pub fn from_probability(probability: f64) -> Option<Self> {
        if !probability.is_finite() {
            return None;
        }
        let p = probability.clamp(0.0, 1.0);
        Some(Self { ai_probability: p, tier: Tier::from_probability(p) })
    }

    pub fn ai_probability(&self) -> f64 {
        self.ai_probability
    }

    pub fn percent(&self) -> f64 {
        self.ai_probability * 100.0
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1}% AI)", self.tier, self.percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(Tier::from_percent(0.0),   Tier::Human);
        assert_eq!(Tier::from_percent(59.99), Tier::Human);
        assert_eq!(Tier::from_percent(60.0),  Tier::Mixed);
        assert_eq!(Tier::from_percent(79.99), Tier::Mixed);
        assert_eq!(Tier::from_percent(80.0),  Tier::Ai);
        assert_eq!(Tier::from_percent(100.0), Tier::Ai);
    }

    #[test]
    fn test_tier_from_exact_probabilities() {
        assert_eq!(Tier::from_probability(0.6), Tier::Mixed);
        assert_eq!(Tier::from_probability(0.8), Tier::Ai);
        assert_eq!(Tier::from_probability(0.5999), Tier::Human);
    }

    #[test]
    fn test_prediction_is_clamped() {
        assert_eq!(Prediction::from_probability(1.7).unwrap().ai_probability(), 1.0);
        assert_eq!(Prediction::from_probability(-0.2).unwrap().ai_probability(), 0.0);
    }

    #[test]
    fn test_non_finite_probability_has_no_prediction() {
        assert_eq!(Prediction::from_probability(f64::NAN), None);
        assert_eq!(Prediction::from_probability(f64::INFINITY), None);
    }
}
