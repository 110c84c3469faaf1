// ============================================================
// Layer 3: Heuristic Scorer
// ============================================================
// Keyword counter used when no trained model is available.
//
// Scoring:
//   no markers         → 0.12, "human"
//   n markers (n ≥ 1)  → 0.45 + 0.1·n, capped at 0.95
//   label              → "ai" when confidence ≥ 0.6
//
// Each marker phrase counts once no matter how often it occurs.

use serde::{Deserialize, Serialize};

use crate::domain::record::Label;

const MARKERS: &[&str] = &[
    "in conclusion",
    "furthermore",
    "overall",
    "moreover",
    "additionally",
    "it is important to note",
    "delve",
];

const NO_MARKER_CONFIDENCE: f64 = 0.12;
const BASE_CONFIDENCE:      f64 = 0.45;
const PER_MARKER:           f64 = 0.1;
const MAX_CONFIDENCE:       f64 = 0.95;
const AI_LABEL_THRESHOLD:   f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicVerdict {
    pub confidence:  f64,
    pub label:       Label,
    pub explanation: String,
}

/// Number of distinct marker phrases present in `text`.
pub fn count_markers(text: &str) -> usize {
    let lower = text.to_lowercase();
    MARKERS.iter().filter(|m| lower.contains(*m)).count()
}

pub fn score(text: &str) -> HeuristicVerdict {
    let markers = count_markers(text);

    let confidence = if markers == 0 {
        NO_MARKER_CONFIDENCE
    } else {
        (BASE_CONFIDENCE + PER_MARKER * markers as f64).min(MAX_CONFIDENCE)
    };

    let label = if confidence >= AI_LABEL_THRESHOLD { Label::Ai } else { Label::Human };

    tracing::debug!("Heuristic: {} markers → {:.2} ({})", markers, confidence, label);

    HeuristicVerdict {
        confidence,
        label,
        explanation: explain(confidence).to_string(),
    }
}

// ─── Explanations ─────────────────────────────────────────────────────────────
// User-facing wording for a confidence score, shared by both engines.
pub fn explain(confidence: f64) -> &'static str {
    let c = confidence.clamp(0.0, 1.0);
    if c < 0.4 {
        "This result is inconclusive; the system has low confidence in either outcome. \
         Treat it as informational only, not as a definitive determination. \
         Additional context or human judgment is recommended when accuracy matters."
    } else if c < 0.7 {
        "This result falls in a mid-range where a definitive conclusion cannot be stated \
         with confidence. Some indicators associated with AI-generated text were observed, \
         but confidence is limited. Use this as one factor among others rather than as a \
         sole basis for decision-making."
    } else {
        "The system attributes moderate to high confidence that this content may be \
         AI-generated, based on patterns commonly associated with such text. \
         This remains an estimate, not a certainty; consider it alongside other evidence \
         and judgment."
    }
}
