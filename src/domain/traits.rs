// ============================================================
// Layer 3: Core Traits (Abstractions)
// ============================================================
// The application layer talks to loaders and classifiers only
// through these traits:
//   - CsvLoader / JsonLoader / DirectoryLoader → TableSource
//   - Detector (transformer) → AiTextScorer

use anyhow::Result;

use crate::domain::table::RawTable;
use crate::domain::verdict::Prediction;

// ─── TableSource ──────────────────────────────────────────────────────────────
/// Any component that can produce a raw dataset table.
pub trait TableSource {
    fn load_table(&self) -> Result<RawTable>;
}

// ─── AiTextScorer ─────────────────────────────────────────────────────────────
/// Any component that can estimate how likely a text is AI-generated.
pub trait AiTextScorer {
    /// Classify already-validated text.
    fn predict(&self, text: &str) -> Result<Prediction>;
}
