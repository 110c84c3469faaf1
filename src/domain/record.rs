// ============================================================
// Layer 3: Labelled Text Record
// ============================================================
// One (text, label) pair after dataset normalisation.
// Every dataset shape the loader understands ends up as a
// Vec<TextRecord> before cleaning, sampling and tokenisation.
//
// A record may be unlabelled: test splits and scraped feeds
// often carry text only. Unlabelled records are kept for the
// stratified sampler's remainder pool and dropped before training.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary authorship label. The discriminants are the training targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Human = 0,
    Ai    = 1,
}

impl Label {
    /// Numeric training target (0 = human, 1 = AI)
    pub fn as_index(self) -> usize {
        self as usize
    }

    /// Parse a label cell from a dataset file.
    ///
    /// Accepts the spellings found in public AI-detection corpora:
    ///   0 / 1, human / ai, generated, false / true, 0.0 / 1.0
    /// Anything else is treated as "no label".
    pub fn parse(cell: &str) -> Option<Self> {
        let c = cell.trim().to_lowercase();
        match c.as_str() {
            "0" | "0.0" | "human" | "false" => Some(Label::Human),
            "1" | "1.0" | "ai" | "generated" | "machine" | "true" => Some(Label::Ai),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Human => write!(f, "human"),
            Label::Ai    => write!(f, "ai"),
        }
    }
}

/// A normalised dataset row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRecord {
    pub text:  String,
    pub label: Option<Label>,
}

impl TextRecord {
    pub fn new(text: impl Into<String>, label: Option<Label>) -> Self {
        Self { text: text.into(), label }
    }

    pub fn labelled(text: impl Into<String>, label: Label) -> Self {
        Self::new(text, Some(label))
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_spellings() {
        assert_eq!(Label::parse("0"), Some(Label::Human));
        assert_eq!(Label::parse(" 1 "), Some(Label::Ai));
        assert_eq!(Label::parse("Generated"), Some(Label::Ai));
        assert_eq!(Label::parse("HUMAN"), Some(Label::Human));
        assert_eq!(Label::parse(""), None);
        assert_eq!(Label::parse("maybe"), None);
    }

    #[test]
    fn test_index_matches_training_target() {
        assert_eq!(Label::Human.as_index(), 0);
        assert_eq!(Label::Ai.as_index(), 1);
    }
}
