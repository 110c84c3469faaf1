// ============================================================
// Layer 2: DetectUseCase
// ============================================================
// Validates a detection request and routes it to one engine:
//
//   Heuristic - marker-phrase scorer, no model needed
//   Model     - any AiTextScorer (the transformer Detector)
//
// Validation happens first, so empty or over-long text never
// reaches a scorer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    heuristic::{self, explain},
    record::Label,
    traits::AiTextScorer,
    verdict::Tier,
};

/// Longest accepted request, in characters.
pub const DEFAULT_MAX_CHARS: usize = 20_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectRequest {
    pub text: String,
}

impl DetectRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("text is empty")]
    EmptyText,

    #[error("text is {len} characters long; the limit is {limit}")]
    TooLong { len: usize, limit: usize },

    #[error("scoring failed: {0:#}")]
    Scoring(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectResponse {
    pub confidence:  f64,
    pub label:       Label,
    pub explanation: String,
    /// Only the model engine reports a tier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier:        Option<Tier>,
}

pub enum Engine {
    Heuristic,
    Model(Box<dyn AiTextScorer>),
}

pub struct DetectUseCase {
    engine:    Engine,
    max_chars: usize,
}

impl DetectUseCase {
    pub fn new(engine: Engine) -> Self {
        Self { engine, max_chars: DEFAULT_MAX_CHARS }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn validate<'a>(&self, request: &'a DetectRequest) -> Result<&'a str, DetectError> {
        let text = request.text.as_str();
        if text.trim().is_empty() {
            return Err(DetectError::EmptyText);
        }
        let len = text.chars().count();
        if len > self.max_chars {
            return Err(DetectError::TooLong { len, limit: self.max_chars });
        }
        Ok(text)
    }

    pub fn execute(&self, request: &DetectRequest) -> Result<DetectResponse, DetectError> {
        let text = self.validate(request)?;

        let response = match &self.engine {
            Engine::Heuristic => {
                let verdict = heuristic::score(text);
                DetectResponse {
                    confidence:  verdict.confidence,
                    label:       verdict.label,
                    explanation: verdict.explanation,
                    tier:        None,
                }
            }
            Engine::Model(scorer) => {
                let prediction = scorer.predict(text)?;
                let confidence = prediction.ai_probability();
                let label = match prediction.tier() {
                    Tier::Human => Label::Human,
                    Tier::Mixed | Tier::Ai => Label::Ai,
                };
                DetectResponse {
                    confidence,
                    label,
                    explanation: explain(confidence).to_string(),
                    tier:        Some(prediction.tier()),
                }
            }
        };

        tracing::info!("Detected {} (confidence {:.2})", response.label, response.confidence);
        Ok(response)
    }
}
