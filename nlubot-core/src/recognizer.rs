//! Language understanding seam: the dispatcher only sees [`Recognizer`].

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::RecognitionError;
use crate::types::RecognitionResult;

/// Language understanding service: raw text in, ranked intent and entities out.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, text: &str) -> Result<RecognitionResult, RecognitionError>;
}

/// Fixed-table recognizer: exact (case-insensitive, trimmed) utterance → intent. Unknown text
/// yields no intent. Used by the console emulator when no service is configured, and by tests.
#[derive(Debug, Clone, Default)]
pub struct StaticRecognizer {
    utterances: HashMap<String, RecognitionResult>,
}

impl StaticRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_utterance(mut self, text: &str, result: RecognitionResult) -> Self {
        self.utterances.insert(normalize(text), result);
        self
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[async_trait]
impl Recognizer for StaticRecognizer {
    async fn recognize(&self, text: &str) -> Result<RecognitionResult, RecognitionError> {
        let mut result = self
            .utterances
            .get(&normalize(text))
            .cloned()
            .unwrap_or_default();
        result.query = text.to_string();
        Ok(result)
    }
}
