//! # NLU client
//!
//! [`LuisRecognizer`] implements [`nlubot_core::Recognizer`] against a LUIS v3 prediction endpoint;
//! [`EnvNluConfig`] loads its settings from the environment. API keys are only ever logged masked.

mod config;
mod luis;
mod response;

pub use config::{EnvNluConfig, NluConfig, DEFAULT_SLOT, DEFAULT_TIMEOUT_SECS};
pub use luis::LuisRecognizer;

/// Masks an API key for logging: first 4 chars + "***" + last 4 chars.
/// Keys of 11 chars or fewer become "***".
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 || !token.is_ascii() {
        "***".to_string()
    } else {
        format!("{}***{}", &token[..4], &token[len - 4..])
    }
}
