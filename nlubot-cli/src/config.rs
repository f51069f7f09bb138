//! Application config: log file, card locations, dispatcher settings. Loaded from env.

use nlubot_core::{CardStore, ConfigError, DEFAULT_FALLBACK_CARD, DEFAULT_WELCOME_CARD};
use std::env;
use std::path::PathBuf;
use turn_dispatcher::{DispatcherConfig, DEFAULT_INTENT_REPLY};

pub const DEFAULT_LOG_FILE: &str = "logs/nlubot.log";
pub const DEFAULT_CARDS_DIR: &str = "./cards";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// LOG_FILE
    pub log_file: String,
    /// CARDS_DIR
    pub cards_dir: PathBuf,
    /// WELCOME_CARD, file name inside cards_dir
    pub welcome_card: String,
    /// FALLBACK_CARD, file name inside cards_dir
    pub fallback_card: String,
    /// INTENT_REPLY and NLU_MIN_SCORE
    pub dispatcher: DispatcherConfig,
}

impl AppConfig {
    /// Load from environment; every variable is optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
        let cards_dir = env::var("CARDS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CARDS_DIR));
        let welcome_card =
            env::var("WELCOME_CARD").unwrap_or_else(|_| DEFAULT_WELCOME_CARD.to_string());
        let fallback_card =
            env::var("FALLBACK_CARD").unwrap_or_else(|_| DEFAULT_FALLBACK_CARD.to_string());
        let intent_reply =
            env::var("INTENT_REPLY").unwrap_or_else(|_| DEFAULT_INTENT_REPLY.to_string());
        let min_score = match env::var("NLU_MIN_SCORE") {
            Ok(raw) => parse_score(&raw)?,
            Err(_) => 0.0,
        };

        Ok(Self {
            log_file,
            cards_dir,
            welcome_card,
            fallback_card,
            dispatcher: DispatcherConfig {
                intent_reply,
                min_score,
            },
        })
    }

    /// Overrides the cards directory (e.g. from a CLI flag).
    pub fn with_cards_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.cards_dir = dir;
        }
        self
    }

    /// Loads and validates both cards. Call before accepting any turn.
    pub fn load_cards(&self) -> Result<CardStore, ConfigError> {
        CardStore::load(&self.cards_dir, &self.welcome_card, &self.fallback_card)
    }
}

fn parse_score(raw: &str) -> Result<f64, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        name: "NLU_MIN_SCORE",
        reason: format!("`{}` is not a number between 0 and 1", raw),
    };
    let score: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(invalid())
    }
}
