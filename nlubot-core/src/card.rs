//! Card payloads (Adaptive Card JSON) and the read-only store loaded at startup.
//!
//! Cards are validated once in [`CardStore::load`]; a missing or malformed file is a
//! [`ConfigError`] and the dispatcher never starts.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::error::ConfigError;

pub const ADAPTIVE_CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";

pub const DEFAULT_WELCOME_CARD: &str = "welcomeCard.json";
pub const DEFAULT_FALLBACK_CARD: &str = "fallbackCard.json";

/// A structured card document. Opaque beyond "valid Adaptive Card JSON object".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPayload {
    pub name: String,
    pub content_type: String,
    pub content: Value,
}

impl CardPayload {
    /// Validates `content` as an Adaptive Card: a JSON object whose `type` is `AdaptiveCard`.
    pub fn from_json(name: impl Into<String>, content: Value) -> std::result::Result<Self, String> {
        let obj = content
            .as_object()
            .ok_or_else(|| "card root must be a JSON object".to_string())?;
        match obj.get("type").and_then(Value::as_str) {
            Some("AdaptiveCard") => {}
            Some(other) => return Err(format!("unexpected card type `{}`", other)),
            None => return Err("missing `type` field".to_string()),
        }
        if let Some(body) = obj.get("body") {
            if !body.is_array() {
                return Err("`body` must be an array".to_string());
            }
        }
        Ok(Self {
            name: name.into(),
            content_type: ADAPTIVE_CARD_CONTENT_TYPE.to_string(),
            content,
        })
    }

    /// Plain-text rendering for channels without card support: TextBlock texts, then OpenUrl actions.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        if let Some(body) = self.content.get("body") {
            collect_text(body, &mut lines);
        }
        if let Some(actions) = self.content.get("actions").and_then(Value::as_array) {
            for action in actions {
                collect_action(action, &mut lines);
            }
        }
        lines.join("\n")
    }
}

fn collect_text(node: &Value, lines: &mut Vec<String>) {
    match node {
        Value::Object(obj) => {
            if obj.get("type").and_then(Value::as_str) == Some("TextBlock") {
                if let Some(text) = obj.get("text").and_then(Value::as_str) {
                    let text = text.trim();
                    if !text.is_empty() {
                        lines.push(text.to_string());
                    }
                }
            }
            for child in obj.values() {
                collect_text(child, lines);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_text(item, lines);
            }
        }
        _ => {}
    }
}

fn collect_action(action: &Value, lines: &mut Vec<String>) {
    if action.get("type").and_then(Value::as_str) != Some("Action.OpenUrl") {
        return;
    }
    let url = action.get("url").and_then(Value::as_str);
    let title = action.get("title").and_then(Value::as_str);
    match (title, url) {
        (Some(title), Some(url)) => lines.push(format!("{}: {}", title, url)),
        (None, Some(url)) => lines.push(url.to_string()),
        _ => {}
    }
}

/// Reads and validates one card file.
pub fn load_card(path: &Path) -> std::result::Result<CardPayload, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::CardIo {
        path: path.to_path_buf(),
        source,
    })?;
    let content: Value = serde_json::from_str(&raw).map_err(|e| ConfigError::InvalidCard {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    CardPayload::from_json(name, content).map_err(|reason| ConfigError::InvalidCard {
        path: path.to_path_buf(),
        reason,
    })
}

/// Like [`load_card`], but also requires a non-empty [`CardPayload::plain_text`] so text-only
/// channels always have something to send.
fn load_renderable_card(path: &Path) -> std::result::Result<CardPayload, ConfigError> {
    let card = load_card(path)?;
    if card.plain_text().is_empty() {
        return Err(ConfigError::InvalidCard {
            path: path.to_path_buf(),
            reason: "card has no TextBlock text or OpenUrl action".to_string(),
        });
    }
    Ok(card)
}

/// Welcome and fallback cards, loaded once and shared read-only by every turn.
#[derive(Debug, Clone)]
pub struct CardStore {
    welcome: Arc<CardPayload>,
    fallback: Arc<CardPayload>,
}

impl CardStore {
    pub fn new(welcome: CardPayload, fallback: CardPayload) -> Self {
        Self {
            welcome: Arc::new(welcome),
            fallback: Arc::new(fallback),
        }
    }

    /// Loads `dir/welcome_file` and `dir/fallback_file`. Fails on the first missing or invalid card.
    #[instrument]
    pub fn load(dir: &Path, welcome_file: &str, fallback_file: &str) -> std::result::Result<Self, ConfigError> {
        let welcome_path: PathBuf = dir.join(welcome_file);
        let fallback_path: PathBuf = dir.join(fallback_file);
        let welcome = load_renderable_card(&welcome_path)?;
        let fallback = load_renderable_card(&fallback_path)?;
        info!(
            welcome = %welcome_path.display(),
            fallback = %fallback_path.display(),
            "Cards loaded"
        );
        Ok(Self::new(welcome, fallback))
    }

    pub fn welcome(&self) -> Arc<CardPayload> {
        self.welcome.clone()
    }

    pub fn fallback(&self) -> Arc<CardPayload> {
        self.fallback.clone()
    }
}
