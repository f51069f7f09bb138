use std::path::PathBuf;
use thiserror::Error;

/// Startup-time failures. Any of these keeps the dispatcher from accepting turns.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} not set")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("Failed to read card {path}: {source}")]
    CardIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid card {path}: {reason}")]
    InvalidCard { path: PathBuf, reason: String },
}

/// Failures of the language understanding service. Abort the current turn only.
#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("Recognition request failed: {0}")]
    Request(String),

    #[error("Recognition request timed out")]
    Timeout,

    #[error("Recognition service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed recognition response: {0}")]
    Malformed(String),
}

/// Reply delivery failures. Abort the current turn; not retried here.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Send failed: {0}")]
    Send(String),

    #[error("Invalid conversation id: {0}")]
    InvalidConversation(String),
}

#[derive(Error, Debug)]
pub enum TurnError {
    #[error(transparent)]
    Recognition(#[from] RecognitionError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Turn cancelled before a reply was sent")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, TurnError>;
