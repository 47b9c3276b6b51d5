//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid profile: {field}: {reason}")]
    InvalidProfile { field: String, reason: String },

    #[error("Unknown protocol: {0}")]
    UnknownProtocol(String),

    #[error("Citation not found: {0}")]
    CitationNotFound(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("Invalid threshold: {0} (expected 0-100)")]
    InvalidThreshold(i64),

    #[error("Invalid cycle: weeks per cycle must be at least 1")]
    InvalidCycle,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_profile(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidProfile {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
