//! Crate-wide error type.
//!
//! One enum covers every failure kind named in the spec's error design: a
//! caller lacking administrator rights, an entry whose location can't be
//! parsed, a live entry that has vanished out from under a mutation, a
//! source kind the Control/Delay Service refuses to touch, and anything
//! else the platform surfaces.

use thiserror::Error;

pub type Result<T = ()> = std::result::Result<T, EngineError>;

#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error("administrator privileges are required for this operation")]
    NotElevated,

    #[error("entry cannot be parsed: {0}")]
    InvalidEntry(String),

    #[error("live entry not found: {0}")]
    LiveNotFound(String),

    #[error("mutation is not supported for source kind {0}")]
    UnsupportedSource(String),

    #[error("platform error: {0}")]
    Platform(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("catalog JSON error: {0}")]
    Json(String),
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Json(e.to_string())
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for EngineError {
    fn from(e: windows::core::Error) -> Self {
        EngineError::Platform(e.to_string())
    }
}
