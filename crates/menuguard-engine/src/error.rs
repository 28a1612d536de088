//! Error types for scanning.
//!
//! Every variant except [`EngineError::Lexicon`] is per item: a batch scan
//! reports it for the offending item and carries on with the rest.

use menuguard_lexicon::LexiconError;
use thiserror::Error;

/// Errors that can occur while scanning text.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input was blank or whitespace-only
    #[error("no text to scan")]
    EmptyText,

    /// OCR quality was NaN or outside 0.0-1.0
    #[error("OCR quality must be within 0.0-1.0, got {value}")]
    InvalidOcrQuality {
        /// The rejected value
        value: f32,
    },

    /// Profile TOML could not be parsed
    #[error("failed to parse allergen profile: {0}")]
    InvalidProfile(#[from] toml::de::Error),

    /// Reference data was missing or invalid
    #[error("lexicon error: {0}")]
    Lexicon(#[from] LexiconError),

    /// A background scan task panicked or was cancelled
    #[error("scan task failed: {0}")]
    TaskFailed(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
