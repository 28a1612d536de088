//! Error types for the lexicon subsystem.
//!
//! Any of these raised while loading reference data means the lexicon is
//! invalid, which is fatal at session start.

use thiserror::Error;

/// Errors that can occur while loading or querying reference data.
#[derive(Error, Debug)]
pub enum LexiconError {
    /// Allergen definition not found
    #[error("allergen definition not found: {allergen_id}")]
    NotFound {
        /// The allergen ID that was not found
        allergen_id: String,
    },

    /// Failed to read a definition file
    #[error("failed to load lexicon file from {path}: {source}")]
    LoadError {
        /// Path to the definition file
        path: String,
        /// Underlying error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse definition TOML
    #[error("failed to parse lexicon TOML in {path}: {source}")]
    ParseError {
        /// Path to the definition file
        path: String,
        /// TOML parse error
        #[source]
        source: toml::de::Error,
    },

    /// Invalid allergen definition (validation failed)
    #[error("invalid allergen definition for {allergen_id}: {reason}")]
    ValidationError {
        /// Allergen ID being validated
        allergen_id: String,
        /// Reason for validation failure
        reason: String,
    },

    /// Two definition files declare the same allergen
    #[error("allergen {allergen_id} is defined more than once")]
    DuplicateAllergen {
        /// The repeated allergen ID
        allergen_id: String,
    },

    /// Invalid substitution rule
    #[error("invalid substitution rule for '{original}': {reason}")]
    InvalidSubstitution {
        /// Original ingredient of the rule
        original: String,
        /// Reason for validation failure
        reason: String,
    },

    /// A term could not be compiled into a search pattern
    #[error("failed to compile pattern for term '{term}': {source}")]
    InvalidPattern {
        /// The offending term
        term: String,
        /// Regex build error
        #[source]
        source: regex::Error,
    },

    /// Lexicon directory not found
    #[error("lexicon directory not found at {path}")]
    DirectoryNotFound {
        /// Expected directory path
        path: String,
    },

    /// I/O error while accessing lexicon files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid allergen ID format
    #[error("invalid allergen ID: {0}")]
    InvalidId(#[from] menuguard_core::MenuguardError),
}

/// Result type for lexicon operations.
pub type Result<T> = std::result::Result<T, LexiconError>;
