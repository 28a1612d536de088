//! MenuGuard Core - Foundation crate for the MenuGuard allergen safety engine.
//!
//! This crate provides the shared types, error handling and configuration
//! management that the lexicon, engine and CLI crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes and enums (`AllergenId`, `SensitivityLevel`,
//!   `ConfidenceLevel`, `RiskTier`, `ScanId`, `Timestamp`)
//!
//! # Example
//!
//! ```rust
//! use menuguard_core::{AllergenId, AppConfig, ConfidenceLevel, SensitivityLevel};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert_eq!(config.scanning.max_concurrent_scans, 4);
//!
//! let peanuts = AllergenId::new("peanuts")?;
//! assert_eq!(peanuts.as_str(), "peanuts");
//! assert!(SensitivityLevel::Severe > SensitivityLevel::Mild);
//! assert_eq!(ConfidenceLevel::from_score(0.9), ConfidenceLevel::High);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, LexiconConfig, LoggingConfig, RecommendationConfig, ScanningConfig};
pub use error::{ConfigError, ConfigResult, MenuguardError, Result};
pub use types::{AllergenId, ConfidenceLevel, RiskTier, ScanId, SensitivityLevel, Timestamp};
