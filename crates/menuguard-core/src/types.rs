//! Shared types used across MenuGuard.
//!
//! This module defines common newtypes and ordered enums that provide type
//! safety and clear domain modeling for allergens, sensitivities and verdicts.

use crate::error::{MenuguardError, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Newtype for allergen identifiers with validation.
///
/// Allergen IDs are lowercase ASCII letters, digits and underscores, start
/// with a letter and are 2-50 characters long (e.g. `peanuts`, `tree_nuts`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AllergenId(String);

impl AllergenId {
    /// Create a new `AllergenId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID doesn't match the required format.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate allergen ID format: lowercase snake case, 2-50 chars.
    fn validate(id: &str) -> Result<()> {
        static ALLERGEN_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = ALLERGEN_REGEX
            .get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]*[a-z0-9]$").expect("valid regex"));

        if id.len() < 2 || id.len() > 50 {
            return Err(MenuguardError::Validation(format!(
                "invalid allergen ID: must be 2-50 characters, got {} characters",
                id.len()
            )));
        }

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(MenuguardError::Validation(format!(
                "invalid allergen ID: must be lowercase letters, digits and underscores, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for AllergenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for AllergenId {
    type Error = MenuguardError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<AllergenId> for String {
    fn from(id: AllergenId) -> Self {
        id.0
    }
}

/// User-declared severity of reaction to a specific allergen.
///
/// Ordered from least to most severe, so `max()` picks the worst.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityLevel {
    /// Not sensitive (also the value for allergens missing from a profile)
    #[default]
    None,
    /// Mild reaction
    Mild,
    /// Moderate reaction
    Moderate,
    /// High reaction
    High,
    /// Severe reaction (e.g. anaphylaxis)
    Severe,
}

impl SensitivityLevel {
    /// Get a human-readable display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Severe => "Severe",
        }
    }

    /// Whether the user reacts to the allergen at all.
    #[must_use]
    pub fn is_sensitive(&self) -> bool {
        *self != Self::None
    }
}

impl fmt::Display for SensitivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Derived certainty that a detection is real.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// No signal at all
    Unknown,
    /// Score above zero but below 0.5
    Low,
    /// Score in `[0.5, 0.8)`
    Medium,
    /// Score of 0.8 or more
    High,
}

impl ConfidenceLevel {
    /// Lower bound (inclusive) of [`ConfidenceLevel::High`].
    pub const HIGH_THRESHOLD: f32 = 0.8;
    /// Lower bound (inclusive) of [`ConfidenceLevel::Medium`].
    pub const MEDIUM_THRESHOLD: f32 = 0.5;

    /// Translate a confidence score into a level using the fixed thresholds.
    ///
    /// NaN and non-positive scores map to `Unknown`.
    #[must_use]
    pub fn from_score(score: f32) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            Self::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            Self::Medium
        } else if score > 0.0 {
            Self::Low
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{name}")
    }
}

/// Three-valued safety verdict for a scanned item.
///
/// Ordered by risk so that combining verdicts is a `max()`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum RiskTier {
    /// No allergen the user reacts to was found
    #[default]
    Safe,
    /// Allergen found but risk is limited or uncertain
    Caution,
    /// Do not eat
    Unsafe,
}

impl RiskTier {
    /// Whether this tier warrants looking for substitutions.
    #[must_use]
    pub fn is_flagged(&self) -> bool {
        *self != Self::Safe
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Safe => "Safe",
            Self::Caution => "Caution",
            Self::Unsafe => "Unsafe",
        };
        write!(f, "{name}")
    }
}

/// Identifier of a single classification, for audit trails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanId(String);

impl ScanId {
    /// Create a new random `ScanId` using UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
