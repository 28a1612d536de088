//! MenuGuard Engine - Allergen detection and menu safety classification.
//!
//! Given recognized text from a menu or ingredient label and a user's
//! allergen profile, the engine finds allergen mentions (including synonyms
//! and hidden forms), scores each by OCR quality and term specificity,
//! classifies the item as Safe, Caution or Unsafe, and proposes substitutions
//! that avoid every allergen the user reacts to.
//!
//! # Architecture
//!
//! - **Matcher** ([`matcher`]): Whole-word lexicon term matching with source offsets
//! - **Scorer** ([`scorer`]): Per-term and per-allergen confidence
//! - **Classifier** ([`classifier`]): Decision table over sensitivity and confidence
//! - **Recommender** ([`recommender`]): Substitutions re-checked against the profile
//! - **Pipeline** ([`engine`]): `SafetyEngine` wiring the four together
//! - **Scanner** ([`scanner`]): Bounded-concurrency async menu scanning
//!
//! # Example
//!
//! ```rust,no_run
//! use menuguard_core::{AllergenId, SensitivityLevel};
//! use menuguard_engine::{SafetyEngine, ScanRequest, UserAllergenProfile};
//! use menuguard_lexicon::{AllergenLexicon, LexiconLoader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = LexiconLoader::with_default_dir()?;
//! let engine = SafetyEngine::new(
//!     AllergenLexicon::load_from(&loader)?,
//!     loader.load_substitutions()?,
//! );
//!
//! let profile = UserAllergenProfile::new()
//!     .with(AllergenId::new("peanuts")?, SensitivityLevel::Severe);
//! let outcome = engine.scan(
//!     &ScanRequest::new("Contains peanut oil and wheat flour", 0.9),
//!     &profile,
//! )?;
//!
//! println!("{}", outcome.tier());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod classifier;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod profile;
pub mod recommender;
pub mod scanner;
pub mod scorer;
pub mod types;

// Re-export commonly used types
pub use classifier::{DecisionTableClassifier, RiskClassifier};
pub use engine::{SafetyEngine, ScanOutcome, ScanRequest};
pub use error::{EngineError, Result};
pub use matcher::{AllergenMatcher, LexiconMatcher};
pub use profile::UserAllergenProfile;
pub use recommender::{SafeSubstitutionRecommender, SubstitutionRecommender};
pub use scanner::{ItemScanResult, MenuScanner};
pub use scorer::{ConfidenceScorer, SpecificityScorer};
pub use types::{
    AllergenMatch, ClassificationResult, OcrQuality, ScoredTerm, SubstitutionCandidate, TermMatch,
};
