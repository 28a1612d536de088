//! MenuGuard Lexicon - Allergen reference data for menu safety scanning.
//!
//! This crate loads allergen definitions and the ingredient substitution map
//! from TOML files, validates them and builds an immutable lexicon with
//! precompiled whole-word term patterns.
//!
//! # Architecture
//!
//! - **Definition Types** ([`definition`]): Allergen names, synonyms and hidden forms
//! - **Normalization** ([`normalize`]): OCR text cleanup with source offset tracking
//! - **Loader** ([`loader`]): TOML file loading from the `lexicon/` directory
//! - **Lexicon** ([`lexicon`]): Read-only snapshot with query support
//! - **Substitutions** ([`substitution`]): Replacement rules with feasibility scores
//! - **Errors** ([`error`]): Lexicon-specific error types
//!
//! # Example
//!
//! ```rust,no_run
//! use menuguard_core::AllergenId;
//! use menuguard_lexicon::{AllergenLexicon, LexiconLoader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load allergen definitions from the default directory
//! let loader = LexiconLoader::with_default_dir()?;
//! let lexicon = AllergenLexicon::load_from(&loader)?;
//! let substitutions = loader.load_substitutions()?;
//!
//! let peanuts = AllergenId::new("peanuts")?;
//! println!("Terms for peanuts: {}", lexicon.get(&peanuts)?.term_count());
//! println!("Substitution rules: {}", substitutions.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod definition;
pub mod error;
pub mod lexicon;
pub mod loader;
pub mod normalize;
pub mod substitution;

// Re-export commonly used types
pub use definition::{Allergen, AllergenDefinition, TermKind};
pub use error::{LexiconError, Result};
pub use lexicon::{AllergenLexicon, TermPattern};
pub use loader::LexiconLoader;
pub use normalize::{normalize, normalize_readings, normalize_term, NormalizedText};
pub use substitution::{Replacement, SubstitutionFile, SubstitutionMap, SubstitutionRule};
