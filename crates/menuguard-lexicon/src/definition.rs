//! Allergen definition types.
//!
//! This module defines the data structures for allergen definitions loaded
//! from TOML files, one allergen per file:
//!
//! ```toml
//! [allergen]
//! id = "milk"
//! name = "milk"
//! display_name = "Milk"
//! default_severity = "moderate"
//! synonyms = ["dairy", "cream", "butter"]
//! hidden_forms = ["casein", "whey", "lactose"]
//! ```

use crate::error::{LexiconError, Result};
use crate::normalize::normalize_term;
use menuguard_core::{AllergenId, SensitivityLevel};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Complete allergen definition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllergenDefinition {
    /// The allergen described by this file
    pub allergen: Allergen,
}

/// Immutable reference data for one allergen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allergen {
    /// Stable identifier (e.g. "peanuts", "tree_nuts")
    pub id: AllergenId,

    /// Canonical name as it appears in ingredient lists (e.g. "peanut")
    pub name: String,

    /// Human-readable name for display
    pub display_name: String,

    /// Severity assumed when a user declares the allergen without a level
    #[serde(default = "default_severity")]
    pub default_severity: SensitivityLevel,

    /// Alternative names for the allergen itself
    #[serde(default)]
    pub synonyms: Vec<String>,

    /// Ingredients derived from the allergen that do not name it
    #[serde(default)]
    pub hidden_forms: Vec<String>,
}

fn default_severity() -> SensitivityLevel {
    SensitivityLevel::Moderate
}

impl Allergen {
    /// Get the allergen ID.
    #[must_use]
    pub fn id(&self) -> &AllergenId {
        &self.id
    }

    /// Get the canonical name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All matchable terms with their kind, canonical name first.
    pub fn terms(&self) -> impl Iterator<Item = (&str, TermKind)> + '_ {
        std::iter::once((self.name.as_str(), TermKind::Canonical))
            .chain(self.synonyms.iter().map(|s| (s.as_str(), TermKind::Synonym)))
            .chain(
                self.hidden_forms
                    .iter()
                    .map(|s| (s.as_str(), TermKind::HiddenForm)),
            )
    }

    /// Number of matchable terms.
    #[must_use]
    pub fn term_count(&self) -> usize {
        1 + self.synonyms.len() + self.hidden_forms.len()
    }

    /// Validate the definition for completeness and correctness.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("allergen name cannot be empty"));
        }

        if self.display_name.trim().is_empty() {
            return Err(self.invalid("display_name cannot be empty"));
        }

        let mut seen = HashSet::new();
        for (term, kind) in self.terms() {
            let normalized = normalize_term(term);
            if normalized.is_empty() {
                return Err(self.invalid(&format!(
                    "{} term '{term}' has no letters or digits",
                    kind.as_str()
                )));
            }
            if !seen.insert(normalized) {
                return Err(self.invalid(&format!("term '{term}' is listed more than once")));
            }
        }

        Ok(())
    }

    fn invalid(&self, reason: &str) -> LexiconError {
        LexiconError::ValidationError {
            allergen_id: self.id.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// How directly a term names its allergen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    /// The allergen's canonical name
    Canonical,
    /// An alternative name for the allergen
    Synonym,
    /// An ingredient that implies the allergen without naming it
    HiddenForm,
}

impl TermKind {
    /// Intrinsic specificity weight used for confidence scoring.
    #[must_use]
    pub fn specificity(&self) -> f32 {
        match self {
            Self::Canonical => 1.0,
            Self::Synonym => 0.85,
            Self::HiddenForm => 0.6,
        }
    }

    /// Short name for logs and messages.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Canonical => "canonical",
            Self::Synonym => "synonym",
            Self::HiddenForm => "hidden-form",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn milk() -> Allergen {
        Allergen {
            id: AllergenId::new("milk").expect("valid allergen ID"),
            name: "milk".to_string(),
            display_name: "Milk".to_string(),
            default_severity: SensitivityLevel::Moderate,
            synonyms: vec!["dairy".to_string(), "cream".to_string()],
            hidden_forms: vec!["casein".to_string(), "whey".to_string()],
        }
    }

    #[test]
    fn test_terms_order_and_kind() {
        let allergen = milk();
        let terms: Vec<_> = allergen.terms().collect();
        assert_eq!(terms.len(), allergen.term_count());
        assert_eq!(terms[0], ("milk", TermKind::Canonical));
        assert_eq!(terms[1], ("dairy", TermKind::Synonym));
        assert_eq!(terms[3], ("casein", TermKind::HiddenForm));
    }

    #[test]
    fn test_specificity_weights() {
        assert!((TermKind::Canonical.specificity() - 1.0).abs() < f32::EPSILON);
        assert!((TermKind::Synonym.specificity() - 0.85).abs() < f32::EPSILON);
        assert!((TermKind::HiddenForm.specificity() - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn test_validate_ok() {
        assert!(milk().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_name() {
        let mut allergen = milk();
        allergen.name = "   ".to_string();
        assert!(matches!(
            allergen.validate(),
            Err(LexiconError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_symbol_only_term() {
        let mut allergen = milk();
        allergen.hidden_forms.push("***".to_string());
        let err = allergen.validate().expect_err("symbol-only term rejected");
        assert!(err.to_string().contains("hidden-form"));
    }

    #[test]
    fn test_validate_duplicate_after_normalization() {
        let mut allergen = milk();
        allergen.synonyms.push("Whey".to_string());
        let err = allergen.validate().expect_err("duplicate term rejected");
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_parse_definition_defaults() {
        let toml_str = r#"
[allergen]
id = "sesame"
name = "sesame"
display_name = "Sesame"
"#;
        let definition: AllergenDefinition = toml::from_str(toml_str).expect("parse definition");
        assert_eq!(
            definition.allergen.default_severity,
            SensitivityLevel::Moderate
        );
        assert!(definition.allergen.synonyms.is_empty());
        assert!(definition.allergen.hidden_forms.is_empty());
    }

    #[test]
    fn test_parse_definition_rejects_bad_id() {
        let toml_str = r#"
[allergen]
id = "Tree Nuts"
name = "tree nut"
display_name = "Tree Nuts"
"#;
        let result: std::result::Result<AllergenDefinition, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }
}
