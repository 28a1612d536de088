//! Immutable allergen lexicon with precompiled term patterns.

use crate::{
    definition::{Allergen, TermKind},
    error::{LexiconError, Result},
    loader::LexiconLoader,
    normalize::normalize_term,
};
use menuguard_core::AllergenId;
use regex::Regex;
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, info};

/// Read-only snapshot of allergen reference data.
///
/// Built once per session and shared across threads; cloning is cheap.
/// Allergens iterate in ID order, which keeps scans deterministic.
#[derive(Debug, Clone)]
pub struct AllergenLexicon {
    allergens: Arc<BTreeMap<AllergenId, Allergen>>,
    patterns: Arc<Vec<TermPattern>>,
}

impl AllergenLexicon {
    /// Build a lexicon from allergen definitions.
    ///
    /// # Errors
    /// Returns error if any definition is invalid, an ID repeats, or a term
    /// cannot be compiled.
    pub fn from_allergens(allergens: impl IntoIterator<Item = Allergen>) -> Result<Self> {
        let mut by_id = BTreeMap::new();

        for allergen in allergens {
            allergen.validate()?;
            let allergen_id = allergen.id().clone();
            if by_id.insert(allergen_id.clone(), allergen).is_some() {
                return Err(LexiconError::DuplicateAllergen {
                    allergen_id: allergen_id.to_string(),
                });
            }
        }

        let mut patterns = Vec::new();
        for allergen in by_id.values() {
            for (term, kind) in allergen.terms() {
                patterns.push(TermPattern::compile(allergen.id(), term, kind)?);
            }
        }

        debug!(
            allergens = by_id.len(),
            terms = patterns.len(),
            "compiled allergen lexicon"
        );

        Ok(Self {
            allergens: Arc::new(by_id),
            patterns: Arc::new(patterns),
        })
    }

    /// Load and build the lexicon from the loader's directory.
    ///
    /// # Errors
    /// Returns error if any definition file fails to load or validate.
    pub fn load_from(loader: &LexiconLoader) -> Result<Self> {
        let lexicon = Self::from_allergens(loader.load_allergens()?)?;
        info!(
            allergens = lexicon.len(),
            terms = lexicon.term_count(),
            "loaded allergen lexicon"
        );
        Ok(lexicon)
    }

    /// Get an allergen by ID.
    ///
    /// # Errors
    /// Returns error if the allergen is not in the lexicon.
    pub fn get(&self, allergen_id: &AllergenId) -> Result<&Allergen> {
        self.allergens
            .get(allergen_id)
            .ok_or_else(|| LexiconError::NotFound {
                allergen_id: allergen_id.to_string(),
            })
    }

    /// Get an allergen by an unvalidated ID string, such as user input.
    ///
    /// # Errors
    /// Returns [`LexiconError::InvalidId`] if `raw` is not a well-formed ID,
    /// or [`LexiconError::NotFound`] if the lexicon doesn't list it.
    pub fn lookup(&self, raw: &str) -> Result<&Allergen> {
        let allergen_id = AllergenId::new(raw.trim())?;
        self.get(&allergen_id)
    }

    /// Check if an allergen exists in the lexicon.
    #[must_use]
    pub fn contains(&self, allergen_id: &AllergenId) -> bool {
        self.allergens.contains_key(allergen_id)
    }

    /// Iterate over all allergens in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Allergen> {
        self.allergens.values()
    }

    /// All allergen IDs in order.
    #[must_use]
    pub fn ids(&self) -> Vec<AllergenId> {
        self.allergens.keys().cloned().collect()
    }

    /// Number of allergens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.allergens.len()
    }

    /// Whether the lexicon has no allergens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allergens.is_empty()
    }

    /// Total number of matchable terms across all allergens.
    #[must_use]
    pub fn term_count(&self) -> usize {
        self.patterns.len()
    }

    /// Compiled patterns, grouped by allergen in ID order.
    #[must_use]
    pub fn patterns(&self) -> &[TermPattern] {
        &self.patterns
    }

    /// IDs of every allergen listing `term` (after normalization).
    #[must_use]
    pub fn allergens_with_term(&self, term: &str) -> Vec<AllergenId> {
        let normalized = normalize_term(term);
        let mut ids: Vec<AllergenId> = self
            .patterns
            .iter()
            .filter(|p| p.normalized == normalized)
            .map(|p| p.allergen_id.clone())
            .collect();
        ids.dedup();
        ids
    }
}

/// One lexicon term compiled into a whole-word pattern over normalized text.
#[derive(Debug, Clone)]
pub struct TermPattern {
    allergen_id: AllergenId,
    term: String,
    normalized: String,
    kind: TermKind,
    regex: Regex,
}

impl TermPattern {
    fn compile(allergen_id: &AllergenId, term: &str, kind: TermKind) -> Result<Self> {
        let normalized = normalize_term(term);
        let regex = Regex::new(&format!(r"\b{}\b", regex::escape(&normalized))).map_err(
            |source| LexiconError::InvalidPattern {
                term: term.to_string(),
                source,
            },
        )?;

        Ok(Self {
            allergen_id: allergen_id.clone(),
            term: term.to_string(),
            normalized,
            kind,
            regex,
        })
    }

    /// Allergen this term belongs to.
    #[must_use]
    pub fn allergen_id(&self) -> &AllergenId {
        &self.allergen_id
    }

    /// The term as written in the definition file.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// The term in normalized form.
    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Canonical, synonym or hidden form.
    #[must_use]
    pub fn kind(&self) -> TermKind {
        self.kind
    }

    /// Byte ranges of whole-word occurrences in already-normalized text.
    pub fn find_in<'a>(
        &'a self,
        normalized_text: &'a str,
    ) -> impl Iterator<Item = Range<usize>> + 'a {
        self.regex.find_iter(normalized_text).map(|m| m.range())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menuguard_core::SensitivityLevel;

    fn allergen(id: &str, name: &str, synonyms: &[&str], hidden: &[&str]) -> Allergen {
        Allergen {
            id: AllergenId::new(id).expect("valid allergen ID"),
            name: name.to_string(),
            display_name: name.to_string(),
            default_severity: SensitivityLevel::Severe,
            synonyms: synonyms.iter().map(ToString::to_string).collect(),
            hidden_forms: hidden.iter().map(ToString::to_string).collect(),
        }
    }

    fn test_lexicon() -> AllergenLexicon {
        AllergenLexicon::from_allergens(vec![
            allergen("peanuts", "peanut", &["groundnut"], &["arachis oil"]),
            allergen("tree_nuts", "tree nut", &["almond", "cashew"], &["coconut"]),
            allergen("milk", "milk", &["cream"], &["casein", "coconut"]),
        ])
        .expect("build lexicon")
    }

    #[test]
    fn test_lexicon_counts() {
        let lexicon = test_lexicon();
        assert_eq!(lexicon.len(), 3);
        assert!(!lexicon.is_empty());
        assert_eq!(lexicon.term_count(), 3 + 4 + 4);
    }

    #[test]
    fn test_lexicon_get_and_contains() {
        let lexicon = test_lexicon();
        let milk = AllergenId::new("milk").expect("valid allergen ID");
        assert!(lexicon.contains(&milk));
        assert_eq!(lexicon.get(&milk).expect("milk present").name(), "milk");

        let soy = AllergenId::new("soy").expect("valid allergen ID");
        assert!(!lexicon.contains(&soy));
        assert!(matches!(lexicon.get(&soy), Err(LexiconError::NotFound { .. })));
    }

    #[test]
    fn test_lexicon_lookup_raw_id() {
        let lexicon = test_lexicon();
        assert_eq!(
            lexicon.lookup(" peanuts ").expect("peanuts present").name(),
            "peanut"
        );
        assert!(matches!(lexicon.lookup("soy"), Err(LexiconError::NotFound { .. })));
        assert!(matches!(lexicon.lookup("Tree Nuts"), Err(LexiconError::InvalidId(_))));
    }

    #[test]
    fn test_lexicon_iterates_in_id_order() {
        let lexicon = test_lexicon();
        let ids: Vec<String> = lexicon.ids().iter().map(ToString::to_string).collect();
        assert_eq!(ids, vec!["milk", "peanuts", "tree_nuts"]);
    }

    #[test]
    fn test_duplicate_allergen_rejected() {
        let result = AllergenLexicon::from_allergens(vec![
            allergen("milk", "milk", &[], &[]),
            allergen("milk", "dairy", &[], &[]),
        ]);
        assert!(matches!(result, Err(LexiconError::DuplicateAllergen { .. })));
    }

    #[test]
    fn test_invalid_allergen_rejected() {
        let result = AllergenLexicon::from_allergens(vec![allergen("milk", "", &[], &[])]);
        assert!(matches!(result, Err(LexiconError::ValidationError { .. })));
    }

    #[test]
    fn test_allergens_with_term() {
        let lexicon = test_lexicon();
        let ids: Vec<String> = lexicon
            .allergens_with_term("Coconut")
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(ids, vec!["milk", "tree_nuts"]);
        assert!(lexicon.allergens_with_term("oat").is_empty());
    }

    #[test]
    fn test_pattern_whole_word() {
        let lexicon = test_lexicon();
        let almond = lexicon
            .patterns()
            .iter()
            .find(|p| p.term() == "almond")
            .expect("almond pattern");
        assert_eq!(almond.kind(), TermKind::Synonym);
        assert_eq!(almond.find_in("trout almondine").count(), 0);
        assert_eq!(
            almond.find_in("almond milk and almond").collect::<Vec<_>>(),
            vec![0..6, 16..22]
        );
    }

    #[test]
    fn test_multi_word_pattern() {
        let lexicon = test_lexicon();
        let pattern = lexicon
            .patterns()
            .iter()
            .find(|p| p.term() == "arachis oil")
            .expect("arachis oil pattern");
        assert_eq!(pattern.normalized(), "arachis oil");
        assert_eq!(pattern.find_in("refined arachis oil").count(), 1);
        assert_eq!(pattern.find_in("arachis").count(), 0);
    }
}
