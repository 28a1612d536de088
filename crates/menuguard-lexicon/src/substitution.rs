//! Ingredient substitution map.
//!
//! Loaded from `substitutions.toml`:
//!
//! ```toml
//! [[substitution]]
//! original = "almond milk"
//! replacements = [
//!     { name = "oat milk", feasibility = 0.9 },
//!     { name = "coconut milk", feasibility = 0.8 },
//! ]
//! ```
//!
//! Rules sharing an `original` (after normalization) are merged.

use crate::error::{LexiconError, Result};
use crate::normalize::normalize_term;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

/// Contents of a substitutions file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubstitutionFile {
    /// All rules in file order
    #[serde(default, rename = "substitution")]
    pub substitutions: Vec<SubstitutionRule>,
}

/// Replacements for one original ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionRule {
    /// Ingredient to replace
    pub original: String,
    /// Candidate replacements
    pub replacements: Vec<Replacement>,
}

/// A proposed replacement ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replacement {
    /// Replacement ingredient name
    pub name: String,
    /// How commonly interchangeable it is, 0.0-1.0 (higher is better)
    pub feasibility: f32,
}

/// Read-only snapshot of substitution rules with compiled lookups.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionMap {
    rules: Arc<Vec<CompiledRule>>,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: SubstitutionRule,
    normalized: String,
    regex: Regex,
}

impl SubstitutionMap {
    /// A map with no rules.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a map from rules, validating and merging as it goes.
    ///
    /// # Errors
    /// Returns error if a rule has a blank original or replacement, a
    /// feasibility outside 0.0-1.0, or replaces an ingredient with itself.
    pub fn from_rules(rules: impl IntoIterator<Item = SubstitutionRule>) -> Result<Self> {
        let mut compiled: Vec<CompiledRule> = Vec::new();

        for rule in rules {
            validate_rule(&rule)?;
            let normalized = normalize_term(&rule.original);

            if let Some(existing) = compiled.iter_mut().find(|c| c.normalized == normalized) {
                existing.rule.replacements.extend(rule.replacements);
                continue;
            }

            let regex = Regex::new(&format!(r"\b{}\b", regex::escape(&normalized))).map_err(
                |source| LexiconError::InvalidPattern {
                    term: rule.original.clone(),
                    source,
                },
            )?;
            compiled.push(CompiledRule {
                rule,
                normalized,
                regex,
            });
        }

        debug!(rules = compiled.len(), "compiled substitution map");

        Ok(Self {
            rules: Arc::new(compiled),
        })
    }

    /// Parse and build a map from TOML text.
    ///
    /// # Errors
    /// Returns error if the TOML is malformed or a rule is invalid.
    pub fn from_toml_str(contents: &str, path: &str) -> Result<Self> {
        let file: SubstitutionFile =
            toml::from_str(contents).map_err(|source| LexiconError::ParseError {
                path: path.to_string(),
                source,
            })?;
        Self::from_rules(file.substitutions)
    }

    /// Number of distinct originals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the map has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules after merging.
    pub fn rules(&self) -> impl Iterator<Item = &SubstitutionRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    /// Replacements for an original ingredient, matched after normalization.
    #[must_use]
    pub fn replacements_for(&self, original: &str) -> Option<&[Replacement]> {
        let normalized = normalize_term(original);
        self.rules
            .iter()
            .find(|c| c.normalized == normalized)
            .map(|c| c.rule.replacements.as_slice())
    }

    /// Every whole-word occurrence of a rule's original in normalized text,
    /// as (rule, normalized byte range).
    pub fn occurrences<'a>(
        &'a self,
        normalized_text: &'a str,
    ) -> impl Iterator<Item = (&'a SubstitutionRule, Range<usize>)> + 'a {
        self.rules.iter().flat_map(move |c| {
            c.regex
                .find_iter(normalized_text)
                .map(move |m| (&c.rule, m.range()))
        })
    }
}

fn validate_rule(rule: &SubstitutionRule) -> Result<()> {
    let invalid = |reason: String| LexiconError::InvalidSubstitution {
        original: rule.original.clone(),
        reason,
    };

    let original = normalize_term(&rule.original);
    if original.is_empty() {
        return Err(invalid("original cannot be blank".to_string()));
    }

    if rule.replacements.is_empty() {
        return Err(invalid("at least one replacement is required".to_string()));
    }

    for replacement in &rule.replacements {
        let name = normalize_term(&replacement.name);
        if name.is_empty() {
            return Err(invalid("replacement name cannot be blank".to_string()));
        }
        if name == original {
            return Err(invalid(format!(
                "'{}' cannot replace itself",
                replacement.name
            )));
        }
        if !(0.0..=1.0).contains(&replacement.feasibility) {
            return Err(invalid(format!(
                "feasibility for '{}' must be within 0.0-1.0, got {}",
                replacement.name, replacement.feasibility
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[substitution]]
original = "almond milk"
replacements = [
    { name = "oat milk", feasibility = 0.9 },
]

[[substitution]]
original = "Almond  Milk"
replacements = [
    { name = "coconut milk", feasibility = 0.8 },
]

[[substitution]]
original = "butter"
replacements = [{ name = "olive oil", feasibility = 0.6 }]
"#;

    #[test]
    fn test_parse_and_merge() {
        let map = SubstitutionMap::from_toml_str(SAMPLE, "substitutions.toml").expect("parse map");
        assert_eq!(map.len(), 2);

        let replacements = map
            .replacements_for("almond milk")
            .expect("almond milk rule");
        let names: Vec<&str> = replacements.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["oat milk", "coconut milk"]);
    }

    #[test]
    fn test_empty_file() {
        let map = SubstitutionMap::from_toml_str("", "substitutions.toml").expect("parse map");
        assert!(map.is_empty());
        assert!(SubstitutionMap::empty().replacements_for("milk").is_none());
    }

    #[test]
    fn test_occurrences_whole_word() {
        let map = SubstitutionMap::from_toml_str(SAMPLE, "substitutions.toml").expect("parse map");
        let found: Vec<(String, Range<usize>)> = map
            .occurrences("almond milk latte with butter")
            .map(|(rule, range)| (rule.original.clone(), range))
            .collect();
        assert_eq!(
            found,
            vec![
                ("almond milk".to_string(), 0..11),
                ("butter".to_string(), 23..29)
            ]
        );
        assert_eq!(map.occurrences("buttermilk").count(), 0);
    }

    #[test]
    fn test_rejects_out_of_range_feasibility() {
        let rule = SubstitutionRule {
            original: "butter".to_string(),
            replacements: vec![Replacement {
                name: "margarine".to_string(),
                feasibility: 1.5,
            }],
        };
        assert!(matches!(
            SubstitutionMap::from_rules(vec![rule]),
            Err(LexiconError::InvalidSubstitution { .. })
        ));
    }

    #[test]
    fn test_rejects_self_replacement() {
        let rule = SubstitutionRule {
            original: "Butter".to_string(),
            replacements: vec![Replacement {
                name: "butter".to_string(),
                feasibility: 0.5,
            }],
        };
        assert!(SubstitutionMap::from_rules(vec![rule]).is_err());
    }

    #[test]
    fn test_rejects_missing_replacements() {
        let rule = SubstitutionRule {
            original: "butter".to_string(),
            replacements: vec![],
        };
        assert!(SubstitutionMap::from_rules(vec![rule]).is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let result = SubstitutionMap::from_toml_str("[[substitution]\n", "bad.toml");
        assert!(matches!(result, Err(LexiconError::ParseError { .. })));
    }
}
