//! Substitution recommendation.

use crate::matcher::{AllergenMatcher, LexiconMatcher};
use crate::profile::UserAllergenProfile;
use crate::types::{ClassificationResult, SubstitutionCandidate};
use menuguard_core::AllergenId;
use menuguard_lexicon::{normalize_readings, AllergenLexicon, Replacement, SubstitutionMap};
use std::cmp::Ordering;
use std::ops::Range;
use tracing::{debug, warn};

/// Proposes replacement ingredients for a flagged item.
pub trait SubstitutionRecommender: Send + Sync {
    /// Ranked substitutions for `item`. Empty means no known safe alternative.
    fn recommend(
        &self,
        item: &ClassificationResult,
        lexicon: &AllergenLexicon,
        substitutions: &SubstitutionMap,
        profile: &UserAllergenProfile,
    ) -> Vec<SubstitutionCandidate>;
}

/// Recommender that re-checks every replacement against the lexicon.
///
/// A replacement is offered only if running it through the matcher finds
/// nothing the user is sensitive to.
#[derive(Debug, Clone, Default)]
pub struct SafeSubstitutionRecommender<M = LexiconMatcher> {
    matcher: M,
    max_candidates: usize,
}

impl SafeSubstitutionRecommender<LexiconMatcher> {
    /// Create a recommender with no limit on candidates.
    #[must_use]
    pub fn new() -> Self {
        Self::with_matcher(LexiconMatcher)
    }
}

impl<M: AllergenMatcher> SafeSubstitutionRecommender<M> {
    /// Create a recommender that re-checks replacements with `matcher`.
    #[must_use]
    pub fn with_matcher(matcher: M) -> Self {
        Self {
            matcher,
            max_candidates: 0,
        }
    }

    /// Keep at most `max` candidates (0 = unlimited).
    #[must_use]
    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max;
        self
    }

    /// Whether `replacement` is free of every allergen the user reacts to.
    fn is_safe_replacement(
        &self,
        replacement: &str,
        lexicon: &AllergenLexicon,
        profile: &UserAllergenProfile,
    ) -> bool {
        let hits = match self.matcher.find_matches(replacement, lexicon) {
            Ok(hits) => hits,
            Err(e) => {
                warn!(replacement, error = %e, "discarding unscannable replacement");
                return false;
            }
        };

        match hits
            .iter()
            .find(|hit| profile.sensitivity_for(&hit.allergen_id).is_sensitive())
        {
            Some(hit) => {
                debug!(
                    replacement,
                    allergen_id = %hit.allergen_id,
                    term = %hit.term,
                    "discarding replacement containing a profile allergen"
                );
                false
            }
            None => true,
        }
    }
}

impl<M: AllergenMatcher> SubstitutionRecommender for SafeSubstitutionRecommender<M> {
    fn recommend(
        &self,
        item: &ClassificationResult,
        lexicon: &AllergenLexicon,
        substitutions: &SubstitutionMap,
        profile: &UserAllergenProfile,
    ) -> Vec<SubstitutionCandidate> {
        if !item.tier().is_flagged() || substitutions.is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<SubstitutionCandidate> = Vec::new();

        for normalized in normalize_readings(item.source_text()) {
            for (rule, range) in substitutions.occurrences(normalized.as_str()) {
                let Some(source) = normalized.source_range(range) else {
                    continue;
                };

                let removes = offending_allergens(item, &source);
                if removes.is_empty() {
                    continue;
                }

                for replacement in &rule.replacements {
                    if !self.is_safe_replacement(&replacement.name, lexicon, profile) {
                        continue;
                    }

                    merge_candidate(&mut candidates, &rule.original, replacement, &removes);
                }
            }
        }

        candidates.sort_by(|a, b| {
            b.feasibility
                .partial_cmp(&a.feasibility)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.replacement.cmp(&b.replacement))
                .then_with(|| a.original.cmp(&b.original))
        });
        if self.max_candidates > 0 {
            candidates.truncate(self.max_candidates);
        }

        if candidates.is_empty() {
            debug!(scan_id = %item.scan_id(), "no safe substitution found");
        }

        candidates
    }
}

/// Add a candidate, or fold it into an existing one for the same pair.
fn merge_candidate(
    candidates: &mut Vec<SubstitutionCandidate>,
    original: &str,
    replacement: &Replacement,
    removes: &[AllergenId],
) {
    let existing = candidates
        .iter_mut()
        .find(|c| c.original == original && c.replacement == replacement.name);
    match existing {
        Some(candidate) => {
            candidate.feasibility = candidate.feasibility.max(replacement.feasibility);
            for id in removes {
                if !candidate.removes.contains(id) {
                    candidate.removes.push(id.clone());
                }
            }
            candidate.removes.sort();
        }
        None => candidates.push(SubstitutionCandidate {
            original: original.to_string(),
            replacement: replacement.name.clone(),
            feasibility: replacement.feasibility,
            removes: removes.to_vec(),
        }),
    }
}

/// Triggering allergens with a term overlapping `source`, in ID order.
fn offending_allergens(item: &ClassificationResult, source: &Range<usize>) -> Vec<AllergenId> {
    let mut ids: Vec<AllergenId> = item
        .triggering_matches()
        .iter()
        .filter(|m| m.overlaps(source))
        .map(|m| m.allergen_id().clone())
        .collect();
    ids.sort();
    ids.dedup();
    ids
}
