//! Allergen term matching.

use crate::error::{EngineError, Result};
use crate::types::TermMatch;
use menuguard_lexicon::{normalize_readings, AllergenLexicon};
use tracing::debug;

/// Finds lexicon terms in recognized text.
///
/// Implementations must be deterministic: the same text and lexicon always
/// yield the same matches in the same order.
pub trait AllergenMatcher: Send + Sync {
    /// Find every allergen term in `text`.
    ///
    /// # Errors
    /// Returns [`EngineError::EmptyText`] if `text` is blank.
    fn find_matches(&self, text: &str, lexicon: &AllergenLexicon) -> Result<Vec<TermMatch>>;
}

/// Whole-word matcher over normalized text.
///
/// Overlapping matches are all kept, so "peanut oil" reports both the
/// `peanut` and `peanut oil` terms when both are listed. Text with a hyphen
/// at a line break is scanned both rejoined and split, and the matches are
/// merged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconMatcher;

impl AllergenMatcher for LexiconMatcher {
    fn find_matches(&self, text: &str, lexicon: &AllergenLexicon) -> Result<Vec<TermMatch>> {
        if text.trim().is_empty() {
            return Err(EngineError::EmptyText);
        }

        let mut matches = Vec::new();

        for normalized in normalize_readings(text) {
            for pattern in lexicon.patterns() {
                for range in pattern.find_in(normalized.as_str()) {
                    let Some(source) = normalized.source_range(range) else {
                        continue;
                    };
                    matches.push(TermMatch {
                        allergen_id: pattern.allergen_id().clone(),
                        term: pattern.term().to_string(),
                        matched_text: text.get(source.clone()).unwrap_or_default().to_string(),
                        start: source.start,
                        end: source.end,
                        kind: pattern.kind(),
                        specificity: pattern.kind().specificity(),
                    });
                }
            }
        }

        matches.sort_by(|a, b| {
            (a.start, a.end, &a.allergen_id, a.kind, &a.term)
                .cmp(&(b.start, b.end, &b.allergen_id, b.kind, &b.term))
        });
        // readings agree outside line wraps
        matches.dedup_by(|a, b| {
            (a.start, a.end, &a.allergen_id, a.kind, &a.term)
                == (b.start, b.end, &b.allergen_id, b.kind, &b.term)
        });

        debug!(
            matches = matches.len(),
            text_len = text.len(),
            "matched allergen terms"
        );

        Ok(matches)
    }
}
