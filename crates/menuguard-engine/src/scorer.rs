//! Confidence scoring.

use crate::types::{AllergenMatch, OcrQuality, ScoredTerm, TermMatch};
use menuguard_core::AllergenId;

/// Turns raw term matches into per-allergen matches with confidence.
pub trait ConfidenceScorer: Send + Sync {
    /// Score every match and group them by allergen.
    ///
    /// Must never drop a match, however low its confidence.
    fn score(&self, matches: Vec<TermMatch>, ocr_quality: OcrQuality) -> Vec<AllergenMatch>;
}

/// Confidence = term specificity x OCR quality.
///
/// Allergens come out in order of their first appearance in the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecificityScorer;

impl ConfidenceScorer for SpecificityScorer {
    fn score(&self, matches: Vec<TermMatch>, ocr_quality: OcrQuality) -> Vec<AllergenMatch> {
        let mut grouped: Vec<(AllergenId, Vec<ScoredTerm>)> = Vec::new();

        for term in matches {
            let confidence = (term.specificity * ocr_quality.value()).clamp(0.0, 1.0);
            let scored = ScoredTerm { term, confidence };

            match grouped
                .iter_mut()
                .find(|(id, _)| *id == scored.term.allergen_id)
            {
                Some((_, terms)) => terms.push(scored),
                None => grouped.push((scored.term.allergen_id.clone(), vec![scored])),
            }
        }

        grouped
            .into_iter()
            .map(|(allergen_id, terms)| AllergenMatch::new(allergen_id, terms))
            .collect()
    }
}
