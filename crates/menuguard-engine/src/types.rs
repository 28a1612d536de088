//! Values produced by a scan.
//!
//! All of these are transient and owned by the caller. Nothing here is
//! mutated after the pipeline hands it back.

use crate::error::{EngineError, Result};
use menuguard_core::{AllergenId, ConfidenceLevel, RiskTier, ScanId, SensitivityLevel, Timestamp};
use menuguard_lexicon::TermKind;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Recognition quality reported by the OCR stage, 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct OcrQuality(f32);

impl OcrQuality {
    /// Text that was typed rather than recognized.
    pub const PERFECT: Self = Self(1.0);

    /// Validate a raw quality value.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidOcrQuality`] for NaN or values outside 0.0-1.0.
    pub fn new(value: f32) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(EngineError::InvalidOcrQuality { value })
        }
    }

    /// The raw value.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for OcrQuality {
    fn default() -> Self {
        Self::PERFECT
    }
}

impl TryFrom<f32> for OcrQuality {
    type Error = EngineError;

    fn try_from(value: f32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<OcrQuality> for f32 {
    fn from(quality: OcrQuality) -> Self {
        quality.0
    }
}

/// One lexicon term found in the source text.
///
/// Offsets are byte positions in the original, un-normalized text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermMatch {
    /// Allergen the term belongs to
    pub allergen_id: AllergenId,
    /// Lexicon term as written in the definition
    pub term: String,
    /// Source text covered by the match
    pub matched_text: String,
    /// Start byte offset in the source text
    pub start: usize,
    /// End byte offset (exclusive) in the source text
    pub end: usize,
    /// Canonical name, synonym or hidden form
    pub kind: TermKind,
    /// Intrinsic weight of the term kind
    pub specificity: f32,
}

impl TermMatch {
    /// Byte range in the source text.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Whether this match shares at least one byte with `range`.
    #[must_use]
    pub fn overlaps(&self, range: &Range<usize>) -> bool {
        self.start < range.end && range.start < self.end
    }
}

/// A term match with its confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTerm {
    /// The underlying match
    #[serde(flatten)]
    pub term: TermMatch,
    /// Specificity scaled by OCR quality, 0.0-1.0
    pub confidence: f32,
}

/// All matches of one allergen within one text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllergenMatch {
    allergen_id: AllergenId,
    terms: Vec<ScoredTerm>,
    sensitivity: SensitivityLevel,
    confidence: f32,
    confidence_level: ConfidenceLevel,
    risk: RiskTier,
}

impl AllergenMatch {
    /// Group scored terms for one allergen.
    ///
    /// Confidence is the best confidence among the terms. Sensitivity and
    /// risk start at none/Safe until a classifier assesses the match.
    #[must_use]
    pub fn new(allergen_id: AllergenId, terms: Vec<ScoredTerm>) -> Self {
        let confidence = terms.iter().map(|t| t.confidence).fold(0.0_f32, f32::max);
        Self {
            allergen_id,
            terms,
            sensitivity: SensitivityLevel::None,
            confidence,
            confidence_level: ConfidenceLevel::from_score(confidence),
            risk: RiskTier::Safe,
        }
    }

    /// Attach the user's sensitivity and the resulting risk.
    #[must_use]
    pub fn with_assessment(mut self, sensitivity: SensitivityLevel, risk: RiskTier) -> Self {
        self.sensitivity = sensitivity;
        self.risk = risk;
        self
    }

    /// Allergen matched.
    #[must_use]
    pub fn allergen_id(&self) -> &AllergenId {
        &self.allergen_id
    }

    /// Every term occurrence, in source order.
    #[must_use]
    pub fn terms(&self) -> &[ScoredTerm] {
        &self.terms
    }

    /// User's sensitivity to this allergen.
    #[must_use]
    pub fn sensitivity(&self) -> SensitivityLevel {
        self.sensitivity
    }

    /// Best term confidence.
    #[must_use]
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Confidence bucket.
    #[must_use]
    pub fn confidence_level(&self) -> ConfidenceLevel {
        self.confidence_level
    }

    /// Tier this match alone would give the item.
    #[must_use]
    pub fn risk(&self) -> RiskTier {
        self.risk
    }

    /// Whether the user is sensitive to this allergen at all.
    #[must_use]
    pub fn is_triggering(&self) -> bool {
        self.sensitivity.is_sensitive()
    }

    /// Whether any term of this match overlaps `range`.
    #[must_use]
    pub fn overlaps(&self, range: &Range<usize>) -> bool {
        self.terms.iter().any(|t| t.term.overlaps(range))
    }
}

/// Outcome of classifying one menu item or label.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    scan_id: ScanId,
    timestamp: Timestamp,
    source_text: String,
    tier: RiskTier,
    confidence: ConfidenceLevel,
    triggering_matches: Vec<AllergenMatch>,
    informational_matches: Vec<AllergenMatch>,
}

impl ClassificationResult {
    /// Build a result from assessed matches.
    ///
    /// The tier is the highest risk of any match (Safe when there are none)
    /// and the confidence is the lowest across matches (Unknown when there
    /// are none).
    #[must_use]
    pub fn from_assessed(source_text: impl Into<String>, matches: Vec<AllergenMatch>) -> Self {
        let tier = matches
            .iter()
            .map(AllergenMatch::risk)
            .max()
            .unwrap_or(RiskTier::Safe);
        let confidence = matches
            .iter()
            .map(AllergenMatch::confidence_level)
            .min()
            .unwrap_or(ConfidenceLevel::Unknown);
        let (triggering_matches, informational_matches) =
            matches.into_iter().partition(AllergenMatch::is_triggering);

        Self {
            scan_id: ScanId::generate(),
            timestamp: Timestamp::now(),
            source_text: source_text.into(),
            tier,
            confidence,
            triggering_matches,
            informational_matches,
        }
    }

    /// Unique ID of this scan.
    #[must_use]
    pub fn scan_id(&self) -> &ScanId {
        &self.scan_id
    }

    /// When the scan was classified.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Text that was scanned.
    #[must_use]
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// Overall risk tier.
    #[must_use]
    pub fn tier(&self) -> RiskTier {
        self.tier
    }

    /// Aggregate confidence.
    #[must_use]
    pub fn confidence(&self) -> ConfidenceLevel {
        self.confidence
    }

    /// Matches for allergens the user is sensitive to.
    #[must_use]
    pub fn triggering_matches(&self) -> &[AllergenMatch] {
        &self.triggering_matches
    }

    /// Matches for allergens the user is not sensitive to.
    #[must_use]
    pub fn informational_matches(&self) -> &[AllergenMatch] {
        &self.informational_matches
    }

    /// Find the match for an allergen, triggering or not.
    #[must_use]
    pub fn match_for(&self, allergen_id: &AllergenId) -> Option<&AllergenMatch> {
        self.triggering_matches
            .iter()
            .chain(&self.informational_matches)
            .find(|m| m.allergen_id() == allergen_id)
    }
}

/// A replacement ingredient that keeps the user clear of their allergens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstitutionCandidate {
    /// Ingredient to replace, as written in the substitution map
    pub original: String,
    /// Replacement ingredient
    pub replacement: String,
    /// How commonly interchangeable, 0.0-1.0
    pub feasibility: f32,
    /// Triggering allergens the replacement removes
    pub removes: Vec<AllergenId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> AllergenId {
        AllergenId::new(value).expect("valid allergen ID")
    }

    fn scored(allergen: &str, start: usize, end: usize, confidence: f32) -> ScoredTerm {
        ScoredTerm {
            term: TermMatch {
                allergen_id: id(allergen),
                term: "term".to_string(),
                matched_text: "term".to_string(),
                start,
                end,
                kind: TermKind::Canonical,
                specificity: 1.0,
            },
            confidence,
        }
    }

    #[test]
    fn test_ocr_quality_bounds() {
        assert!(OcrQuality::new(0.0).is_ok());
        assert!(OcrQuality::new(1.0).is_ok());
        assert!(matches!(
            OcrQuality::new(1.01),
            Err(EngineError::InvalidOcrQuality { .. })
        ));
        assert!(OcrQuality::new(-0.1).is_err());
        assert!(OcrQuality::new(f32::NAN).is_err());
        assert_eq!(OcrQuality::default(), OcrQuality::PERFECT);
    }

    #[test]
    fn test_ocr_quality_deserialize_validates() {
        let ok: OcrQuality = serde_json::from_str("0.75").expect("valid quality");
        assert!((ok.value() - 0.75).abs() < f32::EPSILON);
        assert!(serde_json::from_str::<OcrQuality>("2.0").is_err());
    }

    #[test]
    fn test_term_match_overlaps() {
        let term = scored("milk", 5, 10, 1.0).term;
        assert!(term.overlaps(&(8..12)));
        assert!(term.overlaps(&(0..6)));
        assert!(!term.overlaps(&(10..12)));
        assert!(!term.overlaps(&(0..5)));
        assert_eq!(term.span(), 5..10);
    }

    #[test]
    fn test_allergen_match_takes_best_confidence() {
        let m = AllergenMatch::new(
            id("milk"),
            vec![scored("milk", 0, 4, 0.3), scored("milk", 10, 14, 0.85)],
        );
        assert!((m.confidence() - 0.85).abs() < f32::EPSILON);
        assert_eq!(m.confidence_level(), ConfidenceLevel::High);
        assert_eq!(m.sensitivity(), SensitivityLevel::None);
        assert_eq!(m.risk(), RiskTier::Safe);
        assert!(!m.is_triggering());
    }

    #[test]
    fn test_empty_result_is_safe_and_unknown() {
        let result = ClassificationResult::from_assessed("plain rice", Vec::new());
        assert_eq!(result.tier(), RiskTier::Safe);
        assert_eq!(result.confidence(), ConfidenceLevel::Unknown);
        assert!(result.triggering_matches().is_empty());
        assert_eq!(result.source_text(), "plain rice");
    }

    #[test]
    fn test_result_partitions_and_aggregates() {
        let peanut = AllergenMatch::new(id("peanuts"), vec![scored("peanuts", 0, 6, 0.9)])
            .with_assessment(SensitivityLevel::Severe, RiskTier::Unsafe);
        let wheat = AllergenMatch::new(id("wheat"), vec![scored("wheat", 10, 15, 0.4)]);

        let result = ClassificationResult::from_assessed("text", vec![peanut, wheat]);
        assert_eq!(result.tier(), RiskTier::Unsafe);
        assert_eq!(result.confidence(), ConfidenceLevel::Low);
        assert_eq!(result.triggering_matches().len(), 1);
        assert_eq!(result.informational_matches().len(), 1);
        assert!(result.match_for(&id("wheat")).is_some());
        assert!(result.match_for(&id("soy")).is_none());
    }

    #[test]
    fn test_result_serializes() {
        let result = ClassificationResult::from_assessed("text", Vec::new());
        let json = serde_json::to_value(&result).expect("serialize result");
        assert_eq!(json["tier"], "Safe");
        assert_eq!(json["confidence"], "unknown");
        assert!(json["scan_id"].is_string());
    }
}
