//! Synchronous scan pipeline.
//!
//! `SafetyEngine` wires the four components together:
//! validate → match → score → classify → (if flagged) recommend.

use crate::classifier::{DecisionTableClassifier, RiskClassifier};
use crate::error::Result;
use crate::matcher::{AllergenMatcher, LexiconMatcher};
use crate::profile::UserAllergenProfile;
use crate::recommender::{SafeSubstitutionRecommender, SubstitutionRecommender};
use crate::scorer::{ConfidenceScorer, SpecificityScorer};
use crate::types::{ClassificationResult, OcrQuality, SubstitutionCandidate};
use menuguard_core::{AppConfig, RiskTier};
use menuguard_lexicon::{AllergenLexicon, SubstitutionMap};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default quality below which results are flagged as low confidence.
pub const DEFAULT_LOW_QUALITY_THRESHOLD: f32 = 0.5;

/// One recognized text region to scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Optional caller label (menu item name, region ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Recognized text
    pub text: String,
    /// OCR quality, validated when scanned
    pub ocr_quality: f32,
}

impl ScanRequest {
    /// Create a request for `text` recognized at `ocr_quality`.
    #[must_use]
    pub fn new(text: impl Into<String>, ocr_quality: f32) -> Self {
        Self {
            label: None,
            text: text.into(),
            ocr_quality,
        }
    }

    /// Attach a label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Classification plus ranked substitutions for one request.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    classification: ClassificationResult,
    substitutions: Vec<SubstitutionCandidate>,
    manual_avoidance: bool,
}

impl ScanOutcome {
    fn new(
        label: Option<String>,
        classification: ClassificationResult,
        substitutions: Vec<SubstitutionCandidate>,
    ) -> Self {
        let manual_avoidance = classification.tier().is_flagged() && substitutions.is_empty();
        Self {
            label,
            classification,
            substitutions,
            manual_avoidance,
        }
    }

    /// Caller label from the request.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The classification.
    #[must_use]
    pub fn classification(&self) -> &ClassificationResult {
        &self.classification
    }

    /// Shortcut for the classification tier.
    #[must_use]
    pub fn tier(&self) -> RiskTier {
        self.classification.tier()
    }

    /// Safe substitutions, best first.
    #[must_use]
    pub fn substitutions(&self) -> &[SubstitutionCandidate] {
        &self.substitutions
    }

    /// Flagged with no known safe alternative: the user has to avoid the
    /// item or ask staff.
    #[must_use]
    pub fn needs_manual_avoidance(&self) -> bool {
        self.manual_avoidance
    }
}

/// Scan pipeline over a shared lexicon and substitution map.
///
/// Components are injected through type parameters; the defaults are the
/// stock implementations.
#[derive(Debug, Clone)]
pub struct SafetyEngine<
    M = LexiconMatcher,
    S = SpecificityScorer,
    C = DecisionTableClassifier,
    R = SafeSubstitutionRecommender<LexiconMatcher>,
> {
    lexicon: AllergenLexicon,
    substitutions: SubstitutionMap,
    matcher: M,
    scorer: S,
    classifier: C,
    recommender: R,
    low_quality_threshold: f32,
}

impl SafetyEngine {
    /// Engine with the stock components.
    #[must_use]
    pub fn new(lexicon: AllergenLexicon, substitutions: SubstitutionMap) -> Self {
        Self::with_components(
            lexicon,
            substitutions,
            LexiconMatcher,
            SpecificityScorer,
            DecisionTableClassifier,
            SafeSubstitutionRecommender::new(),
        )
    }

    /// Engine with the stock components tuned from configuration.
    #[must_use]
    pub fn from_config(
        lexicon: AllergenLexicon,
        substitutions: SubstitutionMap,
        config: &AppConfig,
    ) -> Self {
        Self::with_components(
            lexicon,
            substitutions,
            LexiconMatcher,
            SpecificityScorer,
            DecisionTableClassifier,
            SafeSubstitutionRecommender::new()
                .with_max_candidates(config.recommendations.max_candidates),
        )
        .with_low_quality_threshold(config.scanning.low_quality_threshold)
    }
}

impl<M, S, C, R> SafetyEngine<M, S, C, R>
where
    M: AllergenMatcher,
    S: ConfidenceScorer,
    C: RiskClassifier,
    R: SubstitutionRecommender,
{
    /// Engine with caller-supplied components.
    #[must_use]
    pub fn with_components(
        lexicon: AllergenLexicon,
        substitutions: SubstitutionMap,
        matcher: M,
        scorer: S,
        classifier: C,
        recommender: R,
    ) -> Self {
        Self {
            lexicon,
            substitutions,
            matcher,
            scorer,
            classifier,
            recommender,
            low_quality_threshold: DEFAULT_LOW_QUALITY_THRESHOLD,
        }
    }

    /// Set the quality below which scans log a low-confidence warning.
    #[must_use]
    pub fn with_low_quality_threshold(mut self, threshold: f32) -> Self {
        self.low_quality_threshold = threshold;
        self
    }

    /// The lexicon scans run against.
    #[must_use]
    pub fn lexicon(&self) -> &AllergenLexicon {
        &self.lexicon
    }

    /// The substitution map recommendations come from.
    #[must_use]
    pub fn substitutions(&self) -> &SubstitutionMap {
        &self.substitutions
    }

    /// Scan one text region.
    ///
    /// # Errors
    /// Returns error if the OCR quality is invalid or the text is blank.
    pub fn scan(
        &self,
        request: &ScanRequest,
        profile: &UserAllergenProfile,
    ) -> Result<ScanOutcome> {
        let quality = OcrQuality::new(request.ocr_quality)?;
        let label = request.label.as_deref().unwrap_or("");

        if quality.value() < self.low_quality_threshold {
            warn!(
                label,
                ocr_quality = quality.value(),
                threshold = self.low_quality_threshold,
                "low OCR quality, matches will carry low confidence"
            );
        }

        for allergen_id in profile.unknown_allergens(&self.lexicon) {
            warn!(
                allergen_id = %allergen_id,
                "profile allergen is not in the lexicon and cannot be detected"
            );
        }

        let term_matches = self.matcher.find_matches(&request.text, &self.lexicon)?;
        let scored = self.scorer.score(term_matches, quality);
        let classification = self.classifier.classify(&request.text, scored, profile);

        let substitutions = if classification.tier().is_flagged() {
            self.recommender
                .recommend(&classification, &self.lexicon, &self.substitutions, profile)
        } else {
            Vec::new()
        };

        debug!(
            label,
            scan_id = %classification.scan_id(),
            tier = %classification.tier(),
            substitutions = substitutions.len(),
            "scan complete"
        );

        Ok(ScanOutcome::new(
            request.label.clone(),
            classification,
            substitutions,
        ))
    }

    /// Scan several regions, one result per request in input order.
    ///
    /// A failing request doesn't stop the others.
    pub fn scan_batch(
        &self,
        requests: &[ScanRequest],
        profile: &UserAllergenProfile,
    ) -> Vec<Result<ScanOutcome>> {
        requests
            .iter()
            .map(|request| self.scan(request, profile))
            .collect()
    }
}
