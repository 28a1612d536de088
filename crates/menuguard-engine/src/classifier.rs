//! Risk classification.

use crate::profile::UserAllergenProfile;
use crate::types::{AllergenMatch, ClassificationResult};
use menuguard_core::{ConfidenceLevel, RiskTier, SensitivityLevel};
use tracing::debug;

/// Combines a user's sensitivities with scored matches into a verdict.
pub trait RiskClassifier: Send + Sync {
    /// Classify the matches found in `source_text`.
    fn classify(
        &self,
        source_text: &str,
        matches: Vec<AllergenMatch>,
        profile: &UserAllergenProfile,
    ) -> ClassificationResult;
}

/// Fixed decision table over (sensitivity, confidence).
///
/// | sensitivity    | confidence     | tier    |
/// |----------------|----------------|---------|
/// | severe, high   | any            | Unsafe  |
/// | moderate       | medium or high | Unsafe  |
/// | moderate       | low or unknown | Caution |
/// | mild           | any            | Caution |
/// | none           | any            | Safe    |
///
/// The item tier is the worst tier of any match, so adding a match can
/// never make an item look safer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionTableClassifier;

impl DecisionTableClassifier {
    /// Tier for a single match.
    #[must_use]
    pub fn tier_for(sensitivity: SensitivityLevel, confidence: ConfidenceLevel) -> RiskTier {
        match (sensitivity, confidence) {
            (SensitivityLevel::Severe | SensitivityLevel::High, _)
            | (
                SensitivityLevel::Moderate,
                ConfidenceLevel::Medium | ConfidenceLevel::High,
            ) => RiskTier::Unsafe,
            (SensitivityLevel::Moderate, ConfidenceLevel::Low | ConfidenceLevel::Unknown)
            | (SensitivityLevel::Mild, _) => RiskTier::Caution,
            (SensitivityLevel::None, _) => RiskTier::Safe,
        }
    }
}

impl RiskClassifier for DecisionTableClassifier {
    fn classify(
        &self,
        source_text: &str,
        matches: Vec<AllergenMatch>,
        profile: &UserAllergenProfile,
    ) -> ClassificationResult {
        let assessed: Vec<AllergenMatch> = matches
            .into_iter()
            .map(|m| {
                let sensitivity = profile.sensitivity_for(m.allergen_id());
                let risk = Self::tier_for(sensitivity, m.confidence_level());
                m.with_assessment(sensitivity, risk)
            })
            .collect();

        let result = ClassificationResult::from_assessed(source_text, assessed);

        debug!(
            scan_id = %result.scan_id(),
            tier = %result.tier(),
            confidence = %result.confidence(),
            triggering = result.triggering_matches().len(),
            informational = result.informational_matches().len(),
            "classified item"
        );

        result
    }
}
