//! Concurrent menu scanning.
//!
//! Items run on tokio's blocking pool since classification is CPU-bound.
//! At most `max_concurrent_scans` are in flight at once.

use crate::classifier::RiskClassifier;
use crate::engine::{SafetyEngine, ScanOutcome, ScanRequest};
use crate::error::EngineError;
use crate::matcher::AllergenMatcher;
use crate::profile::UserAllergenProfile;
use crate::recommender::SubstitutionRecommender;
use crate::scorer::ConfidenceScorer;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tracing::{error, info};

/// Default number of items scanned at once.
pub const DEFAULT_MAX_CONCURRENT_SCANS: usize = 4;

/// Result of scanning one menu item.
#[derive(Debug)]
pub struct ItemScanResult {
    /// Position of the item in the input
    pub index: usize,
    /// Caller label from the request
    pub label: Option<String>,
    /// Outcome, or why this item could not be scanned
    pub outcome: Result<ScanOutcome, EngineError>,
}

/// Scans whole menus with bounded concurrency.
pub struct MenuScanner<M, S, C, R> {
    engine: Arc<SafetyEngine<M, S, C, R>>,
    max_concurrent_scans: usize,
}

impl<M, S, C, R> MenuScanner<M, S, C, R>
where
    M: AllergenMatcher + 'static,
    S: ConfidenceScorer + 'static,
    C: RiskClassifier + 'static,
    R: SubstitutionRecommender + 'static,
{
    /// Create a scanner over a shared engine.
    #[must_use]
    pub fn new(engine: Arc<SafetyEngine<M, S, C, R>>) -> Self {
        Self {
            engine,
            max_concurrent_scans: DEFAULT_MAX_CONCURRENT_SCANS,
        }
    }

    /// Set the maximum number of items in flight (at least 1).
    #[must_use]
    pub fn with_max_concurrent_scans(mut self, max: usize) -> Self {
        self.max_concurrent_scans = max.max(1);
        self
    }

    /// The engine items are scanned with.
    #[must_use]
    pub fn engine(&self) -> &SafetyEngine<M, S, C, R> {
        &self.engine
    }

    /// Scan every item, returning one result per request in input order.
    ///
    /// A failing item is reported in its own result and never aborts the
    /// rest of the menu.
    pub async fn scan_menu(
        &self,
        requests: Vec<ScanRequest>,
        profile: &UserAllergenProfile,
    ) -> Vec<ItemScanResult> {
        let total = requests.len();
        let profile = Arc::new(profile.clone());
        let mut futures = FuturesUnordered::new();
        let mut results = Vec::with_capacity(total);

        for (index, request) in requests.into_iter().enumerate() {
            let engine = Arc::clone(&self.engine);
            let profile = Arc::clone(&profile);
            let label = request.label.clone();

            futures.push(async move {
                let outcome =
                    tokio::task::spawn_blocking(move || engine.scan(&request, &profile))
                        .await
                        .unwrap_or_else(|e| {
                            error!(index, error = %e, "scan task failed");
                            Err(EngineError::TaskFailed(e.to_string()))
                        });
                ItemScanResult {
                    index,
                    label,
                    outcome,
                }
            });

            // Respect concurrency limit
            while futures.len() >= self.max_concurrent_scans {
                if let Some(result) = futures.next().await {
                    results.push(result);
                }
            }
        }

        // Collect remaining results
        while let Some(result) = futures.next().await {
            results.push(result);
        }

        results.sort_by_key(|r| r.index);

        let failed = results.iter().filter(|r| r.outcome.is_err()).count();
        info!(items = total, failed, "menu scan complete");

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menuguard_core::{AllergenId, RiskTier, SensitivityLevel};
    use menuguard_lexicon::{Allergen, AllergenLexicon, SubstitutionMap};

    fn id(value: &str) -> AllergenId {
        AllergenId::new(value).expect("valid allergen ID")
    }

    fn engine() -> Arc<SafetyEngine> {
        let lexicon = AllergenLexicon::from_allergens(vec![Allergen {
            id: id("peanuts"),
            name: "peanut".to_string(),
            display_name: "Peanuts".to_string(),
            default_severity: SensitivityLevel::Severe,
            synonyms: vec!["groundnut".to_string()],
            hidden_forms: vec![],
        }])
        .expect("build lexicon");
        Arc::new(SafetyEngine::new(lexicon, SubstitutionMap::empty()))
    }

    #[test]
    fn test_max_concurrent_scans_at_least_one() {
        let scanner = MenuScanner::new(engine()).with_max_concurrent_scans(0);
        assert_eq!(scanner.max_concurrent_scans, 1);
    }

    #[tokio::test]
    async fn test_results_in_input_order() {
        let scanner = MenuScanner::new(engine()).with_max_concurrent_scans(2);
        let profile = UserAllergenProfile::new().with(id("peanuts"), SensitivityLevel::Severe);

        let requests: Vec<ScanRequest> = (0..10)
            .map(|i| {
                let text = if i % 2 == 0 { "peanut noodles" } else { "rice" };
                ScanRequest::new(text, 0.9).with_label(format!("item {i}"))
            })
            .collect();

        let results = scanner.scan_menu(requests, &profile).await;
        assert_eq!(results.len(), 10);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.index, i);
            assert_eq!(result.label.as_deref(), Some(format!("item {i}").as_str()));
            let expected = if i % 2 == 0 {
                RiskTier::Unsafe
            } else {
                RiskTier::Safe
            };
            assert_eq!(
                result.outcome.as_ref().expect("item scans").tier(),
                expected
            );
        }
    }

    #[tokio::test]
    async fn test_bad_item_does_not_abort_menu() {
        let scanner = MenuScanner::new(engine());
        let profile = UserAllergenProfile::new().with(id("peanuts"), SensitivityLevel::Severe);

        let results = scanner
            .scan_menu(
                vec![
                    ScanRequest::new("groundnut stew", 0.8),
                    ScanRequest::new("", 0.8),
                    ScanRequest::new("peanut brittle", 7.0),
                    ScanRequest::new("plain toast", 0.8),
                ],
                &profile,
            )
            .await;

        assert!(results[0].outcome.is_ok());
        assert!(matches!(results[1].outcome, Err(EngineError::EmptyText)));
        assert!(matches!(
            results[2].outcome,
            Err(EngineError::InvalidOcrQuality { .. })
        ));
        assert!(results[3].outcome.is_ok());
    }

    #[tokio::test]
    async fn test_empty_menu() {
        let scanner = MenuScanner::new(engine());
        let results = scanner
            .scan_menu(Vec::new(), &UserAllergenProfile::new())
            .await;
        assert!(results.is_empty());
    }
}
