//! User allergen profiles.
//!
//! A profile is owned by the caller and passed into every scan. Profiles
//! can be written as TOML:
//!
//! ```toml
//! [sensitivities]
//! peanuts = "severe"
//! milk = "mild"
//! ```

use crate::error::Result;
use menuguard_core::{AllergenId, SensitivityLevel};
use menuguard_lexicon::AllergenLexicon;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-allergen sensitivity levels for one user.
///
/// Lookup is total: allergens not listed have [`SensitivityLevel::None`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAllergenProfile {
    #[serde(default)]
    sensitivities: BTreeMap<AllergenId, SensitivityLevel>,
}

impl UserAllergenProfile {
    /// Empty profile (not sensitive to anything).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, allergen_id: AllergenId, level: SensitivityLevel) -> Self {
        self.set(allergen_id, level);
        self
    }

    /// Set the sensitivity for an allergen. Setting `None` removes it.
    pub fn set(&mut self, allergen_id: AllergenId, level: SensitivityLevel) {
        if level.is_sensitive() {
            self.sensitivities.insert(allergen_id, level);
        } else {
            self.sensitivities.remove(&allergen_id);
        }
    }

    /// Sensitivity for an allergen, `None` when unlisted.
    #[must_use]
    pub fn sensitivity_for(&self, allergen_id: &AllergenId) -> SensitivityLevel {
        self.sensitivities
            .get(allergen_id)
            .copied()
            .unwrap_or_default()
    }

    /// Allergens the user reacts to, in ID order.
    pub fn sensitive_allergens(&self) -> impl Iterator<Item = (&AllergenId, SensitivityLevel)> {
        self.sensitivities
            .iter()
            .filter(|(_, level)| level.is_sensitive())
            .map(|(id, level)| (id, *level))
    }

    /// Whether the profile lists no sensitivities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sensitive_allergens().next().is_none()
    }

    /// Parse a profile from TOML.
    ///
    /// # Errors
    /// Returns error if the TOML is malformed or holds an invalid ID or level.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let mut profile: Self = toml::from_str(contents)?;
        profile.sensitivities.retain(|_, level| level.is_sensitive());
        Ok(profile)
    }

    /// Profile declaring each allergen at the lexicon's default severity.
    ///
    /// # Errors
    /// Returns error if an ID is not in the lexicon.
    pub fn with_default_severities<'a>(
        lexicon: &AllergenLexicon,
        allergen_ids: impl IntoIterator<Item = &'a AllergenId>,
    ) -> Result<Self> {
        let mut profile = Self::new();
        for allergen_id in allergen_ids {
            let allergen = lexicon.get(allergen_id)?;
            profile.set(allergen_id.clone(), allergen.default_severity);
        }
        Ok(profile)
    }

    /// Listed allergens the lexicon doesn't know about.
    ///
    /// These can never match, so a scan would silently report them as absent.
    #[must_use]
    pub fn unknown_allergens(&self, lexicon: &AllergenLexicon) -> Vec<&AllergenId> {
        self.sensitivities
            .keys()
            .filter(|id| !lexicon.contains(id))
            .collect()
    }
}
