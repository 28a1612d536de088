//! Integration tests for the bundled lexicon
//!
//! Loads the reference data shipped under `lexicon/` at the workspace root
//! and checks it builds and answers the queries the engine relies on.

use menuguard_core::{AllergenId, SensitivityLevel};
use menuguard_lexicon::{normalize, AllergenLexicon, LexiconLoader, TermKind};
use std::path::PathBuf;

fn bundled_loader() -> LexiconLoader {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../lexicon");
    LexiconLoader::new(dir).expect("bundled lexicon directory exists")
}

fn id(value: &str) -> AllergenId {
    AllergenId::new(value).expect("valid allergen ID")
}

#[test]
fn test_bundled_lexicon_loads() {
    let lexicon = AllergenLexicon::load_from(&bundled_loader()).expect("load bundled lexicon");

    for expected in [
        "eggs",
        "fish",
        "milk",
        "peanuts",
        "sesame",
        "shellfish",
        "soy",
        "tree_nuts",
        "wheat",
    ] {
        assert!(lexicon.contains(&id(expected)), "missing {expected}");
    }
    assert_eq!(lexicon.len(), 9);
}

#[test]
fn test_bundled_default_severities() {
    let lexicon = AllergenLexicon::load_from(&bundled_loader()).expect("load bundled lexicon");

    let peanuts = lexicon.get(&id("peanuts")).expect("peanuts present");
    assert_eq!(peanuts.default_severity, SensitivityLevel::Severe);

    let soy = lexicon.get(&id("soy")).expect("soy present");
    assert_eq!(soy.default_severity, SensitivityLevel::Mild);
}

#[test]
fn test_coconut_is_a_tree_nut_hidden_form() {
    let lexicon = AllergenLexicon::load_from(&bundled_loader()).expect("load bundled lexicon");

    assert_eq!(
        lexicon.allergens_with_term("coconut"),
        vec![id("tree_nuts")]
    );

    let pattern = lexicon
        .patterns()
        .iter()
        .find(|p| p.normalized() == "coconut")
        .expect("coconut pattern");
    assert_eq!(pattern.kind(), TermKind::HiddenForm);
}

#[test]
fn test_bundled_patterns_match_normalized_text() {
    let lexicon = AllergenLexicon::load_from(&bundled_loader()).expect("load bundled lexicon");
    let text = normalize("Satay with PEA-\nNUT sauce, served with Trout Almondine");

    let hits: Vec<&str> = lexicon
        .patterns()
        .iter()
        .filter(|p| p.find_in(text.as_str()).next().is_some())
        .map(|p| p.allergen_id().as_str())
        .collect();

    assert!(hits.contains(&"peanuts"));
    assert!(hits.contains(&"fish"));
    assert!(!hits.contains(&"tree_nuts"), "almondine is not almond");
}

#[test]
fn test_bundled_substitutions_load() {
    let map = bundled_loader()
        .load_substitutions()
        .expect("load bundled substitutions");

    let replacements = map
        .replacements_for("Almond Milk")
        .expect("almond milk rule");
    let names: Vec<&str> = replacements.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["oat milk", "coconut milk"]);
}
