//! Subcommand implementations.
//!
//! Results go to stdout as pretty JSON; logs go to stderr.

use crate::cli::ProfileArgs;
use anyhow::{Context, Result};
use menuguard_core::{AllergenId, AppConfig, SensitivityLevel};
use menuguard_engine::{MenuScanner, SafetyEngine, ScanOutcome, ScanRequest, UserAllergenProfile};
use menuguard_lexicon::{AllergenLexicon, LexiconLoader};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Load configuration, then apply env and command-line overrides.
pub fn load_config(config_path: Option<&Path>, lexicon_dir: Option<&Path>) -> Result<AppConfig> {
    let mut config = match config_path {
        Some(path) => {
            let mut config = AppConfig::load_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            config.apply_env_overrides();
            config
        }
        None => AppConfig::load_with_env()?,
    };

    if let Some(dir) = lexicon_dir {
        config.lexicon.dir = Some(dir.to_path_buf());
    }
    config.validate()?;

    Ok(config)
}

fn load_engine(config: &AppConfig) -> Result<SafetyEngine> {
    let loader = LexiconLoader::from_config(&config.lexicon)?;
    let lexicon = AllergenLexicon::load_from(&loader)
        .with_context(|| format!("invalid lexicon in {}", loader.dir().display()))?;
    let substitutions = loader.load_substitutions()?;

    Ok(SafetyEngine::from_config(lexicon, substitutions, config))
}

/// Build the profile from a TOML file and/or `--allergen` flags.
///
/// A flag never lowers a level already set by the file.
pub fn build_profile(args: &ProfileArgs, lexicon: &AllergenLexicon) -> Result<UserAllergenProfile> {
    let mut profile = match &args.profile {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read profile {}", path.display()))?;
            UserAllergenProfile::from_toml_str(&contents)
                .with_context(|| format!("invalid profile {}", path.display()))?
        }
        None => UserAllergenProfile::new(),
    };

    for raw in &args.allergens {
        let allergen = lexicon
            .lookup(raw)
            .with_context(|| format!("unknown --allergen {raw:?}"))?;
        if profile.sensitivity_for(allergen.id()) < allergen.default_severity {
            profile.set(allergen.id().clone(), allergen.default_severity);
        }
    }

    if profile.is_empty() {
        warn!("profile lists no allergens, every item will be Safe");
    }

    Ok(profile)
}

/// `menuguard scan`
pub fn scan(
    config: &AppConfig,
    profile_args: &ProfileArgs,
    text: Option<String>,
    file: Option<PathBuf>,
    quality: f32,
    label: Option<String>,
) -> Result<()> {
    let engine = load_engine(config)?;
    let profile = build_profile(profile_args, engine.lexicon())?;

    let text = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => anyhow::bail!("either --text or --file is required"),
    };

    let mut request = ScanRequest::new(text, quality);
    if let Some(label) = label {
        request = request.with_label(label);
    }

    let outcome = engine.scan(&request, &profile)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(())
}

#[derive(Serialize)]
struct MenuItemReport<'a> {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<&'a ScanOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Turn menu file contents into one request per non-blank line.
pub fn menu_requests(contents: &str, quality: f32) -> Vec<ScanRequest> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            ScanRequest::new(line.trim(), quality).with_label(format!("line {}", n + 1))
        })
        .collect()
}

/// `menuguard menu`
pub async fn menu(
    config: &AppConfig,
    profile_args: &ProfileArgs,
    file: &Path,
    quality: f32,
) -> Result<()> {
    let engine = load_engine(config)?;
    let profile = build_profile(profile_args, engine.lexicon())?;

    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let requests = menu_requests(&contents, quality);

    let scanner = MenuScanner::new(Arc::new(engine))
        .with_max_concurrent_scans(config.scanning.max_concurrent_scans);
    let results = scanner.scan_menu(requests, &profile).await;

    let reports: Vec<MenuItemReport<'_>> = results
        .iter()
        .map(|r| MenuItemReport {
            index: r.index,
            label: r.label.as_deref(),
            outcome: r.outcome.as_ref().ok(),
            error: r.outcome.as_ref().err().map(ToString::to_string),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&reports)?);

    let flagged = results
        .iter()
        .filter_map(|r| r.outcome.as_ref().ok())
        .filter(|o| o.tier().is_flagged())
        .count();
    info!(items = results.len(), flagged, "menu scanned");

    Ok(())
}

#[derive(Serialize)]
struct LexiconSummary {
    dir: PathBuf,
    allergens: Vec<AllergenSummary>,
    terms: usize,
    substitution_rules: usize,
}

#[derive(Serialize)]
struct AllergenSummary {
    id: AllergenId,
    display_name: String,
    default_severity: SensitivityLevel,
    terms: usize,
}

/// `menuguard lexicon`
pub fn lexicon(config: &AppConfig) -> Result<()> {
    let loader = LexiconLoader::from_config(&config.lexicon)?;
    let lexicon = AllergenLexicon::load_from(&loader)
        .with_context(|| format!("invalid lexicon in {}", loader.dir().display()))?;
    let substitutions = loader.load_substitutions()?;

    let summary = LexiconSummary {
        dir: loader.dir().to_path_buf(),
        allergens: lexicon
            .iter()
            .map(|a| AllergenSummary {
                id: a.id().clone(),
                display_name: a.display_name.clone(),
                default_severity: a.default_severity,
                terms: a.term_count(),
            })
            .collect(),
        terms: lexicon.term_count(),
        substitution_rules: substitutions.len(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

/// `menuguard config`
pub fn config(config: &AppConfig, save: bool) -> Result<()> {
    print!("{}", toml::to_string_pretty(config)?);

    if save {
        config.save()?;
        info!(path = %AppConfig::config_path()?.display(), "configuration saved");
    }

    Ok(())
}
