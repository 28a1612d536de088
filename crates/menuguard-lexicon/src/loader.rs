//! Lexicon loading from TOML files.
//!
//! A lexicon directory looks like:
//!
//! ```text
//! lexicon/
//! ├── allergens/
//! │   ├── milk.toml
//! │   └── nuts/
//! │       ├── peanuts.toml
//! │       └── tree_nuts.toml
//! └── substitutions.toml
//! ```

use crate::{
    definition::{Allergen, AllergenDefinition},
    error::{LexiconError, Result},
    substitution::SubstitutionMap,
};
use menuguard_core::{AllergenId, AppConfig, LexiconConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const ALLERGENS_DIR: &str = "allergens";
const SUBSTITUTIONS_FILE: &str = "substitutions.toml";

/// Loader for allergen definitions and the substitution map.
#[derive(Debug, Clone)]
pub struct LexiconLoader {
    /// Base directory containing `allergens/` and `substitutions.toml`
    lexicon_dir: PathBuf,
}

impl LexiconLoader {
    /// Create a new loader with the given lexicon directory.
    ///
    /// # Errors
    /// Returns error if the directory doesn't exist.
    pub fn new(lexicon_dir: impl Into<PathBuf>) -> Result<Self> {
        let lexicon_dir = lexicon_dir.into();

        if !lexicon_dir.is_dir() {
            return Err(LexiconError::DirectoryNotFound {
                path: lexicon_dir.display().to_string(),
            });
        }

        Ok(Self { lexicon_dir })
    }

    /// Create a loader from configuration, falling back to the default
    /// directory when none is configured.
    ///
    /// # Errors
    /// Returns error if the resolved directory doesn't exist.
    pub fn from_config(config: &LexiconConfig) -> Result<Self> {
        match &config.dir {
            Some(dir) => Self::new(dir),
            None => Self::with_default_dir(),
        }
    }

    /// Create a loader using the default lexicon directory.
    ///
    /// Looks for `lexicon/` relative to the workspace root, then in the
    /// user data directory, then relative to the current directory.
    ///
    /// # Errors
    /// Returns error if no candidate directory exists.
    pub fn with_default_dir() -> Result<Self> {
        // Find workspace root by looking for Cargo.toml with [workspace]
        let mut current_dir = std::env::current_dir()?;

        loop {
            let cargo_toml = current_dir.join("Cargo.toml");
            if cargo_toml.exists() {
                if let Ok(contents) = std::fs::read_to_string(&cargo_toml) {
                    if contents.contains("[workspace]") {
                        let lexicon_dir = current_dir.join("lexicon");
                        if lexicon_dir.is_dir() {
                            return Self::new(lexicon_dir);
                        }
                    }
                }
            }

            if let Some(parent) = current_dir.parent() {
                current_dir = parent.to_path_buf();
            } else {
                break;
            }
        }

        if let Ok(data_dir) = AppConfig::data_dir() {
            let lexicon_dir = data_dir.join("lexicon");
            if lexicon_dir.is_dir() {
                return Self::new(lexicon_dir);
            }
        }

        Self::new(PathBuf::from("lexicon"))
    }

    /// Directory this loader reads from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.lexicon_dir
    }

    /// Load a single allergen definition by ID.
    ///
    /// # Errors
    /// Returns error if the definition file doesn't exist, can't be read, or is invalid.
    pub fn load_allergen(&self, allergen_id: &AllergenId) -> Result<Allergen> {
        let filename = format!("{}.toml", allergen_id.as_str());

        let Some(path) = Self::find_file(&self.allergens_dir(), &filename)? else {
            return Err(LexiconError::NotFound {
                allergen_id: allergen_id.to_string(),
            });
        };

        let allergen = Self::load_from_path(&path)?;
        allergen.validate()?;

        debug!(
            allergen_id = %allergen_id,
            terms = allergen.term_count(),
            "loaded allergen definition"
        );

        Ok(allergen)
    }

    /// Load every allergen definition under `allergens/`.
    ///
    /// Any unreadable or invalid file aborts loading: skipping a definition
    /// would leave its allergen undetectable.
    ///
    /// # Errors
    /// Returns error if the directory is missing or any definition is invalid.
    pub fn load_allergens(&self) -> Result<Vec<Allergen>> {
        let allergens_dir = self.allergens_dir();
        if !allergens_dir.is_dir() {
            return Err(LexiconError::DirectoryNotFound {
                path: allergens_dir.display().to_string(),
            });
        }

        let mut paths = Vec::new();
        Self::collect_toml_files(&allergens_dir, &mut paths)?;
        paths.sort();

        let mut allergens = Vec::with_capacity(paths.len());
        for path in paths {
            let allergen = Self::load_from_path(&path)?;
            allergen.validate()?;
            allergens.push(allergen);
        }

        info!(
            count = allergens.len(),
            dir = %allergens_dir.display(),
            "loaded allergen definitions"
        );

        Ok(allergens)
    }

    /// Load the substitution map.
    ///
    /// A missing `substitutions.toml` yields an empty map.
    ///
    /// # Errors
    /// Returns error if the file exists but is unreadable or invalid.
    pub fn load_substitutions(&self) -> Result<SubstitutionMap> {
        let path = self.lexicon_dir.join(SUBSTITUTIONS_FILE);
        if !path.exists() {
            debug!(path = %path.display(), "no substitutions file, using empty map");
            return Ok(SubstitutionMap::empty());
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| LexiconError::LoadError {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;
        let map = SubstitutionMap::from_toml_str(&contents, &path.display().to_string())?;

        info!(rules = map.len(), "loaded substitution map");

        Ok(map)
    }

    fn allergens_dir(&self) -> PathBuf {
        self.lexicon_dir.join(ALLERGENS_DIR)
    }

    /// Recursively collect `.toml` files, skipping `README.toml`.
    fn collect_toml_files(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                Self::collect_toml_files(&path, paths)?;
            } else if path.extension().and_then(|s| s.to_str()) == Some("toml")
                && path.file_name().and_then(|s| s.to_str()) != Some("README.toml")
            {
                paths.push(path);
            }
        }

        Ok(())
    }

    /// Recursively search for a file by name.
    fn find_file(dir: &Path, filename: &str) -> Result<Option<PathBuf>> {
        if !dir.is_dir() {
            return Ok(None);
        }

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                if let Some(found) = Self::find_file(&path, filename)? {
                    return Ok(Some(found));
                }
            } else if path.file_name().and_then(|s| s.to_str()) == Some(filename) {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }

    /// Load an allergen definition from a specific file path.
    fn load_from_path(path: &Path) -> Result<Allergen> {
        let contents = std::fs::read_to_string(path).map_err(|e| LexiconError::LoadError {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        let definition: AllergenDefinition =
            toml::from_str(&contents).map_err(|e| LexiconError::ParseError {
                path: path.display().to_string(),
                source: e,
            })?;

        Ok(definition.allergen)
    }
}
