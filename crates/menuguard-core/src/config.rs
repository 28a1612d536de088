//! Configuration management for MenuGuard.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration.
///
/// This is loaded from `~/.config/menuguard/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Reference data location
    pub lexicon: LexiconConfig,
    /// Scan pipeline settings
    pub scanning: ScanningConfig,
    /// Substitution recommendation settings
    pub recommendations: RecommendationConfig,
    /// Log output settings
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML or fail validation
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path.
    ///
    /// Unlike [`AppConfig::load`], a missing file is an error here.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `MENUGUARD_LEXICON_DIR`: Override the lexicon directory
    /// - `MENUGUARD_MAX_CONCURRENT_SCANS`: Override batch scan parallelism
    /// - `MENUGUARD_LOG_FILTER`: Override the tracing filter directive
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `MENUGUARD_*` environment overrides in place.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MENUGUARD_LEXICON_DIR") {
            if !val.trim().is_empty() {
                tracing::debug!("Override lexicon.dir from env: {}", val);
                self.lexicon.dir = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("MENUGUARD_MAX_CONCURRENT_SCANS") {
            if let Ok(max) = val.parse() {
                self.scanning.max_concurrent_scans = max;
                tracing::debug!("Override scanning.max_concurrent_scans from env: {}", max);
            }
        }

        if let Ok(val) = std::env::var("MENUGUARD_LOG_FILTER") {
            if !val.trim().is_empty() {
                tracing::debug!("Override logging.filter from env: {}", val);
                self.logging.filter = val;
            }
        }
    }

    /// Check that every value is within its allowed range.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.scanning.max_concurrent_scans == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scanning.max_concurrent_scans".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let threshold = self.scanning.low_quality_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidValue {
                field: "scanning.low_quality_threshold".to_string(),
                reason: format!("must be within 0.0-1.0, got {threshold}"),
            });
        }

        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "logging.filter".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/menuguard/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "menuguard", "menuguard").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/menuguard`. A lexicon
    /// installed there is picked up when no directory is configured.
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "menuguard", "menuguard").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

/// Reference data location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    /// Directory holding `allergens/` and `substitutions.toml`.
    /// When unset the `lexicon/` directory at the workspace root is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Scan pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Number of menu items scanned in parallel by the batch scanner
    pub max_concurrent_scans: usize,
    /// OCR quality below which a scan is logged as low confidence
    pub low_quality_threshold: f32,
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            max_concurrent_scans: 4,
            low_quality_threshold: 0.5,
        }
    }
}

/// Substitution recommendation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Maximum candidates returned per item (0 = unlimited)
    pub max_candidates: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self { max_candidates: 5 }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,menuguard=debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.lexicon.dir.is_none());
        assert_eq!(config.scanning.max_concurrent_scans, 4);
        assert!((config.scanning.low_quality_threshold - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.recommendations.max_candidates, 5);
        assert_eq!(config.logging.filter, "info,menuguard=debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[scanning]"));
        assert!(toml_str.contains("[recommendations]"));
        assert!(toml_str.contains("[logging]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(
            parsed.scanning.max_concurrent_scans,
            config.scanning.max_concurrent_scans
        );
    }

    #[test]
    fn test_config_load_from_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let mut config = AppConfig::default();
        config.lexicon.dir = Some(PathBuf::from("/srv/menuguard/lexicon"));
        config.recommendations.max_candidates = 3;

        let contents = toml::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, contents).expect("write config file");

        let loaded = AppConfig::load_from(&config_path).expect("load config");
        assert_eq!(
            loaded.lexicon.dir,
            Some(PathBuf::from("/srv/menuguard/lexicon"))
        );
        assert_eq!(loaded.recommendations.max_candidates, 3);
    }

    #[test]
    fn test_load_from_missing_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let result = AppConfig::load_from(&tmp.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");
        fs::write(&config_path, "[scanning]\nmax_concurrent_scans = 0\n")
            .expect("write config file");

        let result = AppConfig::load_from(&config_path);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_validate_quality_threshold_range() {
        let mut config = AppConfig::default();
        config.scanning.low_quality_threshold = 1.5;
        assert!(config.validate().is_err());

        config.scanning.low_quality_threshold = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("MENUGUARD_LEXICON_DIR", "/tmp/lexicon");
        std::env::set_var("MENUGUARD_MAX_CONCURRENT_SCANS", "8");
        std::env::set_var("MENUGUARD_LOG_FILTER", "warn");

        let mut config = AppConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.lexicon.dir, Some(PathBuf::from("/tmp/lexicon")));
        assert_eq!(config.scanning.max_concurrent_scans, 8);
        assert_eq!(config.logging.filter, "warn");

        std::env::remove_var("MENUGUARD_LEXICON_DIR");
        std::env::remove_var("MENUGUARD_MAX_CONCURRENT_SCANS");
        std::env::remove_var("MENUGUARD_LOG_FILTER");
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[scanning]
max_concurrent_scans = 2
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.scanning.max_concurrent_scans, 2);
        // These should be defaults
        assert!((config.scanning.low_quality_threshold - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.recommendations.max_candidates, 5);
    }
}
