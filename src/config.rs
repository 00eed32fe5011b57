//! Configuration management for bfg-feedback
//!
//! Config file location:
//! - Linux: ~/.config/bfg-feedback/config.toml
//! - macOS: ~/Library/Application Support/com.bfg.bfg-feedback/config.toml
//! - Windows: %APPDATA%/bfg/bfg-feedback/config/config.toml
//!
//! You can override the config location by setting `BFG_FEEDBACK_CONFIG_PATH`.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::i18n::Language;

pub const DEFAULT_API_URL: &str = "https://bfg-feetback-serveur.onrender.com";
pub const DEFAULT_ANALYSIS_URL: &str =
    "https://bfg-api-analyse-sentiment.onrender.com/predict_feedback";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote service endpoints
    #[serde(default)]
    pub api: ApiConfig,

    /// Form defaults
    #[serde(default)]
    pub ui: UiConfig,

    /// Online/offline probing
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
}

impl Config {
    /// Load configuration from file or fall back to defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    fn load_from(config_path: &std::path::Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

            let config: Config = toml::from_str(&content).with_context(|| {
                format!("Failed to parse config from {}", config_path.display())
            })?;

            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    fn save_to(&self, config_path: &std::path::Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(config_path, toml)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("BFG_FEEDBACK_CONFIG_PATH") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Create default config file if it doesn't exist
    pub fn init() -> Result<Self> {
        let config = Self::load()?;

        let config_path = Self::config_path()?;
        if !config_path.exists() {
            config.save()?;
        }

        Ok(config)
    }
}

pub(crate) fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "bfg", "bfg-feedback")
        .context("Could not determine project directories")
}

/// Directory for log files written while the terminal UI owns the screen.
pub(crate) fn log_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join("logs"))
}

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Root of the validation and persistence API
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// Full URL of the sentiment-analysis endpoint
    #[serde(default = "default_analysis_url")]
    pub analysis_url: String,

    /// API timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Whether to verify SSL certificates
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            analysis_url: default_analysis_url(),
            timeout_seconds: default_timeout(),
            verify_ssl: default_true(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_analysis_url() -> String {
    DEFAULT_ANALYSIS_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

/// Form defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// Language selected when the form opens
    #[serde(default)]
    pub language: Language,

    /// Language used when a string is missing
    #[serde(default)]
    pub fallback_language: Language,

    /// Start in dark mode
    #[serde(default)]
    pub dark_mode: bool,
}

/// Connectivity check configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    /// Check the API root to drive the offline notice
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,

    #[serde(default = "default_check_timeout")]
    pub check_timeout_seconds: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_seconds: default_check_interval(),
            check_timeout_seconds: default_check_timeout(),
        }
    }
}

fn default_check_interval() -> u64 {
    15
}

fn default_check_timeout() -> u64 {
    5
}

/// Get configuration file path for display purposes
pub fn get_config_path() -> Result<String> {
    let path = Config::config_path()?;
    Ok(path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.api.analysis_url, DEFAULT_ANALYSIS_URL);
        assert_eq!(config.api.timeout_seconds, 30);
        assert!(config.api.verify_ssl);
        assert_eq!(config.ui.language, Language::Fr);
        assert_eq!(config.ui.fallback_language, Language::Fr);
        assert!(!config.ui.dark_mode);
        assert!(config.connectivity.enabled);
        assert_eq!(config.connectivity.check_interval_seconds, 15);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();

        assert!(toml.contains("base_url"));
        assert!(toml.contains("analysis_url"));
        assert!(toml.contains("[ui]"));
        assert!(toml.contains("language = \"fr\""));
        assert!(toml.contains("check_interval_seconds"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[ui]\nlanguage = \"ew\"\ndark_mode = true\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.ui.language, Language::Ew);
        assert!(config.ui.dark_mode);
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_save_round_trip_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.ui.language = Language::En;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.ui.language, Language::En);
    }

    #[test]
    fn test_unknown_language_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[ui]\nlanguage = \"de\"\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
