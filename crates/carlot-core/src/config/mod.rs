//! Configuration management for carlot.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. All config structs implement `Default`.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for carlot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sharpness gate thresholds
    pub sharpness: SharpnessConfig,

    /// Remote classifier settings
    pub classifier: ClassifierConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Upload intake and storage
    pub intake: IntakeConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.carlot.carlot/config.toml
    /// - Linux: ~/.config/carlot/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\carlot\config\config.toml
    ///
    /// Falls back to ~/.carlot/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "carlot", "carlot")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".carlot").join("config.toml")
            })
    }

    /// Get the resolved image directory (with ~ expansion).
    pub fn image_dir(&self) -> PathBuf {
        let path_str = self.intake.image_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sharpness.min_width, 300);
        assert_eq!(config.sharpness.min_height, 300);
        assert_eq!(config.sharpness.variance_threshold, 120.0);
        assert_eq!(config.sharpness.max_analysis_dimension, 800);
        assert!((config.classifier.confidence_threshold - 0.90).abs() < f32::EPSILON);
    }

    #[test]
    fn test_default_allowed_extensions() {
        let config = Config::default();
        assert_eq!(
            config.intake.allowed_extensions,
            vec!["jpg", "jpeg", "png", "apng"]
        );
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[sharpness]"));
        assert!(toml.contains("[classifier]"));
        assert!(toml.contains("[intake]"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [sharpness]
            variance_threshold = 80.0

            [classifier]
            user_id = "dealer"
            "#,
        )
        .unwrap();
        assert_eq!(config.sharpness.variance_threshold, 80.0);
        assert_eq!(config.sharpness.min_width, 300);
        assert_eq!(config.classifier.user_id, "dealer");
        assert_eq!(config.classifier.app_id, "main");
    }

    #[test]
    fn test_from_toml_runs_validation() {
        let err = Config::from_toml("[sharpness]\nmin_width = 0\n").unwrap_err();
        assert!(err.to_string().contains("min_width"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[limits]\nmax_file_size_mb = 5\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.limits.max_file_size_mb, 5);
    }

    #[test]
    fn test_image_dir_expands_tilde() {
        let mut config = Config::default();
        config.intake.image_dir = PathBuf::from("/srv/carlot/images");
        assert_eq!(config.image_dir(), PathBuf::from("/srv/carlot/images"));

        config.intake.image_dir = PathBuf::from("~/images");
        assert!(!config.image_dir().to_string_lossy().starts_with('~'));
    }
}
