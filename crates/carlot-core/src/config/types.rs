//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sharpness gate thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SharpnessConfig {
    /// Minimum decoded width in pixels
    pub min_width: u32,

    /// Minimum decoded height in pixels
    pub min_height: u32,

    /// Minimum Laplacian variance for an image to count as in focus
    pub variance_threshold: f64,

    /// Longest edge analyzed; larger images are downsampled to this first.
    pub max_analysis_dimension: u32,
}

impl Default for SharpnessConfig {
    fn default() -> Self {
        Self {
            min_width: 300,
            min_height: 300,
            variance_threshold: 120.0,
            max_analysis_dimension: 800,
        }
    }
}

/// Remote classifier (Clarifai-style) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// API base URL
    pub endpoint: String,

    /// Account that owns the app
    pub user_id: String,

    /// Application ID
    pub app_id: String,

    /// Model ID used for prediction
    pub model_id: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Minimum confidence for a vehicle label to count
    pub confidence_threshold: f32,

    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.clarifai.com".to_string(),
            user_id: "clarifai".to_string(),
            app_id: "main".to_string(),
            model_id: "general-image-recognition".to_string(),
            api_key: "${CLARIFAI_API_KEY}".to_string(),
            confidence_threshold: 0.90,
            timeout_ms: 30_000,
        }
    }
}

/// Resource limits to protect against problematic uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upload size in megabytes
    pub max_file_size_mb: u64,

    /// Decode + analysis timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            decode_timeout_ms: 5000,
        }
    }
}

/// Upload intake and storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Accepted file extensions, lower case, without the dot
    pub allowed_extensions: Vec<String>,

    /// Directory accepted images are written to
    pub image_dir: PathBuf,

    /// Prefix for the public image URL
    pub url_prefix: String,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "apng".to_string(),
            ],
            image_dir: PathBuf::from("~/.carlot/images"),
            url_prefix: "/images/".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
