//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.sharpness.min_width == 0 {
            return Err(ConfigError::ValidationError(
                "sharpness.min_width must be > 0".into(),
            ));
        }
        if self.sharpness.min_height == 0 {
            return Err(ConfigError::ValidationError(
                "sharpness.min_height must be > 0".into(),
            ));
        }
        if !self.sharpness.variance_threshold.is_finite() || self.sharpness.variance_threshold < 0.0
        {
            return Err(ConfigError::ValidationError(
                "sharpness.variance_threshold must be a non-negative number".into(),
            ));
        }
        if self.sharpness.max_analysis_dimension < 3 {
            return Err(ConfigError::ValidationError(
                "sharpness.max_analysis_dimension must be >= 3".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.classifier.confidence_threshold) {
            return Err(ConfigError::ValidationError(
                "classifier.confidence_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if self.classifier.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "classifier.timeout_ms must be > 0".into(),
            ));
        }
        if self.classifier.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "classifier.endpoint must not be empty".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.intake.allowed_extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "intake.allowed_extensions must not be empty".into(),
            ));
        }
        Ok(())
    }
}
