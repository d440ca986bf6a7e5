//! Carlot Core - Photo gate for used-car listings.
//!
//! Every uploaded listing photo has to be sharp enough to show the car and
//! has to actually show a car. Carlot checks both before an image is stored:
//!
//! ```text
//! Upload → Checks (size, type) → Sharpness (Laplacian variance) → Classifier (Clarifai) → Store
//! ```
//!
//! The sharpness stage is local and cheap; images that fail it never reach
//! the paid classification service.
//!
//! # Usage
//!
//! ```rust,ignore
//! use carlot_core::{Carlot, Config, UploadedImage};
//!
//! #[tokio::main]
//! async fn main() -> carlot_core::Result<()> {
//!     let carlot = Carlot::new(Config::load()?)?;
//!
//!     let bytes = std::fs::read("front.jpg")?;
//!     let outcome = carlot.validate("front.jpg", &bytes).await?;
//!     println!("Verdict: {:?}", outcome.verdict);
//!
//!     let refs = carlot.accept(&[UploadedImage::new("front.jpg", bytes)]).await?;
//!     println!("Stored at {}", refs[0].url);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod classifier;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod testing;
pub mod types;

use std::sync::Arc;

// Re-exports for convenient access
pub use classifier::{ClarifaiClassifier, ContentClassifier};
pub use config::Config;
pub use error::{CarlotError, ConfigError, GateError, GateResult, Result};
pub use output::{CheckReport, OutputFormat, OutputWriter, ReportStatus};
pub use pipeline::{ImageGate, ImageIntake, ImageStore, SharpnessAnalyzer, UploadedImage};
pub use types::{
    ClassificationResult, Concept, ImageRef, Rejection, SharpnessResult, ValidationOutcome,
    Verdict,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Carlot - the main entry point for gating listing photos.
pub struct Carlot {
    config: Config,
    gate: ImageGate,
    intake: ImageIntake,
}

impl Carlot {
    /// Create a Carlot instance backed by the configured Clarifai model.
    pub fn new(config: Config) -> Result<Self> {
        let classifier = ClarifaiClassifier::from_config(&config.classifier)?;
        Ok(Self::with_classifier(config, Arc::new(classifier)))
    }

    /// Create a Carlot instance around any classifier.
    pub fn with_classifier(config: Config, classifier: Arc<dyn ContentClassifier>) -> Self {
        tracing::debug!("Initializing Carlot v{}", VERSION);
        let gate = ImageGate::new(&config, classifier);
        let intake = ImageIntake::new(&config, gate.clone(), ImageStore::from_config(&config));
        Self {
            config,
            gate,
            intake,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run both gates on one image.
    pub async fn validate(&self, name: &str, bytes: &[u8]) -> GateResult<ValidationOutcome> {
        self.gate.validate(name, bytes).await
    }

    /// Run only the local sharpness check.
    pub async fn check_sharpness(&self, name: &str, bytes: &[u8]) -> GateResult<SharpnessResult> {
        self.gate.check_sharpness(name, bytes).await
    }

    /// Validate and store a batch of listing photos.
    pub async fn accept(&self, uploads: &[UploadedImage]) -> GateResult<Vec<ImageRef>> {
        self.intake.accept(uploads).await
    }

    /// Best-effort removal of a stored image by URL or file name.
    pub async fn remove(&self, reference: &str) -> bool {
        self.intake.store().remove(reference).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ImageInput;
    use async_trait::async_trait;
    use std::time::Duration;

    struct AlwaysCar;

    #[async_trait]
    impl ContentClassifier for AlwaysCar {
        fn name(&self) -> &str {
            "always-car"
        }

        async fn concepts(&self, _image: &ImageInput) -> GateResult<Vec<Concept>> {
            Ok(vec![Concept::new("car", 0.99)])
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }
    }

    fn carlot_in(dir: &std::path::Path) -> Carlot {
        let mut config = Config::default();
        config.intake.image_dir = dir.to_path_buf();
        Carlot::with_classifier(config, Arc::new(AlwaysCar))
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_new_without_api_key_is_config_error() {
        let mut config = Config::default();
        config.classifier.api_key = "${CARLOT_TEST_UNSET_KEY}".to_string();
        assert!(matches!(Carlot::new(config), Err(CarlotError::Config(_))));
    }

    #[tokio::test]
    async fn test_accept_then_remove() {
        let dir = tempfile::tempdir().unwrap();
        let carlot = carlot_in(dir.path());
        let bytes = testing::checkerboard_png(600, 400, 15).unwrap();

        let refs = carlot
            .accept(&[UploadedImage::new("front.png", bytes)])
            .await
            .unwrap();
        assert_eq!(refs.len(), 1);
        assert!(dir.path().join(&refs[0].file_name).exists());

        assert!(carlot.remove(&refs[0].url).await);
        assert!(!dir.path().join(&refs[0].file_name).exists());
    }

    #[tokio::test]
    async fn test_validate_and_sharpness_only() {
        let dir = tempfile::tempdir().unwrap();
        let carlot = carlot_in(dir.path());
        let blurry = testing::flat_png(600, 400, 40).unwrap();

        let outcome = carlot.validate("a.png", &blurry).await.unwrap();
        assert_eq!(outcome.verdict, Verdict::RejectedBlurry);

        let sharpness = carlot.check_sharpness("a.png", &blurry).await.unwrap();
        assert!(!sharpness.passed);
        assert_eq!(carlot.config().sharpness.variance_threshold, 120.0);
    }
}
