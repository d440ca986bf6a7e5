//! The photo gate: sharpness first, then the remote classifier.
//!
//! ```text
//! bytes ─► decode + Laplacian variance ─┬─ fail ─► RejectedBlurry   (no network call)
//!                                       └─ pass ─► classify ─┬─ no match ─► RejectedNotVehicle
//!                                                            ├─ match ────► Accepted
//!                                                            └─ error ────► Err(RemoteService | Timeout)
//! ```
//!
//! Each call is independent. The classifier is the only shared state and is
//! safe for concurrent use, so one `ImageGate` can serve many uploads at once.
//! Dropping the `validate` future cancels an in-flight classifier request.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::classifier::{classify, ClarifaiClassifier, ContentClassifier};
use crate::config::Config;
use crate::error::{ConfigError, GateError};
use crate::types::{SharpnessResult, ValidationOutcome};

use super::sharpness::SharpnessAnalyzer;

/// Two-stage pass/fail gate for uploaded car photos.
#[derive(Clone)]
pub struct ImageGate {
    analyzer: SharpnessAnalyzer,
    classifier: Arc<dyn ContentClassifier>,
    confidence_threshold: f32,
    decode_timeout_ms: u64,
}

impl ImageGate {
    /// Create a gate around an existing classifier.
    pub fn new(config: &Config, classifier: Arc<dyn ContentClassifier>) -> Self {
        Self {
            analyzer: SharpnessAnalyzer::new(config.sharpness.clone()),
            classifier,
            confidence_threshold: config.classifier.confidence_threshold,
            decode_timeout_ms: config.limits.decode_timeout_ms,
        }
    }

    /// Create a gate backed by the configured Clarifai model.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let classifier = ClarifaiClassifier::from_config(&config.classifier)?;
        Ok(Self::new(config, Arc::new(classifier)))
    }

    pub fn analyzer(&self) -> &SharpnessAnalyzer {
        &self.analyzer
    }

    /// Run only the local sharpness stage, off the async runtime, under the decode timeout.
    pub async fn check_sharpness(
        &self,
        name: &str,
        bytes: &[u8],
    ) -> Result<SharpnessResult, GateError> {
        let analyzer = self.analyzer.clone();
        let owned = bytes.to_vec();
        let name_owned = name.to_string();
        let limit = Duration::from_millis(self.decode_timeout_ms);

        let joined = tokio::time::timeout(
            limit,
            tokio::task::spawn_blocking(move || analyzer.analyze(&owned, &name_owned)),
        )
        .await;

        match joined {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(join_failure("decode", e)),
            Err(_) => Err(GateError::Timeout {
                stage: "decode".to_string(),
                timeout_ms: self.decode_timeout_ms,
            }),
        }
    }

    /// Validate one upload.
    ///
    /// Rejections are `Ok` outcomes; `Err` means the image could not be
    /// decoded or the classifier could not give an answer.
    pub async fn validate(&self, name: &str, bytes: &[u8]) -> Result<ValidationOutcome, GateError> {
        let start = Instant::now();
        tracing::debug!("Validating {} ({} bytes)", name, bytes.len());

        let sharpness = self.check_sharpness(name, bytes).await?;
        tracing::trace!("  Sharpness: {:?}", start.elapsed());

        if !sharpness.passed {
            tracing::debug!(
                "Rejected {} as blurry or low resolution ({}x{}, variance {:.1})",
                name,
                sharpness.width,
                sharpness.height,
                sharpness.variance
            );
            return Ok(ValidationOutcome::blurry(sharpness));
        }

        let classify_start = Instant::now();
        let classification =
            classify(self.classifier.as_ref(), bytes, self.confidence_threshold).await?;
        tracing::trace!("  Classify: {:?}", classify_start.elapsed());

        let outcome = ValidationOutcome::classified(sharpness, classification);
        tracing::debug!(
            "Validated {} in {:?}: {:?}",
            name,
            start.elapsed(),
            outcome.verdict
        );
        Ok(outcome)
    }
}

/// A blocking stage that panicked or was cancelled is our fault, not the uploader's.
fn join_failure(stage: &str, e: tokio::task::JoinError) -> GateError {
    tracing::error!("{} task failed: {}", stage, e);
    GateError::Internal {
        stage: stage.to_string(),
        message: format!("Task join error: {}", e),
    }
}
