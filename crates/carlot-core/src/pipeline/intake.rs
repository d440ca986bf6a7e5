//! Listing-photo intake: check every upload, then store them all.
//!
//! A batch is all-or-nothing. Nothing is written until every upload has
//! passed the upload checks and the gate, so a rejected photo never leaves
//! the others behind as orphan files.

use crate::config::Config;
use crate::error::{ConfigError, GateError};
use crate::types::ImageRef;

use super::gate::ImageGate;
use super::store::ImageStore;
use super::validate::UploadValidator;

/// One uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Client-supplied file name; only its extension is trusted
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Validates and stores a batch of listing photos.
pub struct ImageIntake {
    validator: UploadValidator,
    gate: ImageGate,
    store: ImageStore,
}

impl ImageIntake {
    pub fn new(config: &Config, gate: ImageGate, store: ImageStore) -> Self {
        Self {
            validator: UploadValidator::new(config.limits.clone(), &config.intake),
            gate,
            store,
        }
    }

    /// Intake wired to the configured classifier and image directory.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let gate = ImageGate::from_config(config)?;
        Ok(Self::new(config, gate, ImageStore::from_config(config)))
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    /// Accept a batch, returning one reference per upload in input order.
    ///
    /// Uploads are checked one at a time and the first failure aborts the
    /// batch. A rejection surfaces as `GateError::ContentRejection`.
    pub async fn accept(&self, uploads: &[UploadedImage]) -> Result<Vec<ImageRef>, GateError> {
        if uploads.is_empty() {
            return Err(GateError::NoImages);
        }

        for upload in uploads {
            self.validator.check(&upload.name, &upload.bytes)?;
            let outcome = self.gate.validate(&upload.name, &upload.bytes).await?;
            outcome.ensure_accepted(&upload.name)?;
        }

        let mut stored = Vec::with_capacity(uploads.len());
        for upload in uploads {
            match self.store.store(&upload.name, &upload.bytes).await {
                Ok(image_ref) => stored.push(image_ref),
                Err(e) => {
                    // Only files written by this call; names are never shared
                    for image_ref in &stored {
                        self.store.remove(&image_ref.url).await;
                    }
                    return Err(e);
                }
            }
        }

        tracing::info!("Accepted {} image(s)", stored.len());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ContentClassifier, ImageInput};
    use crate::testing::{checkerboard, checkerboard_png, encode, flat_png};
    use crate::types::{Concept, Rejection};
    use async_trait::async_trait;
    use image::ImageFormat;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Answers "car" for the first `cars` calls and "tree" afterwards.
    struct CountingClassifier {
        cars: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl ContentClassifier for CountingClassifier {
        fn name(&self) -> &str {
            "counting"
        }

        async fn concepts(&self, _image: &ImageInput) -> Result<Vec<Concept>, GateError> {
            let idx = self.calls.fetch_add(1, Ordering::SeqCst);
            let label = if idx < self.cars { "car" } else { "tree" };
            Ok(vec![Concept::new(label, 0.99)])
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(5)
        }
    }

    fn intake(dir: &std::path::Path, cars: u32) -> ImageIntake {
        intake_with_store(ImageStore::new(dir, "/images/"), cars)
    }

    fn intake_with_store(store: ImageStore, cars: u32) -> ImageIntake {
        let config = Config::default();
        let classifier = Arc::new(CountingClassifier {
            cars,
            calls: AtomicU32::new(0),
        });
        let gate = ImageGate::new(&config, classifier);
        ImageIntake::new(&config, gate, store)
    }

    fn sharp_png() -> Vec<u8> {
        checkerboard_png(640, 480, 16).unwrap()
    }

    fn files_in(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = intake(dir.path(), 10).accept(&[]).await.unwrap_err();
        assert!(matches!(err, GateError::NoImages));
    }

    #[tokio::test]
    async fn test_accepts_and_stores_batch_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let jpeg = encode(&checkerboard(640, 480, 20), ImageFormat::Jpeg).unwrap();
        let uploads = vec![
            UploadedImage::new("front.png", sharp_png()),
            UploadedImage::new("side.JPG", jpeg),
        ];

        let refs = intake(dir.path(), 10).accept(&uploads).await.unwrap();

        assert_eq!(refs.len(), 2);
        assert!(refs[0].file_name.ends_with(".png"));
        assert!(refs[1].file_name.ends_with(".jpg"));
        assert!(refs.iter().all(|r| r.url.starts_with("/images/")));
        assert_eq!(files_in(dir.path()), 2);
    }

    #[tokio::test]
    async fn test_blurry_upload_rejects_whole_batch() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = vec![
            UploadedImage::new("front.png", sharp_png()),
            UploadedImage::new("blurry.png", flat_png(640, 480, 128).unwrap()),
        ];

        let err = intake(dir.path(), 10).accept(&uploads).await.unwrap_err();

        match err {
            GateError::ContentRejection { name, reason } => {
                assert_eq!(name, "blurry.png");
                assert_eq!(reason, Rejection::BlurryOrLowResolution);
            }
            other => panic!("Expected content rejection, got {other:?}"),
        }
        assert_eq!(files_in(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_non_vehicle_rejects_whole_batch() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = vec![
            UploadedImage::new("front.png", sharp_png()),
            UploadedImage::new("garden.png", checkerboard_png(640, 480, 12).unwrap()),
        ];

        // First photo is a car, second is not
        let err = intake(dir.path(), 1).accept(&uploads).await.unwrap_err();

        assert!(matches!(
            err,
            GateError::ContentRejection {
                reason: Rejection::NoVehicleDetected,
                ..
            }
        ));
        assert_eq!(files_in(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_upload_checks_run_before_gate() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = vec![UploadedImage::new("front.gif", sharp_png())];

        let err = intake(dir.path(), 10).accept(&uploads).await.unwrap_err();

        assert!(matches!(err, GateError::UnsupportedExtension { .. }));
        assert!(err.is_user_correctable());
        assert_eq!(files_in(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_failed_store_rollback_spares_other_listings() {
        let dir = tempfile::tempdir().unwrap();
        let shared = sharp_png();

        // Listing A stores the photo first
        let first = intake(dir.path(), 10)
            .accept(&[UploadedImage::new("a.png", shared.clone())])
            .await
            .unwrap();
        let a_path = dir.path().join(&first[0].file_name);

        // Listing B uploads the same bytes, but its second write cannot land
        std::fs::create_dir(dir.path().join("b2.png")).unwrap();
        let store = ImageStore::new(dir.path(), "/images/").with_ids(&["b1", "b2"]);
        let uploads = vec![
            UploadedImage::new("b1.png", shared.clone()),
            UploadedImage::new("b2.png", checkerboard_png(640, 480, 12).unwrap()),
        ];

        let err = intake_with_store(store, 10).accept(&uploads).await.unwrap_err();

        assert!(matches!(err, GateError::Storage { .. }));
        assert_eq!(std::fs::read(&a_path).unwrap(), shared);
        assert!(!dir.path().join("b1.png").exists());
        let leftovers: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty(), "staging files left: {leftovers:?}");
        // A's file plus the blocking directory
        assert_eq!(files_in(dir.path()), 2);
    }
}
