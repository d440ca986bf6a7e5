//! Storage for accepted images.
//!
//! Every stored upload gets its own random file name, so two listings that
//! upload identical bytes never touch each other's file.
//! The BLAKE3 hash of the bytes is still recorded on the reference.

use blake3::Hasher as Blake3Hasher;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::error::GateError;
use crate::types::ImageRef;

use super::validate::extension_of;

type IdSource = Arc<dyn Fn() -> String + Send + Sync>;

fn random_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Writes accepted images to a directory and hands out public references.
#[derive(Clone)]
pub struct ImageStore {
    dir: PathBuf,
    url_prefix: String,
    next_id: IdSource,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into(),
            next_id: Arc::new(random_id),
        }
    }

    /// Store rooted at the configured (tilde-expanded) image directory.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.image_dir(), config.intake.url_prefix.clone())
    }

    /// Hand out the given ids first, then random ones.
    #[cfg(test)]
    pub(crate) fn with_ids(mut self, ids: &[&str]) -> Self {
        use std::collections::VecDeque;
        use std::sync::Mutex;

        let queue: Mutex<VecDeque<String>> =
            Mutex::new(ids.iter().map(|id| id.to_string()).collect());
        self.next_id = Arc::new(move || queue.lock().unwrap().pop_front().unwrap_or_else(random_id));
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// BLAKE3 hex digest of an in-memory buffer.
    pub fn content_hash(bytes: &[u8]) -> String {
        let mut hasher = Blake3Hasher::new();
        hasher.update(bytes);
        hasher.finalize().to_hex().to_string()
    }

    /// Write `bytes` as `<id>.<ext>` and return its reference.
    ///
    /// The extension is taken from `original_name`, lower-cased. Bytes go to
    /// a private staging file first and are then linked into place, so an
    /// existing file is never overwritten and a failed write leaves nothing
    /// behind.
    pub async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<ImageRef, GateError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| GateError::Storage {
                path: self.dir.display().to_string(),
                message: format!("Cannot create image directory: {e}"),
            })?;

        let id = (self.next_id)();
        let extension = extension_of(original_name);
        let file_name = if extension.is_empty() {
            id
        } else {
            format!("{id}.{extension}")
        };
        let path = self.dir.join(&file_name);
        let staging = self.dir.join(format!(".{file_name}.part"));

        let published = match tokio::fs::write(&staging, bytes).await {
            Ok(()) => tokio::fs::hard_link(&staging, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = tokio::fs::remove_file(&staging).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to delete staging file {}: {e}", staging.display());
            }
        }
        published.map_err(|e| GateError::Storage {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::info!("Stored {} as {}", original_name, file_name);

        Ok(ImageRef {
            url: format!("{}{}", self.url_prefix, file_name),
            file_name,
            size: bytes.len() as u64,
            content_hash: Self::content_hash(bytes),
        })
    }

    /// Resolve a URL or bare file name to a path inside the store.
    ///
    /// Only the last path segment is used, so a reference can never point
    /// outside the image directory.
    pub fn path_for(&self, reference: &str) -> Option<PathBuf> {
        let file_name = reference.rsplit('/').next()?;
        if file_name.is_empty() || file_name == "." || file_name == ".." || file_name.contains('\\')
        {
            return None;
        }
        Some(self.dir.join(file_name))
    }

    /// Best-effort delete. Returns whether a file was removed.
    ///
    /// Missing files and I/O failures are logged and otherwise ignored.
    pub async fn remove(&self, reference: &str) -> bool {
        let Some(path) = self.path_for(reference) else {
            tracing::warn!("Ignoring invalid image reference: {reference:?}");
            return false;
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!("Removed {}", path.display());
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!("Failed to delete image file {}: {e}", path.display());
                false
            }
        }
    }
}
