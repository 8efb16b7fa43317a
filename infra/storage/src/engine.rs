//! The [`Storage`] handle: sandboxed reads and atomic whole-file writes.

use crate::builder::StorageBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance;
use crate::security;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Marker embedded in temporary file names; anything carrying it is safe to purge.
pub(crate) const TMP_MARKER: &str = ".scholartmp.";

/// The internal shared state of a [`Storage`] instance.
#[derive(Debug)]
pub struct StorageInner {
    /// The canonicalized physical path on the disk where all data is stored.
    pub(crate) root: PathBuf,
    /// Counter used to generate unique temporary file names.
    pub(crate) tmp_counter: AtomicU64,
}

/// A cloneable handle to one sandboxed storage root.
///
/// Cloning is cheap (`Arc`). The handle itself does not serialize writers: two writers
/// racing on the same path each replace the whole file, and the last rename wins.
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) inner: Arc<StorageInner>,
}

impl Deref for Storage {
    type Target = StorageInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Storage {
    #[must_use = "The storage engine is not initialized until you call .connect()"]
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    /// The canonical root directory of this storage.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Resolves a relative path to a physical path inside the storage root.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversalAttempt`] for absolute paths or paths that climb
    /// out of the root, and [`StorageError::Io`] if an existing ancestor cannot be verified.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        security::resolve_path(&self.root, path)
    }

    /// Reads a whole file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileNotFound`] if the path does not exist and
    /// [`StorageError::Io`] for any other read failure.
    pub async fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        let resolved = self.resolve(path)?;

        match fs::read(&resolved).await {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::FileNotFound {
                    message: resolved.display().to_string().into(),
                    context: None,
                })
            },
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Read failed: {}", resolved.display()).into()),
            }),
        }
    }

    /// Replaces a whole file atomically.
    ///
    /// The data is written to a unique `<name>.scholartmp.<n>` sibling, synced, and renamed
    /// over the target. Parent directories are created as needed. If any step fails, the
    /// temporary file is removed and the previous target content is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversalAttempt`] if the path escapes the root and
    /// [`StorageError::Io`] if any step of the write fails.
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create parent of {}", resolved.display()))?;
        }

        let temp = unique_tmp_path(&resolved, &self.tmp_counter);

        let file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&temp)
            .await
            .context(format!("Temp creation failed: {}", temp.display()))?;
        fill_temp(&temp, file, data).await?;

        if let Err(err) = fs::rename(&temp, &resolved).await {
            discard(&temp).await;
            return Err(StorageError::Io {
                source: err,
                context: Some(
                    format!("Atomic swap failed: {} -> {}", temp.display(), resolved.display())
                        .into(),
                ),
            });
        }

        if let Some(parent) = resolved.parent() {
            Self::sync_dir(parent).await;
        }

        debug!(path = %resolved.display(), bytes = data.len(), "File replaced atomically");
        Ok(())
    }

    /// Removes temporary files older than five minutes left by interrupted writes.
    pub async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.root).await;
    }

    async fn sync_dir(path: &Path) {
        match fs::File::open(path).await {
            Ok(dir) => {
                if let Err(err) = dir.sync_all().await {
                    warn!(path = %path.display(), error = %err, "Directory sync failed");
                }
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Directory open failed");
            },
        }
    }
}

/// Writes `data` into the freshly created temp file and syncs it. On failure the temp file
/// is removed before the error is returned.
async fn fill_temp(temp: &Path, mut file: fs::File, data: &[u8]) -> Result<(), StorageError> {
    let filled = async {
        file.write_all(data).await.context("Write failed")?;
        // Surfaces errors of the background write before syncing.
        file.flush().await.context("Flush failed")?;
        file.sync_all().await.context("Hardware sync failed")
    }
    .await;
    drop(file);

    if filled.is_err() {
        discard(temp).await;
    }
    filled
}

async fn discard(temp: &Path) {
    if let Err(cleanup) = fs::remove_file(temp).await {
        warn!(path = %temp.display(), error = %cleanup, "Temp file cleanup failed");
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("storage");
    target.with_file_name(format!("{file_name}{TMP_MARKER}{counter}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_fill_removes_the_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let temp = dir.path().join(format!("records.json{TMP_MARKER}1"));
        std::fs::write(&temp, b"").expect("create temp");

        // A read-only handle makes the write fail.
        let file = fs::File::open(&temp).await.expect("open read-only");
        let result = fill_temp(&temp, file, b"{\"usuarios\":{}}").await;

        assert!(matches!(result, Err(StorageError::Io { .. })), "unexpected result: {result:?}");
        assert!(!temp.exists());
    }

    #[tokio::test]
    async fn successful_fill_keeps_the_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let temp = dir.path().join(format!("records.json{TMP_MARKER}2"));
        let file = fs::OpenOptions::new().create_new(true).write(true).open(&temp).await.expect("create temp");

        fill_temp(&temp, file, b"{}").await.expect("fill succeeds");
        assert_eq!(std::fs::read(&temp).expect("read temp"), b"{}");
    }
}
