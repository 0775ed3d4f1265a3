//! File-backed resume store
//!
//! One JSON record per fingerprint under a dedicated state directory.
//! Writes replace the whole file so a reader never sees a partial record.

use super::types::Continuation;
use crate::error::{Error, Result};
use crate::fingerprint::Fingerprint;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default directory for resume records, relative to the working directory
pub const DEFAULT_STATE_DIR: &str = ".cursor";

/// Directory holding one resume record per fingerprint
#[derive(Debug, Clone)]
pub struct ResumeStore {
    dir: PathBuf,
}

impl ResumeStore {
    /// Create a store rooted at the given directory
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// The state directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for a fingerprint
    pub fn record_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.dir.join(fingerprint.as_str())
    }

    /// Open the record for a fingerprint, creating the directory and an empty file if needed
    pub async fn open(&self, fingerprint: &Fingerprint) -> Result<ResumeHandle> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::storage(&self.dir, format!("Failed to create directory: {e}")))?;

        let path = self.record_path(fingerprint);
        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| Error::storage(&path, format!("Failed to open record: {e}")))?;

        debug!("Resume record: {}", path.display());
        Ok(ResumeHandle { path })
    }
}

impl Default for ResumeStore {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_DIR)
    }
}

/// Handle to a single resume record
#[derive(Debug, Clone)]
pub struct ResumeHandle {
    path: PathBuf,
}

impl ResumeHandle {
    /// Path of the record file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record
    ///
    /// A missing, empty, or malformed record yields an empty continuation.
    pub async fn load(&self) -> Result<Continuation> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Continuation::new()),
            Err(e) => {
                return Err(Error::storage(
                    &self.path,
                    format!("Failed to read record: {e}"),
                ))
            }
        };

        if contents.iter().all(u8::is_ascii_whitespace) {
            return Ok(Continuation::new());
        }

        match serde_json::from_slice(&contents) {
            Ok(continuation) => Ok(continuation),
            Err(e) => {
                warn!(
                    "Ignoring malformed resume record {}: {e}",
                    self.path.display()
                );
                Ok(Continuation::new())
            }
        }
    }

    /// Replace the record with the given continuation
    pub async fn save(&self, continuation: &Continuation) -> Result<()> {
        let contents = serde_json::to_string(continuation)?;

        // Write to temp file first, then rename over the record
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::storage(&temp_path, format!("Failed to write record: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::storage(&self.path, format!("Failed to replace record: {e}")))?;

        Ok(())
    }

    /// Delete the record; a record that is already gone is fine
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Removed resume record {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage(
                &self.path,
                format!("Failed to remove record: {e}"),
            )),
        }
    }

    /// Whether the record file currently exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}
