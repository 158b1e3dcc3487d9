//! Flat-file record store for campaigns.
//!
//! One JSON file holds the full array of [`Campaign`] records. Every
//! mutation rewrites the whole file. The store itself does no locking;
//! the service serializes the load-mutate-save cycle behind a single
//! writer mutex.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::campaign::Campaign;

/// Errors returned by the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the store file failed.
    #[error("store I/O failed for {path}: {source}")]
    Io {
        /// Store file path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The store file contents are not a valid campaign array.
    #[error("store file {path} is corrupt: {source}")]
    Corrupt {
        /// Store file path.
        path: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
    /// Encoding the campaign array failed.
    #[error("store encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Flat-file store holding every campaign record.
#[derive(Debug, Clone)]
pub struct CampaignStore {
    path: PathBuf,
}

impl CampaignStore {
    /// Create a store backed by the given file path.
    ///
    /// The file is created lazily, on first [`load`](Self::load).
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full store.
    ///
    /// A missing file is not an error: an empty store is written and an
    /// empty vec returned.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on any other I/O failure or when the file
    /// contents do not decode as a campaign array. Nothing is retried.
    pub fn load(&self) -> Result<Vec<Campaign>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
                    path: self.path.display().to_string(),
                    source,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.save(&[])?;
                Ok(Vec::new())
            }
            Err(source) => Err(StoreError::Io {
                path: self.path.display().to_string(),
                source,
            }),
        }
    }

    /// Overwrite the full store with the given records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when encoding or the write fails.
    pub fn save(&self, campaigns: &[Campaign]) -> Result<(), StoreError> {
        let encoded = serde_json::to_string_pretty(campaigns).map_err(StoreError::Encode)?;
        std::fs::write(&self.path, encoded).map_err(|source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }
}
