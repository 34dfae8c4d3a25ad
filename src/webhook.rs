//! Webhook payload storage
//!
//! Each provider callback is written to its own file under the output directory.
//! File names combine the UTC receive time, a per-process sequence number and a
//! SHA-256 prefix of the stored bytes:
//!
//! `insta_20240101T120000.123456Z_000042_1a2b3c4d5e6f.json`

use chrono::{DateTime, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

const FILE_PREFIX: &str = "insta";
const HASH_PREFIX_BYTES: usize = 6;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("failed to create webhook directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write webhook payload {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug)]
pub struct WebhookStore {
    dir: PathBuf,
    sequence: AtomicU64,
}

impl WebhookStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<(), WebhookError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| WebhookError::CreateDir {
                path: self.dir.clone(),
                source,
            })
    }

    /// Persist one payload and return the file it was written to.
    ///
    /// JSON bodies are stored pretty-printed; anything else is stored as received.
    pub async fn persist(&self, body: &[u8]) -> Result<PathBuf, WebhookError> {
        let received_at = Utc::now();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let (contents, extension) = match serde_json::from_slice::<Value>(body) {
            Ok(value) => match serde_json::to_vec_pretty(&value) {
                Ok(pretty) => (pretty, "json"),
                Err(_) => (body.to_vec(), "json"),
            },
            Err(_) => (body.to_vec(), "raw"),
        };

        self.ensure_dir().await?;
        let path = self
            .dir
            .join(payload_file_name(received_at, sequence, &contents, extension));

        let write_err = |source| WebhookError::Write {
            path: path.clone(),
            source,
        };
        // create_new: an existing file is never overwritten
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(write_err)?;
        file.write_all(&contents).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;

        Ok(path)
    }
}

/// File name for a payload received at `at` with the given sequence number
pub fn payload_file_name(
    at: DateTime<Utc>,
    sequence: u64,
    contents: &[u8],
    extension: &str,
) -> String {
    let digest = Sha256::digest(contents);
    format!(
        "{}_{}_{:06}_{}.{}",
        FILE_PREFIX,
        at.format("%Y%m%dT%H%M%S%.6fZ"),
        sequence,
        hex::encode(&digest[..HASH_PREFIX_BYTES]),
        extension
    )
}
