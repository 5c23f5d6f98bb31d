//! `secret.json` storage.
//!
//! Holds per-backend API keys. The file is optional: credentials may also
//! come from the environment, so a missing or blank file reads as empty.

use std::fs;
use std::path::{Path, PathBuf};

use citeflow_core::config::SecretConfig;
use thiserror::Error;

use crate::paths::{CiteflowPaths, PathError};

#[derive(Debug, Error)]
pub enum SecretStorageError {
    #[error("Secret file not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read secret file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Only the serde position is reported; the offending text may be a key.
    #[error("Invalid JSON in secret file {} (line {line}, column {column})", .path.display())]
    Parse { path: PathBuf, line: usize, column: usize },

    #[error(transparent)]
    Location(#[from] PathError),
}

/// Read-only access to `secret.json`. Keys are never logged.
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Storage for the default location (~/.config/citeflow/secret.json).
    pub fn new() -> Result<Self, SecretStorageError> {
        Ok(Self {
            path: CiteflowPaths::secret_file()?,
        })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the file. A present but blank file is empty secrets.
    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        let content = fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SecretStorageError::NotFound(self.path.clone())
            } else {
                SecretStorageError::Read {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        if content.trim().is_empty() {
            return Ok(SecretConfig::default());
        }

        serde_json::from_str(&content).map_err(|e| SecretStorageError::Parse {
            path: self.path.clone(),
            line: e.line(),
            column: e.column(),
        })
    }

    /// Like [`load`](Self::load), but any failure yields empty secrets so
    /// the environment fallback still applies.
    pub fn load_or_default(&self) -> SecretConfig {
        match self.load() {
            Ok(config) => config,
            Err(SecretStorageError::NotFound(_)) => SecretConfig::default(),
            Err(err) => {
                tracing::warn!("Ignoring secret file: {err}");
                SecretConfig::default()
            }
        }
    }
}
