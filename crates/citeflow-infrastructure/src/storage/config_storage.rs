//! `config.toml` storage.

use std::fs;
use std::path::{Path, PathBuf};

use citeflow_core::config::CiteflowConfig;
use citeflow_core::error::{CiteError, Result};

use crate::paths::CiteflowPaths;

/// Read access to `config.toml`.
///
/// Responsibilities:
/// - Resolve the config path
/// - Parse TOML into [`CiteflowConfig`]
///
/// Does NOT:
/// - Write the file (users edit it by hand)
/// - Validate provider credentials
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    /// Creates a storage handle for the default path (~/.config/citeflow/config.toml).
    pub fn new() -> Result<Self> {
        let path = CiteflowPaths::config_file().map_err(|e| CiteError::config(e.to_string()))?;
        Ok(Self { path })
    }

    /// Creates a storage handle with a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the config.
    ///
    /// A missing or empty file yields defaults; invalid TOML is a `Config`
    /// error naming the file.
    pub fn load(&self) -> Result<CiteflowConfig> {
        if !self.path.exists() {
            tracing::debug!("No config file at {}, using defaults", self.path.display());
            return Ok(CiteflowConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(CiteflowConfig::default());
        }

        toml::from_str(&content).map_err(|e| {
            CiteError::config(format!(
                "Failed to parse configuration file at {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citeflow_core::config::ProviderBackend;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ConfigStorage::with_path(temp_dir.path().join("config.toml"));
        assert_eq!(storage.load().unwrap(), CiteflowConfig::default());
    }

    #[test]
    fn test_load_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[provider]\nbackend = \"open_ai_api\"\nmodel = \"gpt-4o-mini\"\n\n[search]\nverify = false\n",
        )
        .unwrap();

        let config = ConfigStorage::with_path(path).load().unwrap();

        assert_eq!(config.provider.backend, ProviderBackend::OpenAiApi);
        assert_eq!(config.provider.model.as_deref(), Some("gpt-4o-mini"));
        assert!(!config.search.verify);
        assert_eq!(config.search.refill_count, 5);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[search\nverify = maybe").unwrap();

        let err = ConfigStorage::with_path(path).load().unwrap_err();
        assert!(matches!(err, CiteError::Config(_)));
    }
}
