//! Unified path management for citeflow configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/citeflow/          # Config directory
//! ├── config.toml              # Application configuration
//! └── secret.json              # API keys and secrets
//! ```

use std::path::PathBuf;

use thiserror::Error;

const APP_DIR: &str = "citeflow";

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("Cannot find home directory")]
    HomeDirNotFound,
}

/// Unified path management for citeflow.
pub struct CiteflowPaths;

impl CiteflowPaths {
    /// Returns the citeflow configuration directory (e.g. `~/.config/citeflow/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to `secret.json`.
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }
}
