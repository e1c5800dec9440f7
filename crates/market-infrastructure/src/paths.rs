//! Unified path management for Market Suite files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/market-suite/      # Config directory
//! ├── config.toml              # Application configuration
//! └── secret.json              # Gemini API key
//!
//! ~/.local/share/market-suite/ # Data directory
//! └── outputs/                 # Downloaded images and videos
//! ```
//!
//! Every path can be rebased under a custom root, which the tests use.

use std::path::{Path, PathBuf};

use market_core::MarketError;

const APP_DIR: &str = "market-suite";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for MarketError {
    fn from(err: PathError) -> Self {
        MarketError::config(err.to_string())
    }
}

/// Resolves the files Market Suite reads and writes.
#[derive(Debug, Clone, Default)]
pub struct MarketPaths {
    base: Option<PathBuf>,
}

impl MarketPaths {
    /// `None` uses the platform directories; `Some(root)` puts everything under `root`.
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the configuration directory (e.g., `~/.config/market-suite/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    /// Returns the data directory (e.g., `~/.local/share/market-suite/`).
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600) to prevent
    /// unauthorized access.
    pub fn secret_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    /// Default directory for downloaded results.
    pub fn output_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("outputs"))
    }
}
