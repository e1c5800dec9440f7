//! `secret.json` storage.
//!
//! The file carries the Gemini credential and nothing else. `market-suite
//! init` writes a template with a blank key; a blank key counts as missing,
//! so the template alone never enables the video tool.

use std::fs;
use std::path::{Path, PathBuf};

use market_core::MarketError;
use market_core::config::{DEFAULT_TEXT_MODEL, GeminiConfig, SecretConfig};
use thiserror::Error;

use crate::paths::MarketPaths;

#[derive(Debug, Error)]
pub enum SecretStorageError {
    #[error("secret.json not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("Cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Could not determine the config directory")]
    ConfigDirNotFound,
}

impl From<SecretStorageError> for MarketError {
    fn from(err: SecretStorageError) -> Self {
        match err {
            SecretStorageError::Parse { source, .. } => source.into(),
            SecretStorageError::Io { source, .. } => source.into(),
            other => MarketError::config(other.to_string()),
        }
    }
}

/// What `secret.json` currently provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretFileStatus {
    Missing,
    /// Present, but the Gemini key is blank (the `init` template).
    Blank,
    Configured,
}

/// Reads `secret.json` and writes its first-run template.
///
/// The file is plaintext; the template is created with mode 600 on Unix.
#[derive(Debug, Clone)]
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    pub fn new(paths: &MarketPaths) -> Result<Self, SecretStorageError> {
        let path = paths
            .secret_file()
            .map_err(|_| SecretStorageError::ConfigDirNotFound)?;
        Ok(Self { path })
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        let content = fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SecretStorageError::NotFound(self.path.clone())
            } else {
                self.io_error(source)
            }
        })?;
        serde_json::from_str(&content).map_err(|source| SecretStorageError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    pub fn status(&self) -> Result<SecretFileStatus, SecretStorageError> {
        match self.load() {
            Ok(secrets) if secrets.gemini_api_key().is_some() => Ok(SecretFileStatus::Configured),
            Ok(_) => Ok(SecretFileStatus::Blank),
            Err(SecretStorageError::NotFound(_)) => Ok(SecretFileStatus::Missing),
            Err(err) => Err(err),
        }
    }

    /// Writes the template unless the file already exists. Returns whether
    /// it was created.
    pub fn ensure_template(&self) -> Result<bool, SecretStorageError> {
        if self.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let template = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: String::new(),
                model_name: Some(DEFAULT_TEXT_MODEL.to_string()),
            }),
        };
        let json = serde_json::to_string_pretty(&template).map_err(|source| {
            SecretStorageError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, json).map_err(|source| self.io_error(source))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(|source| self.io_error(source))?;
        }

        tracing::info!(path = %self.path.display(), "Created secret.json template");
        Ok(true)
    }

    fn io_error(&self, source: std::io::Error) -> SecretStorageError {
        SecretStorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
