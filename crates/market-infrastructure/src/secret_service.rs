//! Secret service implementation.
//!
//! Reads the Gemini credential from secret.json. The `GEMINI_API_KEY` and
//! `API_KEY` environment variables take precedence over the file.

use std::path::Path;
use std::sync::{Arc, RwLock};

use market_core::config::{GeminiConfig, SecretConfig};
use market_core::error::{MarketError, Result};
use market_core::secret::SecretService;

use crate::paths::MarketPaths;
use crate::storage::{SecretStorage, SecretStorageError};

/// Environment variables checked for a credential, in order.
pub const CREDENTIAL_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Service for managing secret configuration.
///
/// The loaded configuration is cached, so secret.json is read at most once
/// per service instance.
///
/// # Example
///
/// ```ignore
/// use market_infrastructure::SecretServiceImpl;
/// use market_core::secret::SecretService;
///
/// let service = SecretServiceImpl::default()?;
/// let credential = service.gemini_credential().await?;
/// ```
#[derive(Clone)]
pub struct SecretServiceImpl {
    secrets: Arc<RwLock<Option<SecretConfig>>>,
    storage: SecretStorage,
    read_env: bool,
}

impl SecretServiceImpl {
    pub fn default() -> Result<Self> {
        Self::new(None)
    }

    /// Creates a service for the secret file under `base_path` (or the
    /// platform config directory).
    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        let storage = SecretStorage::new(&MarketPaths::new(base_path))?;
        Ok(Self::with_storage(storage))
    }

    pub fn with_storage(storage: SecretStorage) -> Self {
        Self {
            secrets: Arc::new(RwLock::new(None)),
            storage,
            read_env: true,
        }
    }

    /// Ignores the credential environment variables.
    pub fn without_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    fn env_api_key(&self) -> Option<String> {
        if !self.read_env {
            return None;
        }
        CREDENTIAL_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
    }

    /// Loads the secrets from storage if not already cached.
    fn load_secrets_internal(&self) -> Result<SecretConfig> {
        {
            let read_lock = self
                .secrets
                .read()
                .map_err(|e| MarketError::internal(format!("secret cache poisoned: {e}")))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let mut loaded = match self.storage.load() {
            Ok(config) => config,
            Err(SecretStorageError::NotFound(path)) => {
                tracing::debug!(path = %path.display(), "secret.json not found");
                SecretConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(api_key) = self.env_api_key() {
            tracing::debug!("Using Gemini API key from environment");
            let model_name = loaded.gemini.and_then(|gemini| gemini.model_name);
            loaded.gemini = Some(GeminiConfig {
                api_key,
                model_name,
            });
        }

        let mut write_lock = self
            .secrets
            .write()
            .map_err(|e| MarketError::internal(format!("secret cache poisoned: {e}")))?;
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        self.load_secrets_internal()
    }

    async fn secret_file_exists(&self) -> bool {
        self.storage.exists()
    }
}
