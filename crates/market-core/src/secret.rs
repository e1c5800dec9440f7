//! Secret management service trait.
//!
//! Defines the interface for loading the API credential from secure storage.

use crate::config::{ApiCredential, SecretConfig};
use crate::error::Result;

/// Service for managing secret configuration.
///
/// # Security Note
///
/// Implementations should ensure that:
/// - Secret files have appropriate permissions (e.g., 600 on Unix)
/// - Secrets are never logged or exposed in error messages
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration.
    async fn load_secrets(&self) -> Result<SecretConfig>;

    /// Checks if the secret file exists.
    async fn secret_file_exists(&self) -> bool;

    /// Returns the Gemini credential, if one has been configured.
    async fn gemini_credential(&self) -> Result<Option<ApiCredential>> {
        Ok(self.load_secrets().await?.gemini_api_key())
    }
}
