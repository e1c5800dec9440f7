//! The external generation service boundary.

use async_trait::async_trait;

use super::request::GenerationRequest;
use super::response::{GenerationOperation, GenerationResponse};
use crate::error::Result;

/// Generative-AI backend used by every tool.
///
/// Implementations translate [`GenerationRequest`]s to a provider API. Errors
/// must never contain the credential.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Issues a request. Video requests answer with a pending operation.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;

    /// Re-fetches the status of a long-running operation.
    ///
    /// An operation the service no longer knows about is reported as
    /// [`crate::MarketError::Credential`].
    async fn poll_operation(&self, operation: &GenerationOperation) -> Result<GenerationOperation>;

    /// Downloads the asset a finished operation points to.
    async fn fetch_asset(&self, uri: &str) -> Result<Vec<u8>>;
}
