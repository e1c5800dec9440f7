//! Generation service clients.
//!
//! [`GeminiApiClient`] is the only backend: it talks to the Gemini REST API
//! and implements [`market_core::generation::GenerationService`].

pub mod gemini_api_client;

pub use gemini_api_client::{CREDENTIAL_RESELECT_MESSAGE, GeminiApiClient};
