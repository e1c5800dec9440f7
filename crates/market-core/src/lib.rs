pub mod clipboard;
pub mod config;
pub mod error;
pub mod generation;
pub mod invocation;
pub mod markdown;
pub mod secret;
pub mod tool;

// Re-export common error type
pub use error::MarketError;
