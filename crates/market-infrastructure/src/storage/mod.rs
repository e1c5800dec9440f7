//! Storage layer for atomic file operations.

mod atomic_toml;
mod secret_storage;

pub use atomic_toml::{AtomicTomlError, AtomicTomlFile};
pub(crate) use atomic_toml::temp_path;
pub use secret_storage::{SecretFileStatus, SecretStorage, SecretStorageError};
