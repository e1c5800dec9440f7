pub mod clipboard;
pub mod config_service;
pub mod download;
pub mod file_input;
pub mod paths;
pub mod secret_service;
pub mod storage;

pub use crate::clipboard::SystemClipboard;
pub use crate::config_service::ConfigService;
pub use crate::download::OutputWriter;
pub use crate::file_input::load_input_file;
pub use crate::paths::MarketPaths;
pub use crate::secret_service::SecretServiceImpl;
