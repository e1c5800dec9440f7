pub mod controller;
pub mod handler;
pub mod prompt;
pub mod registry;

pub use controller::{Download, LifecycleController};
pub use handler::ToolHandler;
pub use prompt::PromptTemplates;
pub use registry::{COMING_SOON_MESSAGE, ToolRegistry, ToolView};
