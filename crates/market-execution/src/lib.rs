//! Runs opened tools end to end: progress reporting, downloads, clipboard and
//! the logging setup shared by the binaries.

pub mod logging;
pub mod runner;
pub mod tracing_layer;

pub use logging::init_logging;
pub use runner::{RunOptions, RunReport, ToolRunner, open_external};
pub use tracing_layer::{InvocationEvent, InvocationEventLayer};
