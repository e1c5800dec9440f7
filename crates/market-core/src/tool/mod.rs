//! Tool catalog domain models.
//!
//! A tool is one entry of the Market Suite grid. Its descriptor is immutable
//! and read-only for the lifetime of the process; the catalog groups all
//! descriptors and resolves them by key.

mod catalog;
mod model;

pub use catalog::ToolCatalog;
pub use model::{ToolCategory, ToolDescriptor, ToolLaunch};
