//! Clipboard boundary.

use crate::error::Result;

/// Destination of the copy action.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}
