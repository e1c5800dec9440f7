//! System clipboard backed by `arboard`.

use market_core::clipboard::Clipboard;
use market_core::error::{MarketError, Result};

/// Writes plain text to the desktop clipboard.
///
/// A new `arboard` handle is opened per write; headless sessions report an
/// error instead of panicking.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| MarketError::io(format!("Clipboard unavailable: {e}")))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| MarketError::io(format!("Failed to write clipboard: {e}")))
    }
}
