//! Markdown subset used by generated text results.
//!
//! Supported: `**bold**`, `*italic*`, `#`..`######` headings, `-`/`*`/`+`
//! unordered lists, `---` rules and line breaks. Nested lists, tables and
//! code blocks are plain paragraphs.
//!
//! Text is parsed into a [`Document`] node tree first, so rendering to HTML
//! and to plain text never depends on rewrite order.

mod node;
mod parser;
mod render;

pub use node::{Block, Document, Inline};
pub use parser::parse;

/// Parses `text` and renders it as an HTML fragment.
pub fn to_html(text: &str) -> String {
    parse(text).to_html()
}

/// Parses `text` and renders it without Markdown markers.
pub fn to_plain_text(text: &str) -> String {
    parse(text).to_plain_text()
}
