//! Markdown node tree.

/// Inline content of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
}

/// One block of the document. Every source line belongs to exactly one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    /// Consecutive text lines; each line is kept separately.
    Paragraph(Vec<Vec<Inline>>),
    /// Consecutive list items.
    List(Vec<Vec<Inline>>),
    Rule,
    Blank,
}

/// A parsed Markdown document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}
