use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use market_core::markdown::{self, Block, Document, Inline};

const RULE_WIDTH: usize = 40;

pub fn run(file: &Path, html: bool, plain: bool) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    println!("{}", render_text(&text, html, plain));
    Ok(())
}

/// Text result in the requested flavor: HTML, plain or ANSI-styled.
pub fn render_text(text: &str, html: bool, plain: bool) -> String {
    if html {
        markdown::to_html(text)
    } else if plain {
        markdown::to_plain_text(text)
    } else {
        to_ansi(&markdown::parse(text))
    }
}

/// Terminal rendering of a parsed document.
pub fn to_ansi(document: &Document) -> String {
    let mut lines = Vec::new();
    for block in &document.blocks {
        match block {
            Block::Heading { level, content } => {
                let text = inlines(content);
                let styled = if *level <= 2 {
                    text.bold().underline().to_string()
                } else {
                    text.bold().to_string()
                };
                lines.push(styled);
            }
            Block::Paragraph(paragraph) => lines.extend(paragraph.iter().map(|line| inlines(line))),
            Block::List(items) => {
                lines.extend(items.iter().map(|item| format!("  • {}", inlines(item))))
            }
            Block::Rule => lines.push("─".repeat(RULE_WIDTH).dimmed().to_string()),
            Block::Blank => lines.push(String::new()),
        }
    }
    lines.join("\n")
}

fn inlines(content: &[Inline]) -> String {
    content.iter().map(inline).collect()
}

fn inline(node: &Inline) -> String {
    match node {
        Inline::Text(text) => text.clone(),
        Inline::Strong(children) => inlines(children).bold().to_string(),
        Inline::Emphasis(children) => inlines(children).italic().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ansi_structure_without_colors() {
        colored::control::set_override(false);
        let rendered = to_ansi(&markdown::parse(
            "# Oferta\n\n**Frete** grátis para *você*\n---\n- item um\n- item dois",
        ));
        assert_eq!(
            rendered,
            format!(
                "Oferta\n\nFrete grátis para você\n{}\n  • item um\n  • item dois",
                "─".repeat(RULE_WIDTH)
            )
        );
    }

    #[test]
    fn test_html_flavor() {
        let html = render_text("**Oferta**", true, false);
        assert!(html.contains("<strong>Oferta</strong>"));
        assert_eq!(render_text("**Oferta**", false, true), "Oferta");
    }
}
