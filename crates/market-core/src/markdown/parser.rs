//! Line-oriented parser for the Markdown subset.

use super::node::{Block, Document, Inline};

enum Line<'a> {
    Blank,
    Rule,
    Heading(u8, &'a str),
    Item(&'a str),
    Text(&'a str),
}

/// Parses `text` into a [`Document`]. Never fails: anything unrecognised is
/// kept as paragraph text.
pub fn parse(text: &str) -> Document {
    let mut blocks: Vec<Block> = Vec::new();

    for line in text.lines() {
        match classify(line) {
            Line::Blank => blocks.push(Block::Blank),
            Line::Rule => blocks.push(Block::Rule),
            Line::Heading(level, rest) => blocks.push(Block::Heading {
                level,
                content: parse_inlines(rest),
            }),
            Line::Item(rest) => {
                let item = parse_inlines(rest);
                match blocks.last_mut() {
                    Some(Block::List(items)) => items.push(item),
                    _ => blocks.push(Block::List(vec![item])),
                }
            }
            Line::Text(rest) => {
                let line = parse_inlines(rest);
                match blocks.last_mut() {
                    Some(Block::Paragraph(lines)) => lines.push(line),
                    _ => blocks.push(Block::Paragraph(vec![line])),
                }
            }
        }
    }

    Document { blocks }
}

fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Line::Blank;
    }
    if is_rule(trimmed) {
        return Line::Rule;
    }

    let start = line.trim_start();
    let hashes = start.bytes().take_while(|b| *b == b'#').count();
    if (1..=6).contains(&hashes) {
        let rest = &start[hashes..];
        if rest.is_empty() || rest.starts_with(' ') {
            return Line::Heading(hashes as u8, rest.trim());
        }
    }

    for bullet in ["- ", "* ", "+ "] {
        if let Some(rest) = start.strip_prefix(bullet) {
            return Line::Item(rest.trim());
        }
    }

    Line::Text(line.trim_end())
}

/// Three or more of the same rule character (`-`, `*`, `_`), spaces allowed.
fn is_rule(trimmed: &str) -> bool {
    let mut marks = trimmed.chars().filter(|c| !c.is_whitespace());
    let Some(first) = marks.next() else {
        return false;
    };
    if !matches!(first, '-' | '*' | '_') {
        return false;
    }
    let mut count = 1;
    for c in marks {
        if c != first {
            return false;
        }
        count += 1;
    }
    count >= 3
}

/// Parses emphasis markers. Unmatched markers stay literal text.
pub(crate) fn parse_inlines(text: &str) -> Vec<Inline> {
    let bytes = text.as_bytes();
    let mut nodes = Vec::new();
    let mut buffer = String::new();
    let mut i = 0;

    while i < text.len() {
        if bytes[i] == b'*' {
            if bytes.get(i + 1) == Some(&b'*') {
                if let Some(end) = find_strong_close(text, i + 2) {
                    flush(&mut buffer, &mut nodes);
                    nodes.push(Inline::Strong(parse_inlines(&text[i + 2..end])));
                    i = end + 2;
                } else {
                    buffer.push_str("**");
                    i += 2;
                }
                continue;
            }

            if let Some(end) = find_emphasis_close(bytes, i + 1) {
                flush(&mut buffer, &mut nodes);
                nodes.push(Inline::Emphasis(parse_inlines(&text[i + 1..end])));
                i = end + 1;
            } else {
                buffer.push('*');
                i += 1;
            }
            continue;
        }

        let Some(ch) = text[i..].chars().next() else {
            break;
        };
        buffer.push(ch);
        i += ch.len_utf8();
    }

    flush(&mut buffer, &mut nodes);
    nodes
}

fn flush(buffer: &mut String, nodes: &mut Vec<Inline>) {
    if !buffer.is_empty() {
        nodes.push(Inline::Text(std::mem::take(buffer)));
    }
}

/// Closing `**`. In a `***` run the first `*` closes an inner emphasis.
fn find_strong_close(text: &str, from: usize) -> Option<usize> {
    let mut end = from + text[from..].find("**")?;
    if text[end..].starts_with("***") {
        end += 1;
    }
    (end > from).then_some(end)
}

/// Next single `*`, skipping `**` pairs so bold can nest inside italics.
fn find_emphasis_close(bytes: &[u8], from: usize) -> Option<usize> {
    let mut j = from;
    while j < bytes.len() {
        if bytes[j] == b'*' {
            if bytes.get(j + 1) == Some(&b'*') {
                j += 2;
                continue;
            }
            return (j > from).then_some(j);
        }
        j += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn test_inline_emphasis() {
        assert_eq!(
            parse_inlines("**Oferta** para *você*"),
            vec![
                Inline::Strong(vec![text("Oferta")]),
                text(" para "),
                Inline::Emphasis(vec![text("você")]),
            ]
        );
    }

    #[test]
    fn test_nested_emphasis() {
        assert_eq!(
            parse_inlines("**muito *bom***"),
            vec![Inline::Strong(vec![
                text("muito "),
                Inline::Emphasis(vec![text("bom")]),
            ])]
        );
        assert_eq!(
            parse_inlines("*a **b** c*"),
            vec![Inline::Emphasis(vec![
                text("a "),
                Inline::Strong(vec![text("b")]),
                text(" c"),
            ])]
        );
    }

    #[test]
    fn test_unmatched_markers_are_literal() {
        assert_eq!(parse_inlines("5 * 3 = 15"), vec![text("5 * 3 = 15")]);
        assert_eq!(parse_inlines("**aberto"), vec![text("**aberto")]);
        assert_eq!(parse_inlines("****"), vec![text("****")]);
    }

    #[test]
    fn test_blocks() {
        let doc = parse("# Título\n\nLinha um\nLinha dois\n- item\n* outro\n---\n#hashtag");
        assert_eq!(
            doc.blocks,
            vec![
                Block::Heading {
                    level: 1,
                    content: vec![text("Título")]
                },
                Block::Blank,
                Block::Paragraph(vec![vec![text("Linha um")], vec![text("Linha dois")]]),
                Block::List(vec![vec![text("item")], vec![text("outro")]]),
                Block::Rule,
                Block::Paragraph(vec![vec![text("#hashtag")]]),
            ]
        );
    }

    #[test]
    fn test_heading_levels_and_rules() {
        let doc = parse("### Sub\n####### not a heading\n***\n- - -");
        assert!(matches!(doc.blocks[0], Block::Heading { level: 3, .. }));
        assert!(matches!(doc.blocks[1], Block::Paragraph(_)));
        assert_eq!(doc.blocks[2], Block::Rule);
        assert_eq!(doc.blocks[3], Block::Rule);
    }
}
