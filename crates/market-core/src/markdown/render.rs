//! HTML and plain-text rendering of the node tree.

use super::node::{Block, Document, Inline};

impl Inline {
    /// Text content without markers. Unmatched `*` runs kept as literal
    /// text by the parser are dropped here too.
    pub fn plain_text(&self) -> String {
        match self {
            Inline::Text(text) => text.replace('*', ""),
            Inline::Strong(children) | Inline::Emphasis(children) => plain_line(children),
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Inline::Text(text) => escape_into(text, out),
            Inline::Strong(children) => {
                out.push_str("<strong>");
                children.iter().for_each(|c| c.write_html(out));
                out.push_str("</strong>");
            }
            Inline::Emphasis(children) => {
                out.push_str("<em>");
                children.iter().for_each(|c| c.write_html(out));
                out.push_str("</em>");
            }
        }
    }
}

impl Document {
    /// HTML fragment. Text is escaped; blank lines produce no output.
    pub fn to_html(&self) -> String {
        let mut parts = Vec::new();
        for block in &self.blocks {
            let mut out = String::new();
            match block {
                Block::Heading { level, content } => {
                    out.push_str(&format!("<h{level}>"));
                    content.iter().for_each(|c| c.write_html(&mut out));
                    out.push_str(&format!("</h{level}>"));
                }
                Block::Paragraph(lines) => {
                    out.push_str("<p>");
                    for (index, line) in lines.iter().enumerate() {
                        if index > 0 {
                            out.push_str("<br />");
                        }
                        line.iter().for_each(|c| c.write_html(&mut out));
                    }
                    out.push_str("</p>");
                }
                Block::List(items) => {
                    out.push_str("<ul>");
                    for item in items {
                        out.push_str("<li>");
                        item.iter().for_each(|c| c.write_html(&mut out));
                        out.push_str("</li>");
                    }
                    out.push_str("</ul>");
                }
                Block::Rule => out.push_str("<hr />"),
                Block::Blank => continue,
            }
            parts.push(out);
        }
        parts.join("\n")
    }

    /// Plain text with one output line per source line.
    ///
    /// Headings lose their `#`, every `*` is removed, rules become empty
    /// lines and list items lose their bullet.
    pub fn to_plain_text(&self) -> String {
        let mut lines = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Heading { content, .. } => lines.push(plain_line(content)),
                Block::Paragraph(paragraph) => {
                    lines.extend(paragraph.iter().map(|line| plain_line(line)))
                }
                Block::List(items) => lines.extend(items.iter().map(|item| plain_line(item))),
                Block::Rule | Block::Blank => lines.push(String::new()),
            }
        }
        lines.join("\n")
    }
}

fn plain_line(nodes: &[Inline]) -> String {
    let line: String = nodes.iter().map(Inline::plain_text).collect();
    line.trim_end().to_string()
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{parse, to_html, to_plain_text};

    #[test]
    fn test_html_rendering() {
        let html = to_html("## Destaques\n- **Rápido**\n- *Barato*\n---\nLinha 1\nLinha 2");
        assert_eq!(
            html,
            "<h2>Destaques</h2>\n\
             <ul><li><strong>Rápido</strong></li><li><em>Barato</em></li></ul>\n\
             <hr />\n\
             <p>Linha 1<br />Linha 2</p>"
        );
    }

    #[test]
    fn test_html_is_escaped() {
        assert_eq!(
            to_html("<script>alert(\"x\")</script> & **b**"),
            "<p>&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; <strong>b</strong></p>"
        );
    }

    #[test]
    fn test_plain_text_removes_markers() {
        let response = "# Título da Campanha\n\n**Oferta** imperdível para *você*!\n---\n- item um\n- item **dois**";
        assert_eq!(
            to_plain_text(response),
            "Título da Campanha\n\nOferta imperdível para você!\n\nitem um\nitem dois"
        );
    }

    #[test]
    fn test_plain_text_drops_stray_markers() {
        let cases = [
            ("**Oferta** só hoje **", "Oferta só hoje"),
            ("* item um\n* item dois", "item um\nitem dois"),
            ("+ item um\n- item dois", "item um\nitem dois"),
            ("**aberto", "aberto"),
            ("Desconto de 10*", "Desconto de 10"),
            ("## *Título* com **", "Título com"),
            ("****", ""),
        ];

        for (response, expected) in cases {
            let plain = to_plain_text(response);
            assert_eq!(plain, expected, "response: {response:?}");
            assert!(!plain.contains('*'), "response: {response:?}");
            assert!(
                plain.lines().all(|line| !line.starts_with('#')),
                "response: {response:?}"
            );
        }
    }

    #[test]
    fn test_plain_text_keeps_line_count() {
        let response = "a\n\n\nb\n***\nc";
        let plain = parse(response).to_plain_text();
        assert_eq!(plain.lines().count(), response.lines().count());
    }
}
