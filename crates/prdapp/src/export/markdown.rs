//! Markdown export.
//!
//! ```text
//! # <name>
//!
//! *Created: ... | Modified: ...*
//!
//! ---
//!
//! ## <section title>
//!
//! <section body>
//!
//! ## Attachments
//!
//! - <name> (<size>)
//! ```
//!
//! Headings inside a section body are bumped two levels (H1 → H3, capped at
//! H6) so they nest under the section heading.

use super::{exportable_sections, format_file_size, header_line};
use crate::content::{
    walk, Inline, LoadSource, ListContext, ListItem, RichDocument, RichRenderer, SectionContent,
};
use crate::model::Document;

pub fn render(doc: &Document) -> String {
    let mut out = format!("# {}\n\n", doc.name);
    out.push_str(&format!("*{}*\n\n", header_line(doc)));
    out.push_str("---\n\n");

    for (id, content) in exportable_sections(doc) {
        out.push_str(&format!("## {}\n\n", id.title()));
        out.push_str(&section_body(content));
        out.push_str("\n\n");
    }

    if !doc.attachments.is_empty() {
        out.push_str("## Attachments\n\n");
        for attachment in &doc.attachments {
            out.push_str(&format!(
                "- {} ({})\n",
                attachment.name,
                format_file_size(attachment.size)
            ));
        }
        out.push('\n');
    }

    out
}

/// A section body without trailing blank lines.
pub fn section_body(content: &SectionContent) -> String {
    match content.source() {
        LoadSource::Delta(delta) => {
            let mut renderer = MarkdownRenderer::default();
            walk(&RichDocument::from_delta(delta), &mut renderer);
            collapse_blank_lines(&renderer.out).trim().to_string()
        }
        LoadSource::Html(_) | LoadSource::Text(_) => content.plain_text().trim().to_string(),
    }
}

/// Three or more consecutive newlines become exactly one blank line.
fn collapse_blank_lines(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut newlines = 0;
    for c in s.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines <= 2 {
                out.push(c);
            }
        } else {
            newlines = 0;
            out.push(c);
        }
    }
    out
}

/// Bump a heading level by 2, capped at H6.
fn bump_heading_level(level: u8) -> usize {
    (level as usize + 2).min(6)
}

#[derive(Default)]
struct MarkdownRenderer {
    out: String,
}

impl MarkdownRenderer {
    fn inlines(&self, content: &[Inline]) -> String {
        let mut line = String::new();
        for inline in content {
            match inline {
                Inline::Text { text, marks, link } => {
                    let mut body = if marks.code {
                        format!("`{}`", text)
                    } else {
                        text.clone()
                    };
                    for (on, open, close) in [
                        (marks.strike, "~~", "~~"),
                        (marks.underline, "<u>", "</u>"),
                        (marks.italic, "*", "*"),
                        (marks.bold, "**", "**"),
                    ] {
                        if on {
                            body = wrap_trimmed(&body, open, close);
                        }
                    }
                    if let Some(href) = link {
                        body = format!("[{}]({})", body, href);
                    }
                    line.push_str(&body);
                }
                Inline::Embed { kind, value } if kind == "image" => {
                    line.push_str(&format!("![]({})", value));
                }
                Inline::Embed { .. } => line.push_str(inline.text()),
            }
        }
        line
    }
}

/// Wraps the non-whitespace core of `s`, leaving edge whitespace outside the
/// markers (`** bold **` is not emphasis in markdown).
fn wrap_trimmed(s: &str, open: &str, close: &str) -> String {
    let core = s.trim();
    if core.is_empty() {
        return s.to_string();
    }
    let start = s.len() - s.trim_start().len();
    let end = start + core.len();
    format!("{}{}{}{}{}", &s[..start], open, core, close, &s[end..])
}

impl RichRenderer for MarkdownRenderer {
    fn paragraph(&mut self, content: &[Inline]) {
        let line = self.inlines(content);
        self.out.push_str(&line);
        self.out.push_str("\n\n");
    }

    fn heading(&mut self, level: u8, content: &[Inline]) {
        let line = self.inlines(content);
        self.out.push_str(&"#".repeat(bump_heading_level(level)));
        self.out.push(' ');
        self.out.push_str(&line);
        self.out.push_str("\n\n");
    }

    fn list_item(&mut self, item: &ListItem, ctx: ListContext) {
        let marker = match (ctx.ordered, item.checked) {
            (true, _) => format!("{}.", ctx.number),
            (false, Some(true)) => "- [x]".to_string(),
            (false, Some(false)) => "- [ ]".to_string(),
            (false, None) => "-".to_string(),
        };
        let line = self.inlines(&item.content);
        self.out.push_str(&"  ".repeat(ctx.depth));
        self.out.push_str(&marker);
        self.out.push(' ');
        self.out.push_str(&line);
        self.out.push('\n');
    }

    fn end_list(&mut self, _ordered: bool, depth: usize) {
        if depth == 0 {
            self.out.push('\n');
        }
    }

    fn blockquote(&mut self, lines: &[Vec<Inline>]) {
        for content in lines {
            let line = self.inlines(content);
            self.out.push_str("> ");
            self.out.push_str(&line);
            self.out.push('\n');
        }
        self.out.push('\n');
    }

    fn code_block(&mut self, lines: &[String]) {
        self.out.push_str("```\n");
        for line in lines {
            self.out.push_str(line);
            self.out.push('\n');
        }
        self.out.push_str("```\n\n");
    }
}
