//! Derived HTML for rich sections, in the markup shape the editor widget emits.

use super::tree::{walk, Inline, ListContext, ListItem, RichDocument, RichRenderer};
use html_escape::{encode_double_quoted_attribute, encode_text};

pub fn to_html(doc: &RichDocument) -> String {
    let mut renderer = HtmlRenderer::default();
    walk(doc, &mut renderer);
    renderer.out
}

#[derive(Default)]
struct HtmlRenderer {
    out: String,
}

impl HtmlRenderer {
    fn inlines(&mut self, content: &[Inline]) {
        if content.is_empty() {
            self.out.push_str("<br>");
            return;
        }
        for inline in content {
            match inline {
                Inline::Text { text, marks, link } => {
                    let mut open = String::new();
                    let mut close = Vec::new();
                    if let Some(href) = link {
                        open.push_str(&format!(
                            "<a href=\"{}\" rel=\"noopener noreferrer\" target=\"_blank\">",
                            encode_double_quoted_attribute(href)
                        ));
                        close.push("</a>");
                    }
                    for (on, start, end) in [
                        (marks.bold, "<strong>", "</strong>"),
                        (marks.italic, "<em>", "</em>"),
                        (marks.underline, "<u>", "</u>"),
                        (marks.strike, "<s>", "</s>"),
                        (marks.code, "<code>", "</code>"),
                    ] {
                        if on {
                            open.push_str(start);
                            close.push(end);
                        }
                    }
                    self.out.push_str(&open);
                    self.out.push_str(&encode_text(text));
                    for tag in close.iter().rev() {
                        self.out.push_str(tag);
                    }
                }
                Inline::Embed { kind, value } => match kind.as_str() {
                    "image" => self.out.push_str(&format!(
                        "<img src=\"{}\">",
                        encode_double_quoted_attribute(value)
                    )),
                    _ => self.out.push_str(&encode_text(inline.text())),
                },
            }
        }
    }
}

impl RichRenderer for HtmlRenderer {
    fn paragraph(&mut self, content: &[Inline]) {
        self.out.push_str("<p>");
        self.inlines(content);
        self.out.push_str("</p>");
    }

    fn heading(&mut self, level: u8, content: &[Inline]) {
        self.out.push_str(&format!("<h{}>", level));
        self.inlines(content);
        self.out.push_str(&format!("</h{}>", level));
    }

    fn start_list(&mut self, ordered: bool, _depth: usize) {
        self.out.push_str(if ordered { "<ol>" } else { "<ul>" });
    }

    fn list_item(&mut self, item: &ListItem, _ctx: ListContext) {
        match item.checked {
            Some(checked) => self
                .out
                .push_str(&format!("<li data-checked=\"{}\">", checked)),
            None => self.out.push_str("<li>"),
        }
        self.inlines(&item.content);
    }

    fn end_item(&mut self, _ctx: ListContext) {
        self.out.push_str("</li>");
    }

    fn end_list(&mut self, ordered: bool, _depth: usize) {
        self.out.push_str(if ordered { "</ol>" } else { "</ul>" });
    }

    fn blockquote(&mut self, lines: &[Vec<Inline>]) {
        for line in lines {
            self.out.push_str("<blockquote>");
            self.inlines(line);
            self.out.push_str("</blockquote>");
        }
    }

    fn code_block(&mut self, lines: &[String]) {
        self.out
            .push_str("<pre class=\"ql-syntax\" spellcheck=\"false\">");
        self.out.push_str(&encode_text(&lines.join("\n")));
        self.out.push_str("\n</pre>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::delta::{Attributes, Delta};

    fn html(delta: Delta) -> String {
        to_html(&RichDocument::from_delta(&delta))
    }

    #[test]
    fn test_empty_line_renders_editor_placeholder() {
        assert_eq!(html(Delta::from_plain_text("")), "<p><br></p>");
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(
            html(Delta::from_plain_text("a < b & c")),
            "<p>a &lt; b &amp; c</p>"
        );
    }

    #[test]
    fn test_marks_nest_inside_links() {
        let delta = Delta::new()
            .insert_with(
                "go",
                Attributes {
                    bold: Some(true),
                    link: Some("https://x.test/?a=1&b=2".into()),
                    ..Default::default()
                },
            )
            .line(Attributes::default());
        assert_eq!(
            html(delta),
            "<p><a href=\"https://x.test/?a=1&amp;b=2\" rel=\"noopener noreferrer\" target=\"_blank\"><strong>go</strong></a></p>"
        );
    }

    #[test]
    fn test_nested_list_markup() {
        let delta = Delta::new()
            .insert("a")
            .line(Attributes::list("bullet", 0))
            .insert("b")
            .line(Attributes::list("ordered", 1));
        assert_eq!(html(delta), "<ul><li>a<ol><li>b</li></ol></li></ul>");
    }

    #[test]
    fn test_headings_quotes_and_code() {
        let delta = Delta::new()
            .insert("H")
            .line(Attributes::header(2))
            .insert("q")
            .line(Attributes::blockquote())
            .insert("x < 1")
            .line(Attributes::code_block());
        assert_eq!(
            html(delta),
            "<h2>H</h2><blockquote>q</blockquote><pre class=\"ql-syntax\" spellcheck=\"false\">x &lt; 1\n</pre>"
        );
    }
}
