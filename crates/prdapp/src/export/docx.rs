//! Word export.
//!
//! The document is laid out for review: every exported section carries an
//! unchecked box in its heading and a block of ruled lines for reviewer
//! comments, and the file ends with a review summary listing all six sections,
//! a sign-off table for the four approving roles and space for overall
//! comments.
//!
//! Rich sections are walked into styled paragraphs. Legacy text is split on
//! blank lines, one paragraph each.

use crate::error::ExportError;
use crate::model::Document;

#[cfg(feature = "docx")]
pub fn render(doc: &Document) -> Result<Vec<u8>, ExportError> {
    writer::render(doc)
}

#[cfg(not(feature = "docx"))]
pub fn render(_doc: &Document) -> Result<Vec<u8>, ExportError> {
    Err(ExportError::LibraryUnavailable("docx"))
}

#[cfg(feature = "docx")]
mod writer {
    use super::super::{exportable_sections, format_file_size, header_line};
    use crate::content::{
        walk, Inline, LoadSource, ListContext, ListItem, RichDocument, RichRenderer,
        SectionContent,
    };
    use crate::error::ExportError;
    use crate::model::{Document, SectionId};
    use docx_rs::{
        AlignmentType, BreakType, Docx, Hyperlink, HyperlinkType, Paragraph, Run, RunFonts,
        Style, StyleType,
    };
    use std::io::Cursor;

    const HEADING_COLOR: &str = "2E74B5";
    const ACCENT_COLOR: &str = "1F4788";
    const MUTED_COLOR: &str = "595959";
    const SYMBOL_FONT: &str = "Arial Unicode MS";
    const CODE_FONT: &str = "Courier New";
    const UNCHECKED: &str = "\u{2610}  ";
    const LIST_INDENT: i32 = 360;
    const SIGNATURE_INDENT: i32 = 720;

    const REVIEW_NOTE: &str = "Please check the box (\u{2610} \u{2192} \u{2611}) next to each \
        section after review and add any comments in the provided space.";
    const REVIEWED_BY: &str = " - Reviewed by: _________________________ Date: _____________";
    const SIGN_OFF: &str = "Name: _________________________ Signature: \
        _________________________ Date: _____________";
    const ROLES: [&str; 4] = [
        "Product Manager",
        "Technical Lead",
        "Project Manager",
        "Stakeholder Representative",
    ];

    pub(super) fn render(doc: &Document) -> Result<Vec<u8>, ExportError> {
        let mut docx = with_styles(Docx::new());

        for paragraph in front_matter(doc) {
            docx = docx.add_paragraph(paragraph);
        }

        for (id, content) in exportable_sections(doc) {
            docx = docx.add_paragraph(section_heading(id.title()));
            for paragraph in section_paragraphs(content) {
                docx = docx.add_paragraph(paragraph);
            }
            for paragraph in comment_block() {
                docx = docx.add_paragraph(paragraph);
            }
        }

        if !doc.attachments.is_empty() {
            docx = docx.add_paragraph(section_heading("Attachments"));
            for attachment in &doc.attachments {
                docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(format!(
                    "\u{2022} {} ({})",
                    attachment.name,
                    format_file_size(attachment.size)
                ))));
            }
            for paragraph in comment_block() {
                docx = docx.add_paragraph(paragraph);
            }
        }

        for paragraph in review_summary(doc) {
            docx = docx.add_paragraph(paragraph);
        }

        let mut buf = Cursor::new(Vec::new());
        docx.build().pack(&mut buf).map_err(|e| ExportError::Render {
            format: "docx",
            message: e.to_string(),
        })?;
        Ok(buf.into_inner())
    }

    fn with_styles(docx: Docx) -> Docx {
        let title = Style::new("Title", StyleType::Paragraph)
            .name("Title")
            .size(40)
            .bold()
            .color(HEADING_COLOR);
        let mut docx = docx.add_style(title);
        for level in 1..=6usize {
            let size = 32usize.saturating_sub((level - 1) * 2).max(22);
            let style = Style::new(format!("Heading{}", level), StyleType::Paragraph)
                .name(format!("Heading {}", level))
                .size(size)
                .bold()
                .color(HEADING_COLOR);
            docx = docx.add_style(style);
        }
        docx
    }

    fn front_matter(doc: &Document) -> Vec<Paragraph> {
        vec![
            Paragraph::new()
                .add_run(Run::new().add_text(&doc.name))
                .style("Title")
                .align(AlignmentType::Center),
            Paragraph::new()
                .add_run(
                    Run::new()
                        .add_text(header_line(doc))
                        .italic()
                        .size(20)
                        .color(MUTED_COLOR),
                )
                .align(AlignmentType::Center),
            Paragraph::new(),
            Paragraph::new()
                .add_run(Run::new().add_text("Review Instructions: ").bold().size(22))
                .add_run(Run::new().add_text(REVIEW_NOTE).italic().color(MUTED_COLOR)),
            Paragraph::new(),
        ]
    }

    fn section_heading(title: &str) -> Paragraph {
        Paragraph::new()
            .add_run(
                Run::new()
                    .add_text(UNCHECKED)
                    .size(32)
                    .fonts(RunFonts::new().ascii(SYMBOL_FONT)),
            )
            .add_run(Run::new().add_text(title).bold().size(28))
            .style("Heading1")
    }

    fn section_paragraphs(content: &SectionContent) -> Vec<Paragraph> {
        match content.source() {
            LoadSource::Delta(delta) => {
                let mut renderer = WordRenderer::default();
                walk(&RichDocument::from_delta(delta), &mut renderer);
                renderer.paragraphs
            }
            LoadSource::Html(_) | LoadSource::Text(_) => legacy_paragraphs(content.plain_text()),
        }
    }

    /// One paragraph per blank-line separated block; single newlines become
    /// line breaks.
    fn legacy_paragraphs(text: &str) -> Vec<Paragraph> {
        text.split("\n\n")
            .filter(|block| !block.trim().is_empty())
            .map(|block| {
                let mut paragraph = Paragraph::new();
                let mut lines = block.lines().peekable();
                while let Some(line) = lines.next() {
                    let mut run = Run::new().add_text(line);
                    if lines.peek().is_some() {
                        run = run.add_break(BreakType::TextWrapping);
                    }
                    paragraph = paragraph.add_run(run);
                }
                paragraph
            })
            .collect()
    }

    fn ruled_line(width: usize) -> String {
        "_".repeat(width)
    }

    fn comment_block() -> Vec<Paragraph> {
        let mut out = vec![Paragraph::new().add_run(
            Run::new()
                .add_text("Reviewer Comments:")
                .bold()
                .italic()
                .size(22)
                .color(ACCENT_COLOR),
        )];
        for _ in 0..4 {
            out.push(
                Paragraph::new()
                    .add_run(Run::new().add_text(ruled_line(77)))
                    .indent(Some(LIST_INDENT), None, None, None),
            );
        }
        out.push(Paragraph::new());
        out
    }

    fn review_summary(doc: &Document) -> Vec<Paragraph> {
        let mut out = vec![
            Paragraph::new(),
            Paragraph::new()
                .add_run(
                    Run::new()
                        .add_text("DOCUMENT REVIEW SUMMARY")
                        .bold()
                        .size(32)
                        .color(ACCENT_COLOR),
                )
                .align(AlignmentType::Center),
            Paragraph::new().add_run(Run::new().add_text("Section Review Status:").bold().size(24)),
        ];

        let mut names: Vec<&str> = SectionId::ALL.iter().map(|id| id.title()).collect();
        if !doc.attachments.is_empty() {
            names.push("Attachments");
        }
        for name in names {
            out.push(
                Paragraph::new()
                    .add_run(
                        Run::new()
                            .add_text(UNCHECKED)
                            .size(24)
                            .fonts(RunFonts::new().ascii(SYMBOL_FONT)),
                    )
                    .add_run(Run::new().add_text(name).size(22))
                    .add_run(Run::new().add_text(REVIEWED_BY).size(20).color(MUTED_COLOR))
                    .indent(Some(LIST_INDENT), None, None, None),
            );
        }

        out.push(Paragraph::new());
        out.push(
            Paragraph::new().add_run(Run::new().add_text("Final Document Approval:").bold().size(24)),
        );
        for role in ROLES {
            out.push(
                Paragraph::new().add_run(Run::new().add_text(format!("{}: ", role)).bold().size(22)),
            );
            out.push(
                Paragraph::new()
                    .add_run(Run::new().add_text(SIGN_OFF).size(20))
                    .indent(Some(SIGNATURE_INDENT), None, None, None),
            );
        }

        out.push(Paragraph::new());
        out.push(
            Paragraph::new().add_run(Run::new().add_text("Overall Review Comments:").bold().size(24)),
        );
        for _ in 0..6 {
            out.push(Paragraph::new().add_run(Run::new().add_text(ruled_line(81))));
        }
        out
    }

    /// Content headings sit one level under the section heading.
    fn heading_style(level: u8) -> String {
        format!("Heading{}", (level as usize + 1).min(6))
    }

    #[derive(Default)]
    struct WordRenderer {
        paragraphs: Vec<Paragraph>,
    }

    fn styled_run(text: &str, inline: &Inline) -> Run {
        let mut run = Run::new().add_text(text);
        if let Inline::Text { marks, link, .. } = inline {
            if marks.bold {
                run = run.bold();
            }
            if marks.italic {
                run = run.italic();
            }
            if marks.underline || link.is_some() {
                run = run.underline("single");
            }
            if marks.strike {
                run = run.strike();
            }
            if marks.code {
                run = run.fonts(RunFonts::new().ascii(CODE_FONT));
            }
            if link.is_some() {
                run = run.color("0563C1");
            }
        }
        run
    }

    fn fill(mut paragraph: Paragraph, content: &[Inline]) -> Paragraph {
        for inline in content {
            let text = inline.text();
            if text.is_empty() {
                continue;
            }
            match inline {
                Inline::Text {
                    link: Some(href), ..
                } => {
                    paragraph = paragraph.add_hyperlink(
                        Hyperlink::new(href, HyperlinkType::External)
                            .add_run(styled_run(text, inline)),
                    );
                }
                _ => paragraph = paragraph.add_run(styled_run(text, inline)),
            }
        }
        paragraph
    }

    impl RichRenderer for WordRenderer {
        fn paragraph(&mut self, content: &[Inline]) {
            self.paragraphs.push(fill(Paragraph::new(), content));
        }

        fn heading(&mut self, level: u8, content: &[Inline]) {
            self.paragraphs
                .push(fill(Paragraph::new(), content).style(&heading_style(level)));
        }

        fn list_item(&mut self, item: &ListItem, ctx: ListContext) {
            let marker = match (ctx.ordered, item.checked) {
                (true, _) => format!("{}. ", ctx.number),
                (false, Some(true)) => "\u{2611} ".to_string(),
                (false, Some(false)) => "\u{2610} ".to_string(),
                (false, None) => "\u{2022} ".to_string(),
            };
            let indent = LIST_INDENT * (ctx.depth as i32 + 1);
            let paragraph = Paragraph::new()
                .add_run(Run::new().add_text(marker))
                .indent(Some(indent), None, None, None);
            self.paragraphs.push(fill(paragraph, &item.content));
        }

        fn blockquote(&mut self, lines: &[Vec<Inline>]) {
            for content in lines {
                let paragraph = Paragraph::new().indent(Some(SIGNATURE_INDENT), None, None, None);
                let mut paragraph = fill(paragraph, content);
                if content.iter().all(|inline| inline.text().is_empty()) {
                    paragraph = paragraph.add_run(Run::new());
                }
                self.paragraphs.push(paragraph);
            }
        }

        fn code_block(&mut self, lines: &[String]) {
            for line in lines {
                self.paragraphs.push(
                    Paragraph::new().add_run(
                        Run::new()
                            .add_text(line)
                            .size(20)
                            .fonts(RunFonts::new().ascii(CODE_FONT)),
                    ),
                );
            }
        }
    }

}

#[cfg(all(test, feature = "docx"))]
mod tests {
    use super::*;
    use crate::attachments::{add_files, MemoryFile};
    use crate::content::{Attributes, Delta, SectionContent};
    use crate::model::SectionId;
    use std::io::{Cursor, Read};

    fn document_xml(bytes: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn test_render_produces_review_layout() {
        let mut doc = Document::new("Checkout Revamp");
        doc.set_section(
            SectionId::ExecutiveSummary,
            SectionContent::Legacy("Faster checkout.\n\nFewer steps.".into()),
        );
        let file = MemoryFile::new("flow.pdf", vec![1; 2048]);
        add_files(&mut doc, &[&file], |_, _, _| {});

        let bytes = render(&doc).unwrap();
        assert_eq!(&bytes[..2], b"PK");

        let xml = document_xml(&bytes);
        assert!(xml.contains("Checkout Revamp"));
        assert!(xml.contains("Review Instructions: "));
        assert!(xml.contains("Faster checkout."));
        assert!(xml.contains("Fewer steps."));
        assert!(xml.contains("Reviewer Comments:"));
        assert!(xml.contains("flow.pdf (2 KB)"));
        assert!(xml.contains("DOCUMENT REVIEW SUMMARY"));
        assert!(xml.contains("Stakeholder Representative: "));
        assert!(xml.contains("Overall Review Comments:"));
        // Summary lists every section, exported or not.
        assert!(xml.contains("Non-functional Requirements"));
        assert!(xml.contains(&"_".repeat(81)));
    }

    #[test]
    fn test_rich_sections_keep_structure() {
        let mut doc = Document::new("Rich");
        let delta = Delta::new()
            .insert("Scope")
            .line(Attributes::header(1))
            .insert("see ")
            .insert_with("docs", Attributes::link("https://d.test"))
            .line(Attributes::default())
            .insert("step")
            .line(Attributes::list("ordered", 0));
        doc.set_section(SectionId::TechnicalSpecifications, SectionContent::from_delta(delta));

        let xml = document_xml(&render(&doc).unwrap());
        assert!(xml.contains("Heading2"));
        assert!(xml.contains("Scope"));
        assert!(xml.contains("w:hyperlink"));
        assert!(xml.contains("1. "));
        assert!(!xml.contains("Attachments"));
    }
}
