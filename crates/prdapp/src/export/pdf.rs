//! PDF export.
//!
//! The PDF is a plain-text rendition on A4: the title and header line
//! centered at the top, then each exported section as a bold heading followed
//! by its derived text, word-wrapped to the 170 mm text column. Formatting is
//! not carried over.
//!
//! Layout and drawing are split. [`layout`] places every line on a page in
//! millimetres from the top-left corner and is what the tests look at; the
//! drawing step only replays those operations through `printpdf`.

use super::{exportable_sections, format_file_size, header_line};
use crate::error::ExportError;
use crate::model::Document;
use unicode_width::UnicodeWidthStr;

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN: f32 = 20.0;
pub const MAX_WIDTH: f32 = 170.0;

const TITLE_SIZE: f32 = 20.0;
const META_SIZE: f32 = 10.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 11.0;
const BODY_START: f32 = 45.0;
const LINE_HEIGHT: f32 = 6.0;
const HEADING_ADVANCE: f32 = 10.0;
const SECTION_GAP: f32 = 5.0;
const ATTACHMENT_INDENT: f32 = 25.0;

/// A heading placed lower than this starts a new page.
const HEADING_LIMIT: f32 = PAGE_HEIGHT - 40.0;
/// A body line placed lower than this starts a new page.
const LINE_LIMIT: f32 = PAGE_HEIGHT - MARGIN;

const PT_TO_MM: f32 = 0.3528;

pub type Rgb = (u8, u8, u8);

pub const HEADING_COLOR: Rgb = (46, 116, 181);
pub const META_COLOR: Rgb = (89, 89, 89);
pub const TEXT_COLOR: Rgb = (0, 0, 0);

#[derive(Debug, Clone, PartialEq)]
pub struct DrawOp {
    /// Left edge, mm from the left of the page.
    pub x: f32,
    /// Baseline, mm from the top of the page.
    pub y: f32,
    pub size: f32,
    pub bold: bool,
    pub color: Rgb,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

/// Approximate rendered width in mm: half an em per terminal column.
pub fn text_width(text: &str, size: f32) -> f32 {
    UnicodeWidthStr::width(text) as f32 * size * 0.5 * PT_TO_MM
}

/// Greedy word wrap. Blank lines are kept; a word wider than the column is
/// broken between characters.
pub fn wrap_text(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut out = Vec::new();
    for raw in text.split('\n') {
        let raw = raw.trim_end_matches('\r');
        if raw.trim().is_empty() {
            out.push(String::new());
            continue;
        }
        let mut line = String::new();
        for word in raw.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };
            if text_width(&candidate, size) <= max_width {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                out.push(std::mem::take(&mut line));
            }
            if text_width(word, size) <= max_width {
                line = word.to_string();
            } else {
                for c in word.chars() {
                    let mut next = line.clone();
                    next.push(c);
                    if !line.is_empty() && text_width(&next, size) > max_width {
                        out.push(std::mem::take(&mut line));
                        line.push(c);
                    } else {
                        line = next;
                    }
                }
            }
        }
        if !line.is_empty() {
            out.push(line);
        }
    }
    out
}

struct Cursor {
    pages: Vec<Page>,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: BODY_START,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = MARGIN;
    }

    fn draw(&mut self, x: f32, y: f32, size: f32, bold: bool, color: Rgb, text: String) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(DrawOp {
                x,
                y,
                size,
                bold,
                color,
                text,
            });
        }
    }

    fn centered(&mut self, y: f32, size: f32, color: Rgb, text: &str) {
        let x = (PAGE_WIDTH - text_width(text, size)) / 2.0;
        self.draw(x.max(0.0), y, size, false, color, text.to_string());
    }

    fn heading(&mut self, title: &str) {
        if self.y > HEADING_LIMIT {
            self.new_page();
        }
        self.draw(MARGIN, self.y, HEADING_SIZE, true, HEADING_COLOR, title.to_string());
        self.y += HEADING_ADVANCE;
    }

    fn line(&mut self, x: f32, text: String) {
        if self.y > LINE_LIMIT {
            self.new_page();
        }
        self.draw(x, self.y, BODY_SIZE, false, TEXT_COLOR, text);
        self.y += LINE_HEIGHT;
    }
}

pub fn layout(doc: &Document) -> Vec<Page> {
    let mut cursor = Cursor::new();
    cursor.centered(MARGIN, TITLE_SIZE, HEADING_COLOR, &doc.name);
    cursor.centered(30.0, META_SIZE, META_COLOR, &header_line(doc));

    for (id, content) in exportable_sections(doc) {
        cursor.heading(id.title());
        for line in wrap_text(content.plain_text(), BODY_SIZE, MAX_WIDTH) {
            cursor.line(MARGIN, line);
        }
        cursor.y += SECTION_GAP;
    }

    if !doc.attachments.is_empty() {
        cursor.heading("Attachments");
        for attachment in &doc.attachments {
            let item = format!(
                "\u{2022} {} ({})",
                attachment.name,
                format_file_size(attachment.size)
            );
            cursor.line(ATTACHMENT_INDENT, item);
        }
    }

    cursor.pages
}

#[cfg(feature = "pdf")]
pub fn render(doc: &Document) -> Result<Vec<u8>, ExportError> {
    use printpdf::{BuiltinFont, Color, Mm, PdfDocument, Rgb as PdfRgb};

    let render_err = |e: printpdf::Error| ExportError::Render {
        format: "pdf",
        message: e.to_string(),
    };

    let pages = layout(doc);
    let (pdf, first_page, first_layer) =
        PdfDocument::new(&doc.name, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = pdf.add_builtin_font(BuiltinFont::Helvetica).map_err(render_err)?;
    let bold = pdf
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(render_err)?;

    for (index, page) in pages.iter().enumerate() {
        let (page_ref, layer_ref) = if index == 0 {
            (first_page, first_layer)
        } else {
            pdf.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1")
        };
        let layer = pdf.get_page(page_ref).get_layer(layer_ref);
        for op in &page.ops {
            let (r, g, b) = op.color;
            layer.set_fill_color(Color::Rgb(PdfRgb::new(
                r as f32 / 255.0,
                g as f32 / 255.0,
                b as f32 / 255.0,
                None,
            )));
            let font = if op.bold { &bold } else { &regular };
            layer.use_text(op.text.clone(), op.size, Mm(op.x), Mm(PAGE_HEIGHT - op.y), font);
        }
    }

    pdf.save_to_bytes().map_err(render_err)
}

#[cfg(not(feature = "pdf"))]
pub fn render(_doc: &Document) -> Result<Vec<u8>, ExportError> {
    Err(ExportError::LibraryUnavailable("pdf"))
}
