//! # Rich Content Tree
//!
//! [`RichDocument`] is the structural view of a [`Delta`]: a closed set of block
//! nodes holding inline spans. Every output format that keeps structure
//! (derived HTML, markdown export, Word export) renders from this tree through
//! the single [`walk`] function, supplying its own [`RichRenderer`].
//!
//! ## Building
//!
//! The delta is first cut into lines at each `"\n"` insert; the attributes on
//! that newline decide the line kind. Adjacent lines are then grouped:
//!
//! - `header` lines become [`Block::Heading`] (level clamped to 1..=6)
//! - runs of `list` lines become [`Block::List`], nested by `indent`
//! - runs of `blockquote` lines become one [`Block::BlockQuote`]
//! - runs of `code-block` lines become one [`Block::CodeBlock`]
//! - anything else is a [`Block::Paragraph`]
//!
//! A list run switches to a new sibling list when the kind (ordered vs bullet)
//! changes at the same depth.

use super::delta::{Attributes, Delta, Insert};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RichDocument {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Vec<Inline>),
    Heading { level: u8, content: Vec<Inline> },
    List(List),
    BlockQuote(Vec<Vec<Inline>>),
    CodeBlock(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub content: Vec<Inline>,
    /// `Some` for checklist items.
    pub checked: Option<bool>,
    pub children: Vec<List>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub code: bool,
}

impl Marks {
    fn from_attributes(attrs: &Attributes) -> Self {
        Marks {
            bold: attrs.bold.unwrap_or(false),
            italic: attrs.italic.unwrap_or(false),
            underline: attrs.underline.unwrap_or(false),
            strike: attrs.strike.unwrap_or(false),
            code: attrs.code.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text {
        text: String,
        marks: Marks,
        link: Option<String>,
    },
    Embed {
        kind: String,
        value: String,
    },
}

impl Inline {
    pub fn plain(text: impl Into<String>) -> Self {
        Inline::Text {
            text: text.into(),
            marks: Marks::default(),
            link: None,
        }
    }

    /// Text this span contributes when structure is dropped.
    pub fn text(&self) -> &str {
        match self {
            Inline::Text { text, .. } => text,
            Inline::Embed { kind, value } if kind != "image" && kind != "video" => value,
            Inline::Embed { .. } => "",
        }
    }
}

pub fn flatten_text(content: &[Inline]) -> String {
    content.iter().map(Inline::text).collect()
}

/// Position of a list item handed to [`RichRenderer::list_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListContext {
    pub depth: usize,
    pub ordered: bool,
    /// 1-based position within its list.
    pub number: usize,
}

/// Per-node callbacks driven by [`walk`].
pub trait RichRenderer {
    fn paragraph(&mut self, content: &[Inline]);
    fn heading(&mut self, level: u8, content: &[Inline]);
    fn start_list(&mut self, _ordered: bool, _depth: usize) {}
    fn list_item(&mut self, item: &ListItem, ctx: ListContext);
    /// Called after the item's nested lists have been walked.
    fn end_item(&mut self, _ctx: ListContext) {}
    fn end_list(&mut self, _ordered: bool, _depth: usize) {}
    fn blockquote(&mut self, lines: &[Vec<Inline>]);
    fn code_block(&mut self, lines: &[String]);
}

pub fn walk<R: RichRenderer + ?Sized>(doc: &RichDocument, renderer: &mut R) {
    for block in &doc.blocks {
        match block {
            Block::Paragraph(content) => renderer.paragraph(content),
            Block::Heading { level, content } => renderer.heading(*level, content),
            Block::List(list) => walk_list(list, 0, renderer),
            Block::BlockQuote(lines) => renderer.blockquote(lines),
            Block::CodeBlock(lines) => renderer.code_block(lines),
        }
    }
}

fn walk_list<R: RichRenderer + ?Sized>(list: &List, depth: usize, renderer: &mut R) {
    renderer.start_list(list.ordered, depth);
    for (i, item) in list.items.iter().enumerate() {
        let ctx = ListContext {
            depth,
            ordered: list.ordered,
            number: i + 1,
        };
        renderer.list_item(item, ctx);
        for child in &item.children {
            walk_list(child, depth + 1, renderer);
        }
        renderer.end_item(ctx);
    }
    renderer.end_list(list.ordered, depth);
}

#[derive(Debug, Clone, PartialEq)]
enum LineKind {
    Paragraph,
    Heading(u8),
    List {
        ordered: bool,
        checked: Option<bool>,
        depth: usize,
    },
    Quote,
    Code,
}

#[derive(Debug)]
struct Line {
    kind: LineKind,
    content: Vec<Inline>,
}

impl LineKind {
    fn from_attributes(attrs: &Attributes) -> Self {
        if let Some(level) = attrs.header {
            return LineKind::Heading(level.clamp(1, 6));
        }
        if let Some(list) = attrs.list.as_deref() {
            let depth = attrs.indent.unwrap_or(0) as usize;
            return match list {
                "ordered" => LineKind::List {
                    ordered: true,
                    checked: None,
                    depth,
                },
                "checked" => LineKind::List {
                    ordered: false,
                    checked: Some(true),
                    depth,
                },
                "unchecked" => LineKind::List {
                    ordered: false,
                    checked: Some(false),
                    depth,
                },
                _ => LineKind::List {
                    ordered: false,
                    checked: None,
                    depth,
                },
            };
        }
        if attrs.is_code_block() {
            return LineKind::Code;
        }
        if attrs.blockquote.unwrap_or(false) {
            return LineKind::Quote;
        }
        LineKind::Paragraph
    }
}

impl RichDocument {
    pub fn from_delta(delta: &Delta) -> Self {
        let lines = split_lines(delta);
        RichDocument {
            blocks: group_lines(lines),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

fn split_lines(delta: &Delta) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current: Vec<Inline> = Vec::new();

    for op in &delta.ops {
        match &op.insert {
            Insert::Text(text) => {
                let mut parts = text.split('\n').peekable();
                while let Some(part) = parts.next() {
                    if !part.is_empty() {
                        current.push(Inline::Text {
                            text: part.to_string(),
                            marks: Marks::from_attributes(&op.attributes),
                            link: op.attributes.link.clone(),
                        });
                    }
                    if parts.peek().is_some() {
                        lines.push(Line {
                            kind: LineKind::from_attributes(&op.attributes),
                            content: std::mem::take(&mut current),
                        });
                    }
                }
            }
            Insert::Embed(map) => {
                for (kind, value) in map {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    current.push(Inline::Embed {
                        kind: kind.clone(),
                        value,
                    });
                }
            }
        }
    }

    if !current.is_empty() {
        lines.push(Line {
            kind: LineKind::Paragraph,
            content: current,
        });
    }
    lines
}

fn group_lines(lines: Vec<Line>) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut iter = lines.into_iter().peekable();

    while let Some(line) = iter.next() {
        match line.kind {
            LineKind::Paragraph => blocks.push(Block::Paragraph(line.content)),
            LineKind::Heading(level) => blocks.push(Block::Heading {
                level,
                content: line.content,
            }),
            LineKind::Quote => {
                let mut quoted = vec![line.content];
                while let Some(next) = iter.next_if(|l| l.kind == LineKind::Quote) {
                    quoted.push(next.content);
                }
                blocks.push(Block::BlockQuote(quoted));
            }
            LineKind::Code => {
                let mut code = vec![flatten_text(&line.content)];
                while let Some(next) = iter.next_if(|l| l.kind == LineKind::Code) {
                    code.push(flatten_text(&next.content));
                }
                blocks.push(Block::CodeBlock(code));
            }
            LineKind::List { .. } => {
                let mut run = vec![line];
                while let Some(next) = iter.next_if(|l| matches!(l.kind, LineKind::List { .. })) {
                    run.push(next);
                }
                let mut pos = 0;
                while pos < run.len() {
                    let depth = list_depth(&run[pos]);
                    blocks.push(Block::List(parse_list(&mut run, &mut pos, depth)));
                }
            }
        }
    }
    blocks
}

fn list_depth(line: &Line) -> usize {
    match line.kind {
        LineKind::List { depth, .. } => depth,
        _ => 0,
    }
}

/// Consumes list lines starting at `pos` that belong to one list at `depth`.
fn parse_list(run: &mut [Line], pos: &mut usize, depth: usize) -> List {
    let ordered = matches!(run[*pos].kind, LineKind::List { ordered: true, .. });
    let mut list = List {
        ordered,
        items: Vec::new(),
    };

    while *pos < run.len() {
        let LineKind::List {
            ordered: line_ordered,
            checked,
            depth: line_depth,
        } = run[*pos].kind
        else {
            break;
        };

        if line_depth < depth || (line_depth == depth && line_ordered != ordered) {
            break;
        }

        if line_depth == depth {
            list.items.push(ListItem {
                content: std::mem::take(&mut run[*pos].content),
                checked,
                children: Vec::new(),
            });
            *pos += 1;
        } else {
            let child = parse_list(run, pos, line_depth);
            if list.items.is_empty() {
                list.items.push(ListItem {
                    content: Vec::new(),
                    checked: None,
                    children: Vec::new(),
                });
            }
            if let Some(last) = list.items.last_mut() {
                last.children.push(child);
            }
        }
    }
    list
}
