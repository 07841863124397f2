//! Markdown input for rich sections.
//!
//! Parses CommonMark (plus strikethrough and task lists) with pulldown-cmark
//! and replays the events as delta inserts, so a caller without an editor
//! widget can still author structured content.

use super::delta::{Attributes, Delta};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde_json::Value;

pub fn markdown_to_delta(source: &str) -> Delta {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut builder = DeltaBuilder::default();
    for event in Parser::new_ext(source, options) {
        builder.event(event);
    }
    builder.finish()
}

#[derive(Default)]
struct DeltaBuilder {
    delta: Delta,
    line_open: bool,
    bold: usize,
    italic: usize,
    strike: usize,
    links: Vec<String>,
    heading: Option<u8>,
    quote_depth: usize,
    in_code: bool,
    in_image: bool,
    /// Ordered flag per open list.
    lists: Vec<bool>,
    task: Option<bool>,
}

impl DeltaBuilder {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => self.heading = Some(heading_level(level)),
            Event::End(TagEnd::Heading(_)) => {
                self.end_line();
                self.heading = None;
            }
            Event::Start(Tag::BlockQuote { .. }) => self.quote_depth += 1,
            Event::End(TagEnd::BlockQuote { .. }) => {
                self.quote_depth = self.quote_depth.saturating_sub(1)
            }
            Event::Start(Tag::CodeBlock(_)) => self.in_code = true,
            Event::End(TagEnd::CodeBlock) => self.in_code = false,
            Event::Start(Tag::List(start)) => {
                if self.line_open {
                    self.end_line();
                }
                self.lists.push(start.is_some());
            }
            Event::End(TagEnd::List(_)) => {
                self.lists.pop();
            }
            Event::Start(Tag::Item) => self.task = None,
            Event::End(TagEnd::Item) => {
                if self.line_open {
                    self.end_line();
                }
                self.task = None;
            }
            Event::TaskListMarker(checked) => self.task = Some(checked),
            Event::End(TagEnd::Paragraph) => self.end_line(),
            Event::Start(Tag::Emphasis) => self.italic += 1,
            Event::End(TagEnd::Emphasis) => self.italic = self.italic.saturating_sub(1),
            Event::Start(Tag::Strong) => self.bold += 1,
            Event::End(TagEnd::Strong) => self.bold = self.bold.saturating_sub(1),
            Event::Start(Tag::Strikethrough) => self.strike += 1,
            Event::End(TagEnd::Strikethrough) => self.strike = self.strike.saturating_sub(1),
            Event::Start(Tag::Link { dest_url, .. }) => self.links.push(dest_url.to_string()),
            Event::End(TagEnd::Link) => {
                self.links.pop();
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                self.delta = std::mem::take(&mut self.delta)
                    .embed("image", Value::String(dest_url.to_string()));
                self.line_open = true;
                self.in_image = true;
            }
            Event::End(TagEnd::Image) => self.in_image = false,
            Event::Text(text) if self.in_code => {
                for line in text.lines() {
                    self.push_text(line, Attributes::default());
                    self.end_line();
                }
            }
            Event::Text(text) if !self.in_image => {
                let attrs = self.inline_attributes(false);
                self.push_text(&text, attrs);
            }
            Event::Code(text) => {
                let attrs = self.inline_attributes(true);
                self.push_text(&text, attrs);
            }
            Event::SoftBreak => {
                let attrs = self.inline_attributes(false);
                self.push_text(" ", attrs);
            }
            Event::HardBreak => self.end_line(),
            _ => {}
        }
    }

    fn inline_attributes(&self, code: bool) -> Attributes {
        Attributes {
            bold: (self.bold > 0).then_some(true),
            italic: (self.italic > 0).then_some(true),
            strike: (self.strike > 0).then_some(true),
            code: code.then_some(true),
            link: self.links.last().cloned(),
            ..Default::default()
        }
    }

    fn block_attributes(&self) -> Attributes {
        if self.in_code {
            return Attributes::code_block();
        }
        if let Some(level) = self.heading {
            return Attributes::header(level);
        }
        if let Some(&ordered) = self.lists.last() {
            let kind = match (ordered, self.task) {
                (true, _) => "ordered",
                (false, Some(true)) => "checked",
                (false, Some(false)) => "unchecked",
                (false, None) => "bullet",
            };
            let indent = u8::try_from(self.lists.len() - 1).unwrap_or(u8::MAX);
            return Attributes::list(kind, indent);
        }
        if self.quote_depth > 0 {
            return Attributes::blockquote();
        }
        Attributes::default()
    }

    fn push_text(&mut self, text: &str, attrs: Attributes) {
        if text.is_empty() {
            return;
        }
        self.delta = std::mem::take(&mut self.delta).insert_with(text, attrs);
        self.line_open = true;
    }

    fn end_line(&mut self) {
        let attrs = self.block_attributes();
        self.delta = std::mem::take(&mut self.delta).line(attrs);
        self.line_open = false;
    }

    fn finish(mut self) -> Delta {
        if self.line_open {
            self.end_line();
        }
        if self.delta.ops.is_empty() {
            return Delta::from_plain_text("");
        }
        self.delta
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
