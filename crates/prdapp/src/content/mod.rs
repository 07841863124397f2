//! # Section Content
//!
//! Every section is stored in one of two shapes, kept apart by [`SectionContent`]:
//!
//! - **Legacy**: a bare JSON string. Documents created before rich editing, and
//!   every freshly created document, use this shape.
//! - **Rich**: `{html, text, delta}`. The [`Delta`] is authoritative; `html` and
//!   `text` are derived from it and exist so that readers without a delta
//!   parser still get something useful.
//!
//! The two shapes are told apart structurally (serde untagged), never by a
//! version flag.
//!
//! ## Writing
//!
//! Rich content is only ever built through [`SectionContent::from_delta`], which
//! regenerates `html` and `text` from the delta in one step. Writing a delta
//! without its derived fields would leave a section that renders differently
//! depending on which field a reader looks at.
//!
//! ## Reading
//!
//! [`SectionContent::source`] reports the best available representation, in
//! preference order: delta, html, plain text. A delta that fails to parse is
//! dropped at load time (see [`delta::deserialize_lenient`]) and the section
//! degrades to its html/text.
//!
//! ## Completion
//!
//! A section is complete when its plain text has non-whitespace content. The
//! editor's empty state is a single `"\n"`, which counts as empty.

pub mod delta;
pub mod html;
pub mod markdown;
pub mod tree;

pub use delta::{Attributes, Delta, DeltaOp, Insert};
pub use markdown::markdown_to_delta;
pub use tree::{
    flatten_text, walk, Block, Inline, List, ListContext, ListItem, Marks, RichDocument,
    RichRenderer,
};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionContent {
    Legacy(String),
    Rich(RichContent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichContent {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub text: String,
    #[serde(
        default,
        deserialize_with = "delta::deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub delta: Option<Delta>,
}

/// The representation a section is loaded from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadSource<'a> {
    Delta(&'a Delta),
    Html(&'a str),
    Text(&'a str),
}

impl Default for SectionContent {
    fn default() -> Self {
        SectionContent::Legacy(String::new())
    }
}

impl SectionContent {
    /// Rich content with `html` and `text` regenerated from `delta`.
    pub fn from_delta(delta: Delta) -> Self {
        let tree = RichDocument::from_delta(&delta);
        SectionContent::Rich(RichContent {
            html: html::to_html(&tree),
            text: delta.plain_text(),
            delta: Some(delta),
        })
    }

    pub fn from_markdown(source: &str) -> Self {
        Self::from_delta(markdown_to_delta(source))
    }

    pub fn plain_text(&self) -> &str {
        match self {
            SectionContent::Legacy(text) => text,
            SectionContent::Rich(rich) => &rich.text,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.plain_text().trim().is_empty()
    }

    pub fn source(&self) -> LoadSource<'_> {
        match self {
            SectionContent::Legacy(text) => LoadSource::Text(text),
            SectionContent::Rich(RichContent {
                delta: Some(delta), ..
            }) => LoadSource::Delta(delta),
            SectionContent::Rich(rich) if !rich.html.trim().is_empty() => {
                LoadSource::Html(&rich.html)
            }
            SectionContent::Rich(rich) => LoadSource::Text(&rich.text),
        }
    }

    /// Structural view, available only when a delta is stored.
    pub fn rich_tree(&self) -> Option<RichDocument> {
        match self.source() {
            LoadSource::Delta(delta) => Some(RichDocument::from_delta(delta)),
            LoadSource::Html(_) | LoadSource::Text(_) => None,
        }
    }

    /// A delta for editing. Without a stored delta, the plain text becomes
    /// unformatted lines.
    pub fn to_delta(&self) -> Delta {
        match self.source() {
            LoadSource::Delta(delta) => delta.clone(),
            LoadSource::Html(_) | LoadSource::Text(_) => Delta::from_plain_text(self.plain_text()),
        }
    }

    /// Rebuilds derived fields from the delta. Legacy content and rich content
    /// without a delta are returned unchanged.
    pub fn normalized(self) -> Self {
        match self {
            SectionContent::Rich(RichContent {
                delta: Some(delta), ..
            }) => Self::from_delta(delta),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_both_shapes_deserialize() {
        let legacy: SectionContent = serde_json::from_value(json!("hello")).unwrap();
        assert_eq!(legacy, SectionContent::Legacy("hello".into()));

        let rich: SectionContent = serde_json::from_value(json!({
            "html": "<p>hi</p>",
            "text": "hi\n",
            "delta": {"ops": [{"insert": "hi\n"}]}
        }))
        .unwrap();
        assert!(matches!(rich.source(), LoadSource::Delta(_)));
        assert_eq!(rich.plain_text(), "hi\n");
    }

    #[test]
    fn test_broken_delta_degrades_to_html() {
        let rich: SectionContent = serde_json::from_value(json!({
            "html": "<p>hi</p>",
            "text": "hi\n",
            "delta": "not a delta"
        }))
        .unwrap();
        assert_eq!(rich.source(), LoadSource::Html("<p>hi</p>"));
        assert!(rich.rich_tree().is_none());
        assert_eq!(rich.to_delta().plain_text(), "hi\n");
    }

    #[test]
    fn test_legacy_serializes_as_plain_string() {
        let value = serde_json::to_value(SectionContent::default()).unwrap();
        assert_eq!(value, json!(""));
    }

    #[test]
    fn test_from_delta_derives_html_and_text() {
        let delta = Delta::new()
            .insert_with("Risk", Attributes::bold())
            .line(Attributes::default());
        let SectionContent::Rich(rich) = SectionContent::from_delta(delta) else {
            panic!("expected rich content");
        };
        assert_eq!(rich.html, "<p><strong>Risk</strong></p>");
        assert_eq!(rich.text, "Risk\n");
        assert!(rich.delta.is_some());
    }

    #[test]
    fn test_completion_ignores_editor_baseline() {
        assert!(!SectionContent::default().is_complete());
        assert!(!SectionContent::Legacy("   ".into()).is_complete());
        assert!(!SectionContent::from_delta(Delta::from_plain_text("")).is_complete());
        assert!(SectionContent::from_delta(Delta::from_plain_text("x")).is_complete());
        assert!(SectionContent::Legacy("x".into()).is_complete());
    }

    #[test]
    fn test_normalized_repairs_stale_derived_fields() {
        let stale = SectionContent::Rich(RichContent {
            html: "<p>old</p>".into(),
            text: "old\n".into(),
            delta: Some(Delta::from_plain_text("new")),
        });
        assert_eq!(stale.normalized().plain_text(), "new\n");
    }

    #[test]
    fn test_markdown_authoring_produces_rich_content() {
        let content = SectionContent::from_markdown("## Risks\n\n- churn\n");
        let tree = content.rich_tree().unwrap();
        assert_eq!(tree.blocks.len(), 2);
        assert!(content.is_complete());
    }
}
