//! Operation-list representation of rich text.
//!
//! A [`Delta`] is a flat list of inserts. Inline formats (`bold`, `link`, ...)
//! sit on text inserts; block formats (`header`, `list`, `blockquote`, ...) sit
//! on the `"\n"` that terminates a line. Non-string inserts are embeds such as
//! `{"image": "https://..."}`.
//!
//! Only insert operations are meaningful for stored content. A delta that does
//! not parse is not fatal: [`deserialize_lenient`] turns it into `None` so the
//! section falls back to its derived html/text.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub ops: Vec<DeltaOp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaOp {
    pub insert: Insert,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Insert {
    Text(String),
    Embed(Map<String, Value>),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strike: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<u8>,
    /// `ordered`, `bullet`, `checked` or `unchecked`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockquote: Option<bool>,
    /// `true` or a language name.
    #[serde(
        rename = "code-block",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub code_block: Option<Value>,
    /// Formats we carry but do not interpret (color, font, align...).
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Attributes {
    pub fn is_empty(&self) -> bool {
        *self == Attributes::default()
    }

    pub fn header(level: u8) -> Self {
        Attributes {
            header: Some(level),
            ..Default::default()
        }
    }

    pub fn list(kind: &str, indent: u8) -> Self {
        Attributes {
            list: Some(kind.to_string()),
            indent: (indent > 0).then_some(indent),
            ..Default::default()
        }
    }

    pub fn blockquote() -> Self {
        Attributes {
            blockquote: Some(true),
            ..Default::default()
        }
    }

    pub fn code_block() -> Self {
        Attributes {
            code_block: Some(Value::Bool(true)),
            ..Default::default()
        }
    }

    pub fn bold() -> Self {
        Attributes {
            bold: Some(true),
            ..Default::default()
        }
    }

    pub fn italic() -> Self {
        Attributes {
            italic: Some(true),
            ..Default::default()
        }
    }

    pub fn link(href: &str) -> Self {
        Attributes {
            link: Some(href.to_string()),
            ..Default::default()
        }
    }

    /// True when the `code-block` format is present and not `false`.
    pub fn is_code_block(&self) -> bool {
        !matches!(self.code_block, None | Some(Value::Bool(false)) | Some(Value::Null))
    }
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    /// A delta holding `text` as unformatted lines. Always ends with a newline.
    pub fn from_plain_text(text: &str) -> Self {
        let mut body = text.to_string();
        if !body.ends_with('\n') {
            body.push('\n');
        }
        Delta::new().insert(body)
    }

    pub fn insert(self, text: impl Into<String>) -> Self {
        self.insert_with(text, Attributes::default())
    }

    pub fn insert_with(mut self, text: impl Into<String>, attributes: Attributes) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.ops.push(DeltaOp {
                insert: Insert::Text(text),
                attributes,
            });
        }
        self
    }

    /// Terminates the current line with the given block format.
    pub fn line(self, attributes: Attributes) -> Self {
        self.insert_with("\n", attributes)
    }

    pub fn embed(mut self, kind: &str, value: Value) -> Self {
        let mut map = Map::new();
        map.insert(kind.to_string(), value);
        self.ops.push(DeltaOp {
            insert: Insert::Embed(map),
            attributes: Attributes::default(),
        });
        self
    }

    /// Concatenated text inserts; embeds contribute nothing.
    pub fn plain_text(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match &op.insert {
                Insert::Text(text) => Some(text.as_str()),
                Insert::Embed(_) => None,
            })
            .collect()
    }

    pub fn is_blank(&self) -> bool {
        self.plain_text().trim().is_empty()
            && !self.ops.iter().any(|op| matches!(op.insert, Insert::Embed(_)))
    }
}

/// Deserializes an optional delta, mapping anything unparseable to `None`.
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<Delta>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match serde_json::from_value::<Delta>(value) {
            Ok(delta) => Ok(Some(delta)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable delta: {}", e);
                Ok(None)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_quill_ops() {
        let raw = json!({"ops": [
            {"insert": "Goals", "attributes": {"bold": true}},
            {"insert": "\n", "attributes": {"header": 2}},
            {"insert": "ship it"},
            {"insert": "\n", "attributes": {"list": "bullet", "indent": 1}},
            {"insert": {"image": "https://example.com/a.png"}},
            {"insert": "\n", "attributes": {"code-block": "rust", "color": "#ff0000"}}
        ]});
        let delta: Delta = serde_json::from_value(raw).unwrap();
        assert_eq!(delta.ops.len(), 6);
        assert_eq!(delta.ops[0].attributes.bold, Some(true));
        assert_eq!(delta.ops[1].attributes.header, Some(2));
        assert_eq!(delta.ops[3].attributes.indent, Some(1));
        assert!(matches!(delta.ops[4].insert, Insert::Embed(_)));
        assert!(delta.ops[5].attributes.is_code_block());
        assert_eq!(delta.ops[5].attributes.other["color"], json!("#ff0000"));
    }

    #[test]
    fn test_plain_text_skips_embeds() {
        let delta = Delta::new()
            .insert("Hello ")
            .embed("image", json!("x.png"))
            .insert_with("world", Attributes::bold())
            .line(Attributes::default());
        assert_eq!(delta.plain_text(), "Hello world\n");
    }

    #[test]
    fn test_empty_attributes_are_not_serialized() {
        let delta = Delta::from_plain_text("hi");
        let value = serde_json::to_value(&delta).unwrap();
        assert_eq!(value, json!({"ops": [{"insert": "hi\n"}]}));
    }

    #[test]
    fn test_editor_baseline_is_blank() {
        assert!(Delta::from_plain_text("").is_blank());
        assert!(Delta::from_plain_text("  \n").is_blank());
        assert!(!Delta::from_plain_text("x").is_blank());
    }

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "deserialize_lenient")]
        delta: Option<Delta>,
    }

    #[test]
    fn test_lenient_deserialization_drops_garbage() {
        let ok: Holder = serde_json::from_value(json!({"delta": {"ops": []}})).unwrap();
        assert!(ok.delta.is_some());
        let bad: Holder = serde_json::from_value(json!({"delta": {"ops": [{"retain": 3}]}})).unwrap();
        assert!(bad.delta.is_none());
        let missing: Holder = serde_json::from_value(json!({})).unwrap();
        assert!(missing.delta.is_none());
    }
}
