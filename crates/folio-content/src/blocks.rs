//! Portable text block types.
//!
//! A post body is an ordered list of blocks tagged by `_type`. The set of
//! types the renderer understands is closed: text blocks and images. Anything
//! else is kept as [`Block::Unknown`] with its raw value so it can be handed
//! to a fallback renderer.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A top-level body block.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// A paragraph, heading, quote or list item
    Text(TextBlock),

    /// A standalone image
    Image(ImageValue),

    /// Any other custom type
    Unknown { type_name: String, value: Value },
}

impl Block {
    /// The `_type` tag of this block.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Text(_) => "block",
            Self::Image(_) => "image",
            Self::Unknown { type_name, .. } => type_name,
        }
    }

    fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match type_tag(&value) {
            Some("block") => serde_json::from_value(value).map(Self::Text),
            Some("image") => serde_json::from_value(value).map(Self::Image),
            other => Ok(Self::Unknown {
                type_name: other.unwrap_or_default().to_string(),
                value,
            }),
        }
    }
}

/// A child of a text block.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Span(Span),

    /// An image embedded mid-paragraph
    Image(ImageValue),

    Unknown { type_name: String, value: Value },
}

impl Inline {
    fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match type_tag(&value) {
            Some("span") => serde_json::from_value(value).map(Self::Span),
            Some("image") => serde_json::from_value(value).map(Self::Image),
            other => Ok(Self::Unknown {
                type_name: other.unwrap_or_default().to_string(),
                value,
            }),
        }
    }
}

/// A block of formatted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// "normal", "h1".."h6" or "blockquote"
    #[serde(default = "default_style")]
    pub style: String,

    /// "bullet" or "number" when the block is a list item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_item: Option<String>,

    /// List nesting depth, starting at 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,

    #[serde(default)]
    pub children: Vec<Inline>,

    #[serde(default)]
    pub mark_defs: Vec<MarkDef>,
}

fn default_style() -> String {
    "normal".to_string()
}

impl TextBlock {
    /// List kind, if this block is a list item.
    pub fn list_kind(&self) -> Option<ListKind> {
        self.list_item.as_deref().map(|item| match item {
            "number" => ListKind::Number,
            _ => ListKind::Bullet,
        })
    }

    /// List nesting depth (1 for top-level items).
    pub fn list_level(&self) -> u32 {
        self.level.unwrap_or(1).max(1)
    }
}

/// Kind of list a text block belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Number,
}

/// A run of text with decorator and annotation marks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default)]
    pub text: String,

    /// Decorator names ("strong", "em", ...) or keys into `mark_defs`
    #[serde(default)]
    pub marks: Vec<String>,
}

/// An annotation definition referenced from span marks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,

    #[serde(rename = "_type")]
    pub kind: String,

    /// Target of a link annotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// An image value: asset reference plus crop and hotspot metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageValue {
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<Reference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<Crop>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotspot: Option<Hotspot>,
}

impl ImageValue {
    /// Image with just an asset reference.
    pub fn from_ref(reference: impl Into<String>) -> Self {
        Self {
            asset: Some(Reference {
                reference: reference.into(),
            }),
            ..Default::default()
        }
    }
}

/// Reference to an asset document. Expanded assets carry `_id` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_ref", alias = "_id")]
    pub reference: String,
}

/// Fractions trimmed from each edge of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Crop {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub right: f64,
}

impl Crop {
    pub fn is_empty(&self) -> bool {
        self.top == 0.0 && self.bottom == 0.0 && self.left == 0.0 && self.right == 0.0
    }
}

/// Focal area of an image, as fractions of its size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub x: f64,
    pub y: f64,
    pub height: f64,
    pub width: f64,
}

fn type_tag(value: &Value) -> Option<&str> {
    value.get("_type").and_then(Value::as_str)
}

#[derive(Serialize)]
struct Tagged<'a, T> {
    #[serde(rename = "_type")]
    kind: &'a str,
    #[serde(flatten)]
    inner: &'a T,
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(block) => Tagged {
                kind: "block",
                inner: block,
            }
            .serialize(serializer),
            Self::Image(image) => Tagged {
                kind: "image",
                inner: image,
            }
            .serialize(serializer),
            Self::Unknown { value, .. } => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}

impl Serialize for Inline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Span(span) => Tagged {
                kind: "span",
                inner: span,
            }
            .serialize(serializer),
            Self::Image(image) => Tagged {
                kind: "image",
                inner: image,
            }
            .serialize(serializer),
            Self::Unknown { value, .. } => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Inline {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}
