//! Post documents and page payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::blocks::{Block, ImageValue};

/// URL key of a post, stored by the backend as `{ "current": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slug {
    pub current: String,
}

impl Slug {
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            current: current.into(),
        }
    }
}

/// A blog post document as returned by the by-slug query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,

    /// Revision id, changes on every edit
    #[serde(rename = "_rev", default, deserialize_with = "null_as_default")]
    pub rev: String,

    /// Unique URL key
    pub slug: Slug,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub excerpt: String,

    /// Creation timestamp
    #[serde(rename = "_createdAt")]
    pub created_at: DateTime<Utc>,

    /// Cover image
    #[serde(rename = "mainImage", default, skip_serializing_if = "Option::is_none")]
    pub main_image: Option<ImageValue>,

    /// Portable text body
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Vec<Block>,
}

impl Post {
    /// The slug string this post is routed under.
    pub fn slug(&self) -> &str {
        &self.slug.current
    }
}

/// Props handed to the page shell for one render.
///
/// `token` is empty unless `draft_mode` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePayload {
    pub draft_mode: bool,
    pub token: String,
    pub post: Post,
}

/// Format a timestamp as a long US English date, e.g. "October 14, 2026".
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
