//! Content backend access for folio.
//!
//! This crate provides the post data model, portable text block types, the
//! HTTP client for the content backend, the queries the site runs, and the
//! image URL builder used to turn asset references into CDN URLs.

pub mod asset;
pub mod blocks;
pub mod client;
pub mod image;
pub mod model;
pub mod queries;

pub use asset::{image_dimensions, parse_asset_id, AssetError, AssetId, Dimensions};
pub use blocks::{Block, Crop, Hotspot, ImageValue, Inline, ListKind, MarkDef, Reference, Span, TextBlock};
pub use client::{
    ClientConfig, ClientError, ClientProvider, ContentClient, Perspective, QueryParams,
    SanityClient,
};
pub use image::{url_for_image, Auto, Fit, ImageUrl, ImageUrlBuilder};
pub use model::{format_date, PagePayload, Post, Slug};
pub use queries::{get_post, get_post_slugs, post_params, POST_BY_SLUG_QUERY, POST_SLUGS_QUERY};
