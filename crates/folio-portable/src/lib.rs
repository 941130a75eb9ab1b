//! Portable text to HTML rendering.
//!
//! Body blocks are rendered in order by dispatching on the closed
//! [`folio_content::Block`] set. Custom types go through [`Components`], which
//! carries the image renderer and the fallback for unregistered types.

pub mod components;
pub mod image;
pub mod renderer;

pub use components::{Components, ImageRenderer, RenderContext, RenderError, UnknownTypeRenderer};
pub use image::{render_image, BLOCK_IMAGE_WIDTH, INLINE_IMAGE_WIDTH};
pub use renderer::{escape_html, render, render_block};
