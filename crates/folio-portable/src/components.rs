//! Custom type renderers and the context they run in.

use folio_content::{AssetError, ImageUrlBuilder, ImageValue};

use crate::image::render_image;
use crate::renderer::escape_html;

/// Everything a renderer needs besides the block itself.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Builds CDN URLs for image assets
    pub images: ImageUrlBuilder,
}

impl RenderContext {
    pub fn new(images: ImageUrlBuilder) -> Self {
        Self { images }
    }
}

/// Errors that can occur while rendering a body.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to resolve image: {0}")]
    Asset(#[from] AssetError),
}

/// Renders an image value. The flag is true for images inside a text block.
pub type ImageRenderer = fn(&ImageValue, bool, &RenderContext) -> Result<String, RenderError>;

/// Renders a block or inline object whose type has no renderer.
pub type UnknownTypeRenderer = fn(&str, bool) -> String;

/// The custom renderers used for a body.
#[derive(Clone, Copy)]
pub struct Components {
    pub image: ImageRenderer,
    pub unknown_type: UnknownTypeRenderer,
}

impl Default for Components {
    fn default() -> Self {
        Self {
            image: render_image,
            unknown_type: render_unknown_type,
        }
    }
}

/// Default fallback: a hidden placeholder naming the type.
pub fn render_unknown_type(type_name: &str, is_inline: bool) -> String {
    tracing::warn!("No renderer for portable text type '{}'", type_name);

    let tag = if is_inline { "span" } else { "div" };
    format!(
        r#"<{tag} style="display:none" data-unknown-type="{}"></{tag}>"#,
        escape_html(type_name)
    )
}
