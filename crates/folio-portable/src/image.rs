//! Image block renderer.

use folio_content::{image_dimensions, Auto, Fit, ImageValue};

use crate::components::{RenderContext, RenderError};
use crate::renderer::escape_html;

/// Requested width for images inside running text.
pub const INLINE_IMAGE_WIDTH: u32 = 100;

/// Requested width for standalone images.
pub const BLOCK_IMAGE_WIDTH: u32 = 800;

/// Render an image as a lazily loaded `<img>` that reserves its layout box
/// through `aspect-ratio` before the image arrives.
pub fn render_image(
    value: &ImageValue,
    is_inline: bool,
    ctx: &RenderContext,
) -> Result<String, RenderError> {
    tracing::trace!(inline = is_inline, asset = ?value.asset, "Rendering image");

    let dimensions = image_dimensions(value)?;

    let width = if is_inline {
        INLINE_IMAGE_WIDTH
    } else {
        BLOCK_IMAGE_WIDTH
    };

    let src = ctx
        .images
        .image(value)
        .width(width)
        .fit(Fit::Max)
        .auto(Auto::Format)
        .url()?;

    // Never empty.
    let alt = value.alt.as_deref().filter(|a| !a.is_empty()).unwrap_or(" ");

    let display = if is_inline { "inline-block" } else { "block" };

    Ok(format!(
        r#"<img src="{}" width="100%" height="auto" alt="{}" loading="lazy" style="display:{};aspect-ratio:{}">"#,
        escape_html(&src),
        escape_html(alt),
        display,
        dimensions.aspect_ratio
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_content::ImageUrlBuilder;
    use pretty_assertions::assert_eq;

    fn ctx() -> RenderContext {
        RenderContext::new(ImageUrlBuilder::new("proj", "production"))
    }

    #[test]
    fn renders_block_image() {
        let image = ImageValue {
            alt: Some("A wide chart".to_string()),
            ..ImageValue::from_ref("image-abc-800x400-png")
        };

        let html = render_image(&image, false, &ctx()).unwrap();

        assert_eq!(
            html,
            concat!(
                r#"<img src="https://cdn.sanity.io/images/proj/production/abc-800x400.png?w=800&amp;fit=max&amp;auto=format""#,
                r#" width="100%" height="auto" alt="A wide chart" loading="lazy" style="display:block;aspect-ratio:2">"#
            )
        );
    }

    #[test]
    fn inline_image_is_small_and_flows_with_text() {
        let image = ImageValue::from_ref("image-emoji-64x64-png");

        let html = render_image(&image, true, &ctx()).unwrap();

        assert!(html.contains("?w=100&amp;fit=max&amp;auto=format"));
        assert!(html.contains("display:inline-block;aspect-ratio:1"));
    }

    #[test]
    fn missing_alt_becomes_single_space() {
        let image = ImageValue::from_ref("image-emoji-64x64-png");
        let html = render_image(&image, true, &ctx()).unwrap();
        assert!(html.contains(r#"alt=" ""#));

        let empty_alt = ImageValue {
            alt: Some(String::new()),
            ..ImageValue::from_ref("image-emoji-64x64-png")
        };
        let html = render_image(&empty_alt, false, &ctx()).unwrap();
        assert!(html.contains(r#"alt=" ""#));
    }

    #[test]
    fn fractional_aspect_ratio() {
        let image = ImageValue::from_ref("image-tall-300x400-jpg");
        let html = render_image(&image, false, &ctx()).unwrap();
        assert!(html.contains("aspect-ratio:0.75"));
    }

    #[test]
    fn fails_on_missing_asset() {
        let result = render_image(&ImageValue::default(), false, &ctx());
        assert!(matches!(result, Err(RenderError::Asset(_))));
    }
}
