//! Page rendering from payloads.

use folio_content::{format_date, url_for_image, AssetError, ImageUrlBuilder, PagePayload, Post};
use folio_portable::{render, Components, RenderContext, RenderError};

use crate::templates::{Cover, PostContext, TemplateEngine};

/// Rendered size of the cover image.
pub const COVER_WIDTH: u32 = 367;
pub const COVER_HEIGHT: u32 = 231;

/// Path prefix of the live update socket.
pub const LIVE_ROUTE_PREFIX: &str = "__live/post/";

/// Site-wide settings shared by every page.
#[derive(Debug, Clone)]
pub struct SiteMeta {
    pub title: String,
    pub base_url: String,
    /// Extra stylesheets, as URLs
    pub styles: Vec<String>,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            base_url: "/".to_string(),
            styles: vec![],
        }
    }
}

/// Errors that can occur while rendering a page.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Failed to render body: {0}")]
    Body(#[from] RenderError),

    #[error("Failed to resolve cover image: {0}")]
    Cover(#[from] AssetError),

    #[error("Failed to render template: {0}")]
    Template(#[from] minijinja::Error),
}

/// Turns page payloads into HTML.
pub struct PageRenderer {
    site: SiteMeta,
    templates: TemplateEngine,
    components: Components,
    ctx: RenderContext,
}

impl PageRenderer {
    pub fn new(site: SiteMeta, images: ImageUrlBuilder) -> Self {
        Self {
            site,
            templates: TemplateEngine::new(),
            components: Components::default(),
            ctx: RenderContext::new(images),
        }
    }

    /// Replace the custom type renderers.
    pub fn with_components(mut self, components: Components) -> Self {
        self.components = components;
        self
    }

    /// Serve pages and assets from `base_url` instead of the configured one.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.site.base_url = base_url.into();
        self
    }

    pub fn site(&self) -> &SiteMeta {
        &self.site
    }

    /// Render a full page. Draft payloads get the live update client.
    pub fn render(&self, payload: &PagePayload) -> Result<String, PageError> {
        let context = self.context(&payload.post, payload.draft_mode)?;
        Ok(self.templates.render_post(&context)?)
    }

    /// Render the post section alone, for live updates.
    pub fn render_section(&self, post: &Post) -> Result<String, PageError> {
        let context = self.context(post, true)?;
        Ok(self.templates.render_post_section(&context)?)
    }

    pub fn render_not_found(&self) -> Result<String, PageError> {
        Ok(self
            .templates
            .render_not_found(&self.site.title, &self.site.base_url)?)
    }

    pub fn render_error(&self) -> Result<String, PageError> {
        Ok(self
            .templates
            .render_error(&self.site.title, &self.site.base_url)?)
    }

    /// Socket path a draft page connects to for updates.
    pub fn live_endpoint(&self, slug: &str) -> String {
        format!("{}{LIVE_ROUTE_PREFIX}{slug}", self.site.base_url)
    }

    fn context(&self, post: &Post, draft_mode: bool) -> Result<PostContext, PageError> {
        let cover = match &post.main_image {
            Some(image) if image.asset.is_some() => Some(Cover {
                src: url_for_image(&self.ctx.images, image).url()?,
                width: COVER_WIDTH,
                height: COVER_HEIGHT,
            }),
            _ => None,
        };

        let body = render(&post.body, &self.components, &self.ctx)?;

        Ok(PostContext {
            title: post.title.clone(),
            site_title: self.site.title.clone(),
            base_url: self.site.base_url.clone(),
            excerpt: post.excerpt.clone(),
            date: format_date(&post.created_at),
            cover,
            body,
            live_endpoint: draft_mode.then(|| self.live_endpoint(post.slug())),
            rev: post.rev.clone(),
            styles: self.site.styles.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::post;
    use folio_content::ImageValue;

    fn renderer() -> PageRenderer {
        PageRenderer::new(SiteMeta::default(), ImageUrlBuilder::new("proj", "production"))
    }

    fn payload(draft_mode: bool) -> PagePayload {
        PagePayload {
            draft_mode,
            token: if draft_mode { "t".to_string() } else { String::new() },
            post: post("hello"),
        }
    }

    #[test]
    fn renders_post_fields() {
        let html = renderer().render(&payload(false)).unwrap();

        assert!(html.contains("Title of hello"));
        assert!(html.contains("Excerpt of Title of hello"));
        assert!(html.contains("<p>Body of Title of hello</p>"));
        assert!(html.contains("October 14, 2026"));
        assert!(html.contains("post__cover--none"));
    }

    #[test]
    fn published_pages_have_no_live_client() {
        let html = renderer().render(&payload(false)).unwrap();
        assert!(!html.contains("live.js"));
    }

    #[test]
    fn draft_pages_have_live_client() {
        let html = renderer().render(&payload(true)).unwrap();
        assert!(html.contains("live.js"));
        assert_eq!(renderer().live_endpoint("hello"), "/__live/post/hello");
    }

    #[test]
    fn renders_cover_with_site_defaults() {
        let mut payload = payload(false);
        payload.post.main_image = Some(ImageValue::from_ref("image-cov-1200x800-jpg"));

        let html = renderer().render(&payload).unwrap();

        assert!(html.contains("cov-1200x800.jpg?fit=max&amp;auto=format"));
        assert!(html.contains(r#"width="367" height="231""#));
    }

    #[test]
    fn cover_without_asset_uses_placeholder() {
        let mut payload = payload(false);
        payload.post.main_image = Some(ImageValue::default());

        let html = renderer().render(&payload).unwrap();

        assert!(html.contains("post__cover--none"));
    }

    #[test]
    fn draft_pages_record_their_revision() {
        let html = renderer().render(&payload(true)).unwrap();
        assert!(html.contains(r#"data-rev="rev-Title of hello""#));
    }

    #[test]
    fn base_url_can_be_replaced() {
        let site = SiteMeta {
            base_url: "https://blog.example/".to_string(),
            ..Default::default()
        };
        let renderer = PageRenderer::new(site, ImageUrlBuilder::new("proj", "production"))
            .with_base_url("/");

        assert_eq!(renderer.live_endpoint("hello"), "/__live/post/hello");
    }

    #[test]
    fn section_is_fragment() {
        let html = renderer().render_section(&post("hello")).unwrap();
        assert!(html.starts_with(r#"<section class="post">"#));
    }
}
