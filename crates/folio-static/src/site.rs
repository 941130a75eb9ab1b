//! The published-site generation pipeline.
//!
//! Build-time and request-time generation both go through [`Site::resolve`],
//! so a route produces the same page whichever path reaches it first.

use std::path::{Path, PathBuf};

use folio_content::ClientProvider;

use crate::generator::{GenerateError, PageGenerator, PageOutcome};
use crate::page::{PageError, PageRenderer};
use crate::paths::POST_ROUTE_PREFIX;
use crate::routes::{RenderedPage, Resolution, RouteTable};

/// Errors that can occur while generating a route.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error("Failed to render page: {0}")]
    Render(#[from] PageError),

    #[error("Failed to write page: {0}")]
    Write(#[from] std::io::Error),
}

/// Generator, renderer and route table for published pages.
pub struct Site<P> {
    generator: PageGenerator<P>,
    renderer: PageRenderer,
    routes: RouteTable,
    output_dir: Option<PathBuf>,
}

impl<P: ClientProvider> Site<P> {
    pub fn new(generator: PageGenerator<P>, renderer: PageRenderer) -> Self {
        Self {
            generator,
            renderer,
            routes: RouteTable::new(),
            output_dir: None,
        }
    }

    /// Also write every generated page under `output_dir`.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    pub fn generator(&self) -> &PageGenerator<P> {
        &self.generator
    }

    pub fn renderer(&self) -> &PageRenderer {
        &self.renderer
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Resolve a post route against published content.
    pub async fn resolve(&self, slug: &str) -> Result<Resolution, SiteError> {
        self.routes
            .resolve(slug, || async {
                let payload = match self.generator.generate(slug, false).await? {
                    PageOutcome::Found(payload) => payload,
                    PageOutcome::NotFound => return Ok(None),
                };

                let html = self.renderer.render(&payload)?;

                if let Some(output_dir) = &self.output_dir {
                    match page_file(output_dir, slug) {
                        Some(path) => {
                            if let Some(parent) = path.parent() {
                                tokio::fs::create_dir_all(parent).await?;
                            }
                            tokio::fs::write(&path, &html).await?;
                            tracing::debug!("Wrote {}", path.display());
                        }
                        None => {
                            tracing::warn!("Not writing page for unsafe slug '{}'", slug);
                        }
                    }
                }

                Ok::<_, SiteError>(Some(RenderedPage {
                    slug: slug.to_string(),
                    html,
                }))
            })
            .await
    }
}

/// File a post page is written to, or `None` if the slug cannot be used as a
/// single path segment.
pub fn page_file(output_dir: &Path, slug: &str) -> Option<PathBuf> {
    if slug.is_empty() || slug == "." || slug == ".." || slug.contains(['/', '\\']) {
        return None;
    }

    Some(
        output_dir
            .join(POST_ROUTE_PREFIX.trim_matches('/'))
            .join(slug)
            .join("index.html"),
    )
}
