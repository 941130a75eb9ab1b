//! Build-time route enumeration.

use folio_content::{get_post_slugs, ClientError, ClientProvider};

/// URL prefix of post pages.
pub const POST_ROUTE_PREFIX: &str = "/post/";

/// What happens to a route that was not enumerated at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Generate it on first request, then serve the result
    Blocking,
}

/// Routes to pre-render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPaths {
    pub paths: Vec<String>,
    pub fallback: Fallback,
}

impl StaticPaths {
    /// Slugs of the enumerated routes, in order.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().filter_map(|p| slug_from_path(p))
    }
}

/// Route path for a post slug.
pub fn post_path(slug: &str) -> String {
    format!("{POST_ROUTE_PREFIX}{slug}")
}

/// Slug of a post route path.
pub fn slug_from_path(path: &str) -> Option<&str> {
    path.strip_prefix(POST_ROUTE_PREFIX)
}

/// List every known post route, always against published content.
pub async fn enumerate_paths<P: ClientProvider>(provider: &P) -> Result<StaticPaths, ClientError> {
    let client = provider.client(None)?;
    let slugs = get_post_slugs(&client).await?;

    tracing::debug!("Enumerated {} post routes", slugs.len());

    Ok(StaticPaths {
        paths: slugs.iter().map(|slug| post_path(slug)).collect(),
        fallback: Fallback::Blocking,
    })
}
