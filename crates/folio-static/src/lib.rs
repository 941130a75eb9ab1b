//! Page generation for folio blog posts.
//!
//! Fetches posts through a [`folio_content::ClientProvider`], renders them to
//! HTML and tracks every post route in a [`RouteTable`] shared by build-time
//! and request-time generation.

pub mod assets;
pub mod builder;
pub mod generator;
pub mod page;
pub mod paths;
pub mod routes;
pub mod site;
pub mod templates;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use assets::AssetPipeline;
pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
pub use generator::{GenerateError, PageGenerator, PageOutcome};
pub use page::{PageError, PageRenderer, SiteMeta, LIVE_ROUTE_PREFIX};
pub use paths::{enumerate_paths, post_path, slug_from_path, Fallback, StaticPaths, POST_ROUTE_PREFIX};
pub use routes::{RenderedPage, Resolution, RouteState, RouteTable};
pub use site::{page_file, Site, SiteError};
