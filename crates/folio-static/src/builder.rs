//! Static site builder.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use folio_content::{ClientError, ClientProvider};

use crate::assets::AssetPipeline;
use crate::generator::PageGenerator;
use crate::page::{PageError, PageRenderer};
use crate::paths::{enumerate_paths, post_path};
use crate::routes::Resolution;
use crate::site::{Site, SiteError};

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Output directory
    pub output_dir: PathBuf,

    /// Minify CSS output
    pub minify: bool,

    /// Routes generated at the same time
    pub concurrency: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dist"),
            minify: true,
            concurrency: 8,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated
    pub pages: usize,

    /// Enumerated routes whose post was gone by generation time
    pub not_found: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to enumerate post routes: {0}")]
    Enumerate(#[from] ClientError),

    #[error("Failed to generate {path} ({failed} route(s) failed): {source}")]
    Route {
        path: String,
        failed: usize,
        #[source]
        source: SiteError,
    },

    #[error("Failed to render page: {0}")]
    Render(#[from] PageError),

    #[error("Failed to write output: {0}")]
    Write(#[from] std::io::Error),

    #[error("Build task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Static site builder.
pub struct StaticBuilder<P> {
    config: BuildConfig,
    site: Arc<Site<P>>,
}

impl<P: ClientProvider + 'static> StaticBuilder<P> {
    /// Create a new static builder writing pages under the configured output.
    pub fn new(config: BuildConfig, generator: PageGenerator<P>, renderer: PageRenderer) -> Self {
        let site = Site::new(generator, renderer).with_output_dir(&config.output_dir);

        Self {
            config,
            site: Arc::new(site),
        }
    }

    /// The site the builder generates into. Its route table holds every
    /// route from the last build.
    pub fn site(&self) -> &Arc<Site<P>> {
        &self.site
    }

    /// Build the static site.
    ///
    /// Routes are enumerated first, then each enumerated route is generated
    /// through the route table. Every route is attempted before a failure is
    /// reported.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        let paths = enumerate_paths(self.site.generator().provider()).await?;
        let slugs: Vec<String> = paths.slugs().map(str::to_string).collect();
        self.site.routes().enumerate(slugs.iter().cloned());

        tracing::info!("Generating {} post routes", slugs.len());

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for slug in slugs {
            let site = Arc::clone(&self.site);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let result = site.resolve(&slug).await;
                (slug, result)
            });
        }

        let mut pages = 0;
        let mut not_found = 0;
        let mut failures = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            let (slug, result) = joined?;

            match result {
                Ok(Resolution::Page(_)) => pages += 1,
                Ok(Resolution::NotFound) => {
                    tracing::warn!("Post '{}' was removed after enumeration, skipping", slug);
                    not_found += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to generate {}: {}", post_path(&slug), e);
                    failures.push((slug, e));
                }
            }
        }

        failures.sort_by(|a, b| a.0.cmp(&b.0));
        let failed = failures.len();
        if let Some((slug, source)) = failures.into_iter().next() {
            return Err(BuildError::Route {
                path: post_path(&slug),
                failed,
                source,
            });
        }

        self.generate_not_found().await?;
        self.generate_assets().await?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages,
            not_found,
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    async fn generate_not_found(&self) -> Result<(), BuildError> {
        let html = self.site.renderer().render_not_found()?;
        tokio::fs::write(self.config.output_dir.join("404.html"), html).await?;
        Ok(())
    }

    async fn generate_assets(&self) -> Result<(), BuildError> {
        let assets_dir = self.config.output_dir.join("assets");
        tokio::fs::create_dir_all(&assets_dir).await?;

        let css = AssetPipeline::generate_css();
        let css = if self.config.minify {
            match AssetPipeline::minify_css(&css) {
                Ok(minified) => minified,
                Err(e) => {
                    tracing::warn!("{}, writing unminified CSS", e);
                    css
                }
            }
        } else {
            css
        };
        tokio::fs::write(assets_dir.join("main.css"), css).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::SiteMeta;
    use crate::routes::RouteState;
    use crate::testing::{post, MemoryProvider};
    use folio_content::ImageUrlBuilder;
    use std::fs;
    use tempfile::tempdir;

    fn builder(provider: MemoryProvider, output_dir: PathBuf) -> StaticBuilder<MemoryProvider> {
        StaticBuilder::new(
            BuildConfig {
                output_dir,
                concurrency: 2,
                ..Default::default()
            },
            PageGenerator::new(provider, None),
            PageRenderer::new(SiteMeta::default(), ImageUrlBuilder::new("proj", "production")),
        )
    }

    #[tokio::test]
    async fn builds_every_enumerated_post() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("dist");
        let provider = MemoryProvider::with_posts(vec![post("one"), post("two"), post("three")]);

        let result = builder(provider, out.clone()).build().await.unwrap();

        assert_eq!(result.pages, 3);
        assert_eq!(result.not_found, 0);
        for slug in ["one", "two", "three"] {
            let html = fs::read_to_string(out.join("post").join(slug).join("index.html")).unwrap();
            assert!(html.contains(&format!("Title of {slug}")));
        }
        assert!(out.join("404.html").exists());
        assert!(out.join("assets/main.css").exists());
    }

    #[tokio::test]
    async fn builds_empty_site() {
        let temp = tempdir().unwrap();

        let result = builder(MemoryProvider::default(), temp.path().to_path_buf())
            .build()
            .await
            .unwrap();

        assert_eq!(result.pages, 0);
        assert!(temp.path().join("404.html").exists());
    }

    #[tokio::test]
    async fn build_uses_published_content_only() {
        let temp = tempdir().unwrap();
        let provider = MemoryProvider::with_posts(vec![post("a")]);

        builder(provider.clone(), temp.path().to_path_buf())
            .build()
            .await
            .unwrap();

        assert!(provider.tokens_seen().iter().all(Option::is_none));
    }

    #[tokio::test]
    async fn removed_posts_are_skipped() {
        let temp = tempdir().unwrap();
        let provider = MemoryProvider::with_posts(vec![post("kept")]);
        provider.enumerate_only("deleted");

        let builder = builder(provider, temp.path().to_path_buf());
        let result = builder.build().await.unwrap();

        assert_eq!(result.pages, 1);
        assert_eq!(result.not_found, 1);
        assert_eq!(builder.site().routes().state("deleted"), Some(RouteState::NotFound));
        assert!(!temp.path().join("post/deleted/index.html").exists());
    }

    #[tokio::test]
    async fn failed_route_fails_build_by_name() {
        let temp = tempdir().unwrap();
        let provider = MemoryProvider::with_posts(vec![post("good"), post("bad")]);
        provider.break_slug("bad");

        let builder = builder(provider, temp.path().to_path_buf());
        let err = builder.build().await.unwrap_err();

        match err {
            BuildError::Route { path, failed, .. } => {
                assert_eq!(path, "/post/bad");
                assert_eq!(failed, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(temp.path().join("post/good/index.html").exists());
        assert_eq!(builder.site().routes().state("bad"), Some(RouteState::Enumerated));
    }

    #[tokio::test]
    async fn enumeration_failure_fails_build() {
        let temp = tempdir().unwrap();

        let err = builder(MemoryProvider::failing(), temp.path().to_path_buf())
            .build()
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::Enumerate(_)));
    }

    #[tokio::test]
    async fn writes_unminified_css_when_disabled() {
        let temp = tempdir().unwrap();
        let builder = StaticBuilder::new(
            BuildConfig {
                output_dir: temp.path().to_path_buf(),
                minify: false,
                concurrency: 1,
            },
            PageGenerator::new(MemoryProvider::default(), None),
            PageRenderer::new(SiteMeta::default(), ImageUrlBuilder::new("proj", "production")),
        );

        builder.build().await.unwrap();

        let css = fs::read_to_string(temp.path().join("assets/main.css")).unwrap();
        assert_eq!(css, AssetPipeline::generate_css());
    }
}
