//! Published site server.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Path as RoutePath, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::services::{ServeDir, ServeFile};
use walkdir::WalkDir;

use folio_content::ClientProvider;
use folio_static::{PageRenderer, RenderedPage, Resolution, Site};

/// Configuration for the site and preview servers.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Built site served for everything but post routes
    pub output_dir: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dist"),
            port: 7777,
            host: "127.0.0.1".to_string(),
            open: false,
        }
    }
}

impl ServerConfig {
    pub(crate) fn addr(&self) -> Result<SocketAddr, ServerError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ServerError::InvalidAddress(addr))
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("Draft preview requires a read token (set SANITY_API_READ_TOKEN)")]
    MissingReadToken,
}

/// Serves published post pages with blocking fallback.
pub struct SiteServer<P> {
    config: ServerConfig,
    site: Arc<Site<P>>,
}

impl<P: ClientProvider + 'static> SiteServer<P> {
    /// Create a server for `site`. Pages generated on request are written
    /// wherever the site writes them.
    pub fn new(config: ServerConfig, site: Arc<Site<P>>) -> Self {
        Self { config, site }
    }

    pub fn site(&self) -> &Arc<Site<P>> {
        &self.site
    }

    /// Mark every page already built under the output directory as generated.
    pub fn seed(&self) -> usize {
        let pages = read_snapshots(&self.config.output_dir);
        let count = pages.len();

        for page in pages {
            self.site.routes().seed(page);
        }

        tracing::debug!("Seeded {} routes from {}", count, self.config.output_dir.display());
        count
    }

    pub fn router(&self) -> Router {
        let dir = &self.config.output_dir;
        let files = ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("404.html")));

        Router::new()
            .route("/post/{slug}", get(post_handler::<P>))
            .fallback_service(files)
            .with_state(Arc::clone(&self.site))
    }

    /// Start the server.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr = self.config.addr()?;
        let seeded = self.seed();
        let app = self.router();

        tracing::info!("Serving {} built posts at http://{}", seeded, addr);

        if self.config.open {
            let _ = open::that(format!("http://{}", addr));
        }

        serve(addr, app).await
    }
}

pub(crate) async fn serve(addr: SocketAddr, app: Router) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

    Ok(())
}

/// Pages under `<output>/post/<slug>/index.html`.
fn read_snapshots(output_dir: &Path) -> Vec<RenderedPage> {
    let posts_dir = output_dir.join("post");
    if !posts_dir.is_dir() {
        return vec![];
    }

    WalkDir::new(&posts_dir)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == "index.html")
        .filter_map(|entry| {
            let slug = entry.path().parent()?.file_name()?.to_str()?.to_string();
            match std::fs::read_to_string(entry.path()) {
                Ok(html) => Some(RenderedPage { slug, html }),
                Err(e) => {
                    tracing::warn!("Skipping snapshot {}: {}", entry.path().display(), e);
                    None
                }
            }
        })
        .collect()
}

async fn post_handler<P: ClientProvider + 'static>(
    State(site): State<Arc<Site<P>>>,
    RoutePath(slug): RoutePath<String>,
) -> Response {
    match site.resolve(&slug).await {
        Ok(Resolution::Page(page)) => Html(page.html.clone()).into_response(),
        Ok(Resolution::NotFound) => not_found(site.renderer()),
        Err(e) => {
            tracing::warn!("Failed to generate /post/{}: {}", slug, e);
            internal_error(site.renderer())
        }
    }
}

pub(crate) fn not_found(renderer: &PageRenderer) -> Response {
    match renderer.render_not_found() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            tracing::warn!("Failed to render not-found page: {}", e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

pub(crate) fn internal_error(renderer: &PageRenderer) -> Response {
    match renderer.render_error() {
        Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response(),
        Err(e) => {
            tracing::warn!("Failed to render error page: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
