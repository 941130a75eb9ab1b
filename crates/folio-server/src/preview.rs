//! Draft preview server.
//!
//! Every page is generated from drafts on each request and carries the live
//! client, which connects back to `/__live/post/{slug}` for updates.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ws::WebSocketUpgrade, Path as RoutePath, Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use folio_content::{get_post, post_params, ClientProvider, Post, POST_BY_SLUG_QUERY};
use folio_static::{AssetPipeline, PageGenerator, PageOutcome, PageRenderer};
use serde::Deserialize;

use crate::live::{LiveSubscription, MIN_POLL_INTERVAL};
use crate::site::{internal_error, not_found, serve, ServerConfig, ServerError};
use crate::websocket::{LiveMessage, LiveSink};

struct PreviewState<P> {
    generator: PageGenerator<P>,
    renderer: PageRenderer,
    poll_interval: Duration,
}

/// Serves draft pages with live updates.
pub struct PreviewServer<P> {
    config: ServerConfig,
    state: Arc<PreviewState<P>>,
}

impl<P: ClientProvider + 'static> PreviewServer<P> {
    /// Create a preview server polling drafts every `poll_interval`. Fails
    /// without a read token.
    ///
    /// Pages and the live socket are served from the server root whatever
    /// base URL the renderer was configured with.
    pub fn new(
        config: ServerConfig,
        generator: PageGenerator<P>,
        renderer: PageRenderer,
        poll_interval: Duration,
    ) -> Result<Self, ServerError> {
        if !generator.has_read_token() {
            return Err(ServerError::MissingReadToken);
        }

        Ok(Self {
            config,
            state: Arc::new(PreviewState {
                generator,
                renderer: renderer.with_base_url("/"),
                poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            }),
        })
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/post/{slug}", get(draft_handler::<P>))
            .route("/__live/post/{slug}", get(live_handler::<P>))
            .route("/assets/live.js", get(live_script_handler))
            .route("/assets/main.css", get(css_handler))
            .fallback(fallback_handler::<P>)
            .with_state(Arc::clone(&self.state))
    }

    /// Start the preview server.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr = self.config.addr()?;
        let app = self.router();

        tracing::info!("Starting draft preview at http://{}", addr);

        if self.config.open {
            let _ = open::that(format!("http://{}", addr));
        }

        serve(addr, app).await
    }
}

async fn draft_handler<P: ClientProvider + 'static>(
    State(state): State<Arc<PreviewState<P>>>,
    RoutePath(slug): RoutePath<String>,
) -> Response {
    let payload = match state.generator.generate(&slug, true).await {
        Ok(PageOutcome::Found(payload)) => payload,
        Ok(PageOutcome::NotFound) => return not_found(&state.renderer),
        Err(e) => {
            tracing::warn!("Failed to generate draft /post/{}: {}", slug, e);
            return internal_error(&state.renderer);
        }
    };

    match state.renderer.render(&payload) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::warn!("Failed to render draft /post/{}: {}", slug, e);
            internal_error(&state.renderer)
        }
    }
}

#[derive(Debug, Deserialize)]
struct LiveQuery {
    /// Revision the page was rendered from
    rev: Option<String>,
}

async fn live_handler<P: ClientProvider + 'static>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<PreviewState<P>>>,
    RoutePath(slug): RoutePath<String>,
    Query(query): Query<LiveQuery>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| live_session(socket, state, slug, query.rev))
}

/// Push a fresh post section to one page instance for every draft change.
///
/// If the draft moved past `rendered_rev` before the page connected, the
/// current version is pushed right after `Connected`.
async fn live_session<P, S>(
    mut sink: S,
    state: Arc<PreviewState<P>>,
    slug: String,
    rendered_rev: Option<String>,
)
where
    P: ClientProvider + 'static,
    S: LiveSink,
{
    let client = match state.generator.draft_client() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("Live preview unavailable: {}", e);
            return;
        }
    };

    let current = match get_post(&client, &slug).await {
        Ok(Some(post)) => post,
        Ok(None) => {
            tracing::debug!("No draft for '{}', closing live socket", slug);
            return;
        }
        Err(e) => {
            tracing::warn!("Failed to load draft '{}': {}", slug, e);
            return;
        }
    };

    if !sink.send(LiveMessage::Connected).await {
        return;
    }

    if rendered_rev.as_deref() != Some(current.rev.as_str())
        && !push_update(&mut sink, &state.renderer, &slug, &current).await
    {
        return;
    }

    let mut subscription = LiveSubscription::spawn(
        client,
        POST_BY_SLUG_QUERY,
        post_params(&slug),
        current,
        state.poll_interval,
    );

    tracing::debug!("Live preview connected for '{}'", slug);

    loop {
        tokio::select! {
            _ = sink.closed() => break,
            update = subscription.recv() => {
                let Some(post) = update else { break };

                if !push_update(&mut sink, &state.renderer, &slug, &post).await {
                    break;
                }
            }
        }
    }

    tracing::debug!("Live preview disconnected for '{}'", slug);
}

/// Render and send one update. Returns `false` once the page is gone.
async fn push_update<S: LiveSink>(
    sink: &mut S,
    renderer: &PageRenderer,
    slug: &str,
    post: &Post,
) -> bool {
    match renderer.render_section(post) {
        Ok(html) => sink.send(LiveMessage::Update { html }).await,
        Err(e) => {
            tracing::warn!("Failed to render live update for '{}': {}", slug, e);
            true
        }
    }
}

async fn live_script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        AssetPipeline::live_client_script(),
    )
}

async fn css_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], AssetPipeline::generate_css())
}

async fn fallback_handler<P: ClientProvider + 'static>(
    State(state): State<Arc<PreviewState<P>>>,
) -> Response {
    not_found(&state.renderer)
}
