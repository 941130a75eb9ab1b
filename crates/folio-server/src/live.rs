//! Live preview of draft documents.
//!
//! A draft page instance keeps a [`LivePreview`] of the post it shows and a
//! [`LiveSubscription`] that polls the content backend with the query and
//! parameters the page was generated from.

use std::time::Duration;

use folio_content::{ContentClient, Post, QueryParams};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Shortest interval between polls.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Last known state of the post behind one page instance.
#[derive(Debug, Clone)]
pub struct LivePreview {
    post: Post,
}

impl LivePreview {
    pub fn new(post: Post) -> Self {
        Self { post }
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    /// Replace the shown post with `post`. Returns `false` if nothing changed.
    pub fn apply(&mut self, post: Post) -> bool {
        if post == self.post {
            return false;
        }
        self.post = post;
        true
    }
}

/// A stream of changed versions of one document.
#[derive(Debug)]
pub struct LiveSubscription {
    updates: mpsc::Receiver<Post>,
}

impl LiveSubscription {
    /// Start polling `query` every `interval`, at least [`MIN_POLL_INTERVAL`].
    ///
    /// Each version that differs from the last one delivered (starting from
    /// `initial`) is sent in order. Polling stops once the subscription is
    /// dropped.
    pub fn spawn<C>(
        client: C,
        query: impl Into<String>,
        params: QueryParams,
        initial: Post,
        interval: Duration,
    ) -> Self
    where
        C: ContentClient + 'static,
    {
        let (tx, updates) = mpsc::channel(16);
        let query = query.into();
        let interval = interval.max(MIN_POLL_INTERVAL);

        tokio::spawn(async move {
            let mut preview = LivePreview::new(initial);
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    _ = ticker.tick() => {}
                }

                let Some(post) = poll(&client, &query, &params).await else {
                    continue;
                };

                if preview.apply(post) && tx.send(preview.post().clone()).await.is_err() {
                    break;
                }
            }

            tracing::debug!("Live subscription closed");
        });

        Self { updates }
    }

    /// Next changed version, or `None` once polling has stopped.
    pub async fn recv(&mut self) -> Option<Post> {
        self.updates.recv().await
    }
}

async fn poll<C: ContentClient>(client: &C, query: &str, params: &QueryParams) -> Option<Post> {
    match client.fetch(query, params).await {
        Ok(Value::Null) => {
            tracing::debug!("Previewed document is gone, keeping last version");
            None
        }
        Ok(value) => match serde_json::from_value(value) {
            Ok(post) => Some(post),
            Err(e) => {
                tracing::warn!("Ignoring malformed draft document: {}", e);
                None
            }
        },
        Err(e) => {
            tracing::warn!("Live preview poll failed: {}", e);
            None
        }
    }
}
