//! In-memory content backend for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use folio_content::{
    ClientError, ClientProvider, ContentClient, Post, QueryParams, POST_BY_SLUG_QUERY,
    POST_SLUGS_QUERY,
};
use serde_json::{json, Value};

#[derive(Default)]
struct Store {
    posts: Mutex<Vec<Post>>,
    tokens: Mutex<Vec<Option<String>>>,
    unlisted: Mutex<Vec<String>>,
    broken: Mutex<Vec<String>>,
    queries: AtomicUsize,
    failing: bool,
}

/// A content backend holding posts in memory.
///
/// Answers the two site queries and records the token each client was
/// created with.
#[derive(Clone, Default)]
pub struct MemoryProvider {
    store: Arc<Store>,
}

impl MemoryProvider {
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            store: Arc::new(Store {
                posts: Mutex::new(posts),
                ..Default::default()
            }),
        }
    }

    /// A backend whose every query fails.
    pub fn failing() -> Self {
        Self {
            store: Arc::new(Store {
                failing: true,
                ..Default::default()
            }),
        }
    }

    /// Insert or replace a post by slug.
    pub fn put(&self, post: Post) {
        let mut posts = self.store.posts.lock().unwrap_or_else(PoisonError::into_inner);
        posts.retain(|p| p.slug() != post.slug());
        posts.push(post);
    }

    /// List a slug in enumeration without a post behind it, as if the post
    /// was deleted after the slug query ran.
    pub fn enumerate_only(&self, slug: &str) {
        self.store
            .unlisted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(slug.to_string());
    }

    /// Fail every fetch of one slug.
    pub fn break_slug(&self, slug: &str) {
        self.store
            .broken
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(slug.to_string());
    }

    /// Tokens clients were created with, in order.
    pub fn tokens_seen(&self) -> Vec<Option<String>> {
        self.store
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of queries run so far.
    pub fn query_count(&self) -> usize {
        self.store.queries.load(Ordering::SeqCst)
    }
}

impl ClientProvider for MemoryProvider {
    type Client = MemoryClient;

    fn client(&self, token: Option<&str>) -> Result<MemoryClient, ClientError> {
        self.store
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(token.map(str::to_string));

        Ok(MemoryClient {
            store: Arc::clone(&self.store),
        })
    }
}

/// Client handed out by [`MemoryProvider`].
pub struct MemoryClient {
    store: Arc<Store>,
}

impl ContentClient for MemoryClient {
    async fn fetch(&self, query: &str, params: &QueryParams) -> Result<Value, ClientError> {
        self.store.queries.fetch_add(1, Ordering::SeqCst);

        if self.store.failing {
            return Err(ClientError::Api {
                status: 503,
                message: "backend unavailable".to_string(),
            });
        }

        let posts = self
            .store
            .posts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        match query {
            POST_SLUGS_QUERY => {
                let unlisted = self
                    .store
                    .unlisted
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();
                Ok(Value::Array(
                    posts
                        .iter()
                        .map(|p| p.slug().to_string())
                        .chain(unlisted)
                        .map(|slug| json!({ "slug": slug }))
                        .collect(),
                ))
            }
            POST_BY_SLUG_QUERY => {
                let slug = params.get("slug").and_then(Value::as_str);
                let broken = self
                    .store
                    .broken
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .iter()
                    .any(|b| Some(b.as_str()) == slug);
                if broken {
                    return Err(ClientError::Api {
                        status: 500,
                        message: "document unavailable".to_string(),
                    });
                }
                match posts.iter().find(|p| Some(p.slug()) == slug) {
                    Some(post) => Ok(serde_json::to_value(post)?),
                    None => Ok(Value::Null),
                }
            }
            other => Err(ClientError::Config(format!("unsupported query: {other}"))),
        }
    }
}

/// A post with a one-paragraph body.
pub fn post(slug: &str) -> Post {
    post_titled(slug, &format!("Title of {slug}"))
}

/// A post with the given title.
pub fn post_titled(slug: &str, title: &str) -> Post {
    serde_json::from_value(json!({
        "_id": format!("post-{slug}"),
        "_rev": format!("rev-{title}"),
        "_createdAt": "2026-10-14T08:00:00Z",
        "slug": { "current": slug },
        "title": title,
        "excerpt": format!("Excerpt of {title}"),
        "body": [{
            "_type": "block",
            "style": "normal",
            "children": [{ "_type": "span", "text": format!("Body of {title}"), "marks": [] }]
        }]
    }))
    .expect("valid test post")
}
