//! Per-route generation state.
//!
//! Every post route moves through the same states whether it was enumerated
//! at build time or first requested at run time:
//!
//! ```text
//! Enumerated ──┐
//!              ├─> Pending ──> Generated
//! (unknown) ───┘      │  └───> NotFound
//!                     └──────> back to the prior state on failure
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

/// A rendered page ready to serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub slug: String,
    pub html: String,
}

/// Generation state of one route.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteState {
    /// Known at build time, not generated yet
    Enumerated,
    /// A generation is in flight
    Pending,
    Generated(Arc<RenderedPage>),
    NotFound,
}

/// What a route resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Page(Arc<RenderedPage>),
    NotFound,
}

/// Route states keyed by slug.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Mutex<HashMap<String, RouteState>>,
    settled: Notify,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RouteState>> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register build-time routes. Routes already tracked keep their state.
    pub fn enumerate<I, S>(&self, slugs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut routes = self.lock();
        for slug in slugs {
            routes.entry(slug.into()).or_insert(RouteState::Enumerated);
        }
    }

    /// Mark a route as generated from an existing snapshot.
    pub fn seed(&self, page: RenderedPage) {
        self.lock()
            .insert(page.slug.clone(), RouteState::Generated(Arc::new(page)));
    }

    /// Current state of a route, if it is tracked.
    pub fn state(&self, slug: &str) -> Option<RouteState> {
        self.lock().get(slug).cloned()
    }

    /// Number of tracked routes.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a route, generating it if needed.
    ///
    /// Generated and not-found routes answer from the table. A pending route
    /// waits for the generation in flight. Otherwise the route becomes pending
    /// and `generate` runs; `Ok(None)` means the post does not exist. On error
    /// the route returns to its prior state so a later call retries.
    pub async fn resolve<F, Fut, E>(&self, slug: &str, generate: F) -> Result<Resolution, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<RenderedPage>, E>>,
    {
        let previous = loop {
            let settled = self.settled.notified();

            {
                let mut routes = self.lock();
                match routes.get(slug).cloned() {
                    Some(RouteState::Generated(page)) => return Ok(Resolution::Page(page)),
                    Some(RouteState::NotFound) => return Ok(Resolution::NotFound),
                    Some(RouteState::Pending) => {}
                    previous => {
                        routes.insert(slug.to_string(), RouteState::Pending);
                        break previous;
                    }
                }
            }

            settled.await;
        };

        let mut pending = PendingRoute {
            table: self,
            slug,
            previous,
            settled: false,
        };

        match generate().await {
            Ok(Some(page)) => {
                let page = Arc::new(page);
                pending.settle(RouteState::Generated(Arc::clone(&page)));
                Ok(Resolution::Page(page))
            }
            Ok(None) => {
                pending.settle(RouteState::NotFound);
                Ok(Resolution::NotFound)
            }
            Err(e) => Err(e),
        }
    }
}

/// Restores the prior state if a generation fails or is dropped mid-flight.
struct PendingRoute<'a> {
    table: &'a RouteTable,
    slug: &'a str,
    previous: Option<RouteState>,
    settled: bool,
}

impl PendingRoute<'_> {
    fn settle(&mut self, state: RouteState) {
        self.table.lock().insert(self.slug.to_string(), state);
        self.settled = true;
    }
}

impl Drop for PendingRoute<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let mut routes = self.table.lock();
            match self.previous.take() {
                Some(state) => {
                    routes.insert(self.slug.to_string(), state);
                }
                None => {
                    routes.remove(self.slug);
                }
            }
        }
        self.table.settled.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn page(slug: &str) -> RenderedPage {
        RenderedPage {
            slug: slug.to_string(),
            html: format!("<h1>{slug}</h1>"),
        }
    }

    #[tokio::test]
    async fn generates_enumerated_route_once() {
        let table = RouteTable::new();
        table.enumerate(["a"]);
        assert_eq!(table.state("a"), Some(RouteState::Enumerated));

        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            let resolution = table
                .resolve("a", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(Some(page("a")))
                })
                .await
                .unwrap();
            assert!(matches!(resolution, Resolution::Page(p) if p.slug == "a"));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(table.state("a"), Some(RouteState::Generated(_))));
    }

    #[tokio::test]
    async fn unknown_route_is_generated_on_demand() {
        let table = RouteTable::new();

        let resolution = table
            .resolve("late", || async { Ok::<_, ()>(Some(page("late"))) })
            .await
            .unwrap();

        assert!(matches!(resolution, Resolution::Page(_)));
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn not_found_is_remembered() {
        let table = RouteTable::new();

        let first = table.resolve("gone", || async { Ok::<_, ()>(None) }).await.unwrap();
        let second = table
            .resolve("gone", || async { Ok::<_, ()>(Some(page("gone"))) })
            .await
            .unwrap();

        assert_eq!(first, Resolution::NotFound);
        assert_eq!(second, Resolution::NotFound);
        assert_eq!(table.state("gone"), Some(RouteState::NotFound));
    }

    #[tokio::test]
    async fn failure_restores_prior_state() {
        let table = RouteTable::new();
        table.enumerate(["a"]);

        let result = table.resolve("a", || async { Err::<Option<RenderedPage>, _>("down") }).await;
        assert_eq!(result, Err("down"));
        assert_eq!(table.state("a"), Some(RouteState::Enumerated));

        let result = table.resolve("b", || async { Err::<Option<RenderedPage>, _>("down") }).await;
        assert!(result.is_err());
        assert_eq!(table.state("b"), None);

        let retried = table
            .resolve("a", || async { Ok::<_, &str>(Some(page("a"))) })
            .await
            .unwrap();
        assert!(matches!(retried, Resolution::Page(_)));
    }

    #[tokio::test]
    async fn seeded_routes_skip_generation() {
        let table = RouteTable::new();
        table.seed(page("old"));

        let resolution = table
            .resolve("old", || async { Err::<Option<RenderedPage>, _>("should not run") })
            .await
            .unwrap();

        assert!(matches!(resolution, Resolution::Page(p) if p.html == "<h1>old</h1>"));
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_generation() {
        let table = Arc::new(RouteTable::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let table = Arc::clone(&table);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                table
                    .resolve("slow", || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok::<_, ()>(Some(page("slow")))
                    })
                    .await
            }));
        }

        for handle in handles {
            let resolution = handle.await.unwrap().unwrap();
            assert!(matches!(resolution, Resolution::Page(_)));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_do_not_touch_other_routes() {
        let table = RouteTable::new();
        table.enumerate(["ok", "bad"]);

        table
            .resolve("ok", || async { Ok::<_, ()>(Some(page("ok"))) })
            .await
            .unwrap();
        let _ = table.resolve("bad", || async { Err::<Option<RenderedPage>, _>(()) }).await;

        assert!(matches!(table.state("ok"), Some(RouteState::Generated(_))));
        assert_eq!(table.state("bad"), Some(RouteState::Enumerated));
    }
}
