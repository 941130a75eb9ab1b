//! HTTP servers for folio.
//!
//! [`SiteServer`] serves published posts, generating routes the build did not
//! know about on first request. [`PreviewServer`] serves drafts and pushes
//! every saved change to open pages over a websocket.

pub mod live;
pub mod preview;
pub mod site;
pub mod websocket;

pub use live::{LivePreview, LiveSubscription, MIN_POLL_INTERVAL};
pub use preview::PreviewServer;
pub use site::{ServerConfig, ServerError, SiteServer};
pub use websocket::{LiveMessage, LiveSink};
