//! HTTP client for the content backend query API.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2023-06-21";

const CONNECT_TIMEOUT_SECS: u64 = 8;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connection settings for a content project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Project id
    pub project_id: String,

    /// Dataset name
    pub dataset: String,

    /// Dated API version, e.g. "2023-06-21"
    pub api_version: String,

    /// Use the CDN for published reads
    pub use_cdn: bool,

    /// Override the API host (e.g. for a proxy)
    pub api_host: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            use_cdn: true,
            api_host: None,
        }
    }
}

impl ClientConfig {
    /// Base URL of the query API.
    fn base_url(&self, use_cdn: bool) -> String {
        match &self.api_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None if use_cdn => format!("https://{}.apicdn.sanity.io", self.project_id),
            None => format!("https://{}.api.sanity.io", self.project_id),
        }
    }

    fn query_url(&self, use_cdn: bool) -> String {
        format!(
            "{}/v{}/data/query/{}",
            self.base_url(use_cdn),
            self.api_version.trim_start_matches('v'),
            self.dataset
        )
    }
}

/// Which version of documents a query sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perspective {
    /// Published documents only
    Published,
    /// Drafts overlaid on published documents
    PreviewDrafts,
}

impl Perspective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::PreviewDrafts => "previewDrafts",
        }
    }
}

/// Errors returned by the content client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Content API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid query result: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

/// Named query parameters, bound as `$name` in the query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryParams(BTreeMap<String, Value>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Something that can run a parameterized query.
pub trait ContentClient: Send + Sync {
    /// Run a query and return its `result` member.
    fn fetch(
        &self,
        query: &str,
        params: &QueryParams,
    ) -> impl Future<Output = Result<Value, ClientError>> + Send;
}

/// Produces clients, with or without a read token.
pub trait ClientProvider: Send + Sync {
    type Client: ContentClient + 'static;

    /// Create a client. A token switches the client to draft mode.
    fn client(&self, token: Option<&str>) -> Result<Self::Client, ClientError>;
}

impl ClientProvider for ClientConfig {
    type Client = SanityClient;

    fn client(&self, token: Option<&str>) -> Result<SanityClient, ClientError> {
        SanityClient::new(self, token)
    }
}

/// Query API client.
#[derive(Debug, Clone)]
pub struct SanityClient {
    http: reqwest::Client,
    query_url: String,
    auth: Option<HeaderValue>,
    perspective: Perspective,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
}

impl SanityClient {
    /// Create a client for the given project.
    ///
    /// With a token the client reads drafts and bypasses the CDN.
    pub fn new(config: &ClientConfig, token: Option<&str>) -> Result<Self, ClientError> {
        if config.project_id.is_empty() && config.api_host.is_none() {
            return Err(ClientError::Config("project_id is not set".to_string()));
        }

        let token = token.filter(|t| !t.is_empty());

        let auth = token
            .map(|t| {
                HeaderValue::from_str(&format!("Bearer {t}"))
                    .map_err(|_| ClientError::Config("invalid read token".to_string()))
            })
            .transpose()?;

        let (perspective, use_cdn) = match auth {
            Some(_) => (Perspective::PreviewDrafts, false),
            None => (Perspective::Published, config.use_cdn),
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            query_url: config.query_url(use_cdn),
            auth,
            perspective,
        })
    }

    /// Whether this client carries a read token.
    pub fn has_token(&self) -> bool {
        self.auth.is_some()
    }

    pub fn perspective(&self) -> Perspective {
        self.perspective
    }
}

impl ContentClient for SanityClient {
    async fn fetch(&self, query: &str, params: &QueryParams) -> Result<Value, ClientError> {
        let mut pairs: Vec<(String, String)> = vec![("query".to_string(), query.to_string())];
        for (name, value) in params.iter() {
            pairs.push((format!("${name}"), serde_json::to_string(value)?));
        }
        pairs.push((
            "perspective".to_string(),
            self.perspective.as_str().to_string(),
        ));

        tracing::debug!(url = %self.query_url, query, "Running content query");

        let mut request = self.http.get(&self.query_url).query(&pairs);
        if let Some(auth) = &self.auth {
            request = request.header(AUTHORIZATION, auth.clone());
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: QueryResponse = response.json().await?;
        Ok(body.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ClientConfig {
        ClientConfig {
            project_id: "proj".to_string(),
            api_host: Some(server.uri()),
            ..Default::default()
        }
    }

    #[test]
    fn computes_query_urls() {
        let config = ClientConfig {
            project_id: "abc".to_string(),
            ..Default::default()
        };

        assert_eq!(
            config.query_url(true),
            "https://abc.apicdn.sanity.io/v2023-06-21/data/query/production"
        );
        assert_eq!(
            config.query_url(false),
            "https://abc.api.sanity.io/v2023-06-21/data/query/production"
        );
    }

    #[test]
    fn requires_project_id() {
        let result = ClientConfig::default().client(None);
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn token_switches_to_drafts() {
        let config = ClientConfig {
            project_id: "abc".to_string(),
            ..Default::default()
        };

        let published = config.client(None).unwrap();
        assert!(!published.has_token());
        assert_eq!(published.perspective(), Perspective::Published);

        let draft = config.client(Some("secret")).unwrap();
        assert!(draft.has_token());
        assert_eq!(draft.perspective(), Perspective::PreviewDrafts);
        assert!(draft.query_url.starts_with("https://abc.api.sanity.io"));

        let empty = config.client(Some("")).unwrap();
        assert!(!empty.has_token());
    }

    #[tokio::test]
    async fn fetches_result_with_bound_params() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2023-06-21/data/query/production"))
            .and(query_param("query", "*[slug.current == $slug][0]"))
            .and(query_param("$slug", "\"hello\""))
            .and(query_param("perspective", "published"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ms": 3,
                "query": "*[slug.current == $slug][0]",
                "result": { "title": "Hello" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = config_for(&server).client(None).unwrap();
        let params = QueryParams::new().with("slug", "hello");
        let result = client
            .fetch("*[slug.current == $slug][0]", &params)
            .await
            .unwrap();

        assert_eq!(result, json!({ "title": "Hello" }));

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn sends_token_in_draft_mode() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(header("authorization", "Bearer secret"))
            .and(query_param("perspective", "previewDrafts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": null })))
            .expect(1)
            .mount(&server)
            .await;

        let client = config_for(&server).client(Some("secret")).unwrap();
        let result = client.fetch("*[0]", &QueryParams::new()).await.unwrap();

        assert!(result.is_null());
    }

    #[tokio::test]
    async fn surfaces_api_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let client = config_for(&server).client(None).unwrap();
        let err = client.fetch("*", &QueryParams::new()).await.unwrap_err();

        assert!(matches!(err, ClientError::Api { status: 401, ref message } if message == "unauthorized"));
    }
}
