//! Page data generation for a single slug.

use folio_content::{get_post, ClientError, ClientProvider, PagePayload};

/// Outcome of generating a page. A missing post is data, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Found(PagePayload),
    NotFound,
}

/// Errors that can occur while generating page data.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Draft mode requires a read token (set SANITY_API_READ_TOKEN)")]
    MissingReadToken,

    #[error("Failed to fetch post '{slug}': {source}")]
    Client {
        slug: String,
        #[source]
        source: ClientError,
    },

    #[error("Failed to create content client: {0}")]
    Connect(#[source] ClientError),
}

/// Fetches a post and wraps it into page props.
pub struct PageGenerator<P> {
    provider: P,
    read_token: Option<String>,
}

impl<P: ClientProvider> PageGenerator<P> {
    /// Create a generator. The read token is only ever used in draft mode.
    pub fn new(provider: P, read_token: Option<String>) -> Self {
        Self {
            provider,
            read_token: read_token.filter(|t| !t.is_empty()),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Whether draft mode can be served.
    pub fn has_read_token(&self) -> bool {
        self.read_token.is_some()
    }

    /// A client reading drafts with the configured read token.
    pub fn draft_client(&self) -> Result<P::Client, GenerateError> {
        let token = self
            .read_token
            .as_deref()
            .ok_or(GenerateError::MissingReadToken)?;
        self.provider.client(Some(token)).map_err(GenerateError::Connect)
    }

    /// Generate page data for `slug`.
    ///
    /// The slug is passed to the query as-is. In published mode the payload
    /// token is the empty string.
    pub async fn generate(&self, slug: &str, draft_mode: bool) -> Result<PageOutcome, GenerateError> {
        let token = if draft_mode {
            Some(
                self.read_token
                    .as_deref()
                    .ok_or(GenerateError::MissingReadToken)?,
            )
        } else {
            None
        };

        let client_error = |source| GenerateError::Client {
            slug: slug.to_string(),
            source,
        };

        let client = self.provider.client(token).map_err(client_error)?;
        let post = get_post(&client, slug).await.map_err(client_error)?;

        let Some(post) = post else {
            tracing::debug!("No post for slug '{}'", slug);
            return Ok(PageOutcome::NotFound);
        };

        Ok(PageOutcome::Found(PagePayload {
            draft_mode,
            token: token.unwrap_or_default().to_string(),
            post,
        }))
    }
}
