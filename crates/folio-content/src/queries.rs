//! Queries the site runs against the content backend.

use serde::Deserialize;

use crate::client::{ClientError, ContentClient, QueryParams};
use crate::model::Post;

/// All post slugs, as `{slug}` records.
pub const POST_SLUGS_QUERY: &str =
    r#"*[_type == "post" && defined(slug.current)]{"slug": slug.current}"#;

/// A single post by slug, bound as `$slug`.
pub const POST_BY_SLUG_QUERY: &str = r#"*[_type == "post" && slug.current == $slug][0]"#;

#[derive(Deserialize)]
struct SlugRecord {
    slug: String,
}

/// Parameters for [`POST_BY_SLUG_QUERY`].
pub fn post_params(slug: &str) -> QueryParams {
    QueryParams::new().with("slug", slug)
}

/// Fetch a post by slug. A missing post is `Ok(None)`.
pub async fn get_post<C: ContentClient>(client: &C, slug: &str) -> Result<Option<Post>, ClientError> {
    let value = client.fetch(POST_BY_SLUG_QUERY, &post_params(slug)).await?;

    if value.is_null() {
        return Ok(None);
    }

    Ok(Some(serde_json::from_value(value)?))
}

/// Fetch all known post slugs in query order.
pub async fn get_post_slugs<C: ContentClient>(client: &C) -> Result<Vec<String>, ClientError> {
    let value = client.fetch(POST_SLUGS_QUERY, &QueryParams::new()).await?;

    let records: Option<Vec<SlugRecord>> = serde_json::from_value(value)?;

    Ok(records
        .unwrap_or_default()
        .into_iter()
        .map(|r| r.slug)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientConfig, ClientProvider};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::query_param;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server_returning(query: &str, result: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(query_param("query", query))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": result })))
            .mount(&server)
            .await;
        server
    }

    fn config(server: &MockServer) -> ClientConfig {
        ClientConfig {
            project_id: "proj".to_string(),
            api_host: Some(server.uri()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn missing_post_is_none() {
        let server = server_returning(POST_BY_SLUG_QUERY, json!(null)).await;
        let client = config(&server).client(None).unwrap();

        let post = get_post(&client, "nope").await.unwrap();

        assert!(post.is_none());
    }

    #[tokio::test]
    async fn fetches_post_by_slug() {
        let server = server_returning(
            POST_BY_SLUG_QUERY,
            json!({
                "_id": "p1",
                "_createdAt": "2026-10-14T00:00:00Z",
                "slug": { "current": "first" },
                "title": "First"
            }),
        )
        .await;
        let client = config(&server).client(None).unwrap();

        let post = get_post(&client, "first").await.unwrap().unwrap();

        assert_eq!(post.slug(), "first");
        assert_eq!(post.title, "First");
    }

    #[tokio::test]
    async fn lists_slugs_in_order() {
        let server = server_returning(
            POST_SLUGS_QUERY,
            json!([{ "slug": "b" }, { "slug": "a" }, { "slug": "c" }]),
        )
        .await;
        let client = config(&server).client(None).unwrap();

        let slugs = get_post_slugs(&client).await.unwrap();

        assert_eq!(slugs, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn null_slug_list_is_empty() {
        let server = server_returning(POST_SLUGS_QUERY, json!(null)).await;
        let client = config(&server).client(None).unwrap();

        assert!(get_post_slugs(&client).await.unwrap().is_empty());
    }
}
