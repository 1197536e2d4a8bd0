//! Product Hunt top posts through the v2 GraphQL API.

use super::http::{decode_json, HttpFetcher};
use super::{Source, SourceError};
use crate::models::Item;
use crate::utils::clean_text;
use futures::future::{BoxFuture, FutureExt};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

const POSTS_QUERY: &str = r#"
query {
  posts(first: 30, order: VOTES) {
    edges {
      node {
        name
        tagline
        url
        votesCount
        createdAt
      }
    }
  }
}
"#;

pub struct ProductHuntSource {
    http: HttpFetcher,
    url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<PostsData>,
    errors: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PostsData {
    posts: Connection,
}

#[derive(Debug, Deserialize)]
struct Connection {
    #[serde(default)]
    edges: Vec<Edge>,
}

#[derive(Debug, Deserialize)]
struct Edge {
    node: Option<Post>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Post {
    name: Option<String>,
    tagline: Option<String>,
    url: Option<String>,
    created_at: Option<String>,
}

impl ProductHuntSource {
    pub fn new(http: HttpFetcher, url: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            url: url.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    #[instrument(level = "info", skip_all)]
    async fn fetch_all(&self) -> Result<Vec<Item>, SourceError> {
        let Some(key) = self.api_key.as_deref() else {
            warn!("No PRODUCT_HUNT_API_KEY; skipping Product Hunt");
            return Ok(Vec::new());
        };

        let payload = json!({ "query": POSTS_QUERY });
        let body = self
            .http
            .send(&self.url, |c| {
                c.post(&self.url)
                    .bearer_auth(key)
                    .header(ACCEPT, "application/json")
                    .json(&payload)
            })
            .await?;
        let items = parse_posts(&body)?;
        info!(count = items.len(), "Fetched Product Hunt posts");
        Ok(items)
    }
}

fn parse_posts(body: &str) -> Result<Vec<Item>, SourceError> {
    let resp: GraphQlResponse = decode_json(body)?;
    if let Some(errors) = resp.errors {
        return Err(SourceError::Upstream(errors.to_string()));
    }
    let edges = resp.data.map(|d| d.posts.edges).unwrap_or_default();
    Ok(edges
        .into_iter()
        .filter_map(|e| e.node)
        .map(|p| {
            let title = p.name.as_deref().map(clean_text);
            Item {
                source: "producthunt".to_string(),
                body: p
                    .tagline
                    .as_deref()
                    .map(clean_text)
                    .or_else(|| title.clone())
                    .unwrap_or_default(),
                title,
                url: p.url,
                published_at: p.created_at,
            }
        })
        .collect())
}

impl Source for ProductHuntSource {
    fn name(&self) -> &str {
        "producthunt"
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<Item>, SourceError>> {
        self.fetch_all().boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RetryPolicy;
    use std::time::Duration;

    fn source(url: &str, key: Option<&str>) -> ProductHuntSource {
        let http = HttpFetcher::new(Duration::from_secs(5), RetryPolicy::immediate(1)).unwrap();
        ProductHuntSource::new(http, url, key.map(str::to_string))
    }

    #[tokio::test]
    async fn test_fetch_posts() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/v2/api/graphql")
            .match_header("authorization", "Bearer ph-token")
            .match_body(mockito::Matcher::Regex("posts\\(first: 30, order: VOTES\\)".into()))
            .with_status(200)
            .with_body(
                r#"{"data": {"posts": {"edges": [
                    {"node": {"name": "Granola", "tagline": "AI notepad for meetings",
                              "url": "https://www.producthunt.com/posts/granola", "votesCount": 900,
                              "createdAt": "2025-12-04T08:01:00Z"}},
                    {"node": null}
                ]}}}"#,
            )
            .create_async()
            .await;

        let items = source(&format!("{}/v2/api/graphql", server.url()), Some("ph-token"))
            .fetch()
            .await
            .unwrap();

        m.assert_async().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, "producthunt");
        assert_eq!(items[0].title.as_deref(), Some("Granola"));
        assert_eq!(items[0].body, "AI notepad for meetings");
        assert_eq!(items[0].published_at.as_deref(), Some("2025-12-04T08:01:00Z"));
    }

    #[tokio::test]
    async fn test_graphql_errors_fail_the_source() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_body(r#"{"errors": [{"message": "invalid_oauth_token"}]}"#)
            .create_async()
            .await;

        let err = source(&format!("{}/graphql", server.url()), Some("bad"))
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Upstream(msg) if msg.contains("invalid_oauth_token")));
    }

    #[tokio::test]
    async fn test_without_token_is_skipped() {
        let items = source("http://127.0.0.1:9/graphql", None).fetch().await.unwrap();
        assert!(items.is_empty());
    }
}
