//! Shopping search trends from the SEMrush trends endpoint.

use super::http::HttpFetcher;
use super::{Source, SourceError};
use crate::models::Item;
use crate::utils::clean_text;
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

pub struct ShoppingTrendsSource {
    http: HttpFetcher,
    url: String,
}

#[derive(Debug, Deserialize)]
struct TrendsResponse {
    #[serde(default)]
    trends: Vec<Trend>,
}

#[derive(Debug, Deserialize)]
struct Trend {
    query: Option<String>,
    #[serde(default)]
    category: Value,
    #[serde(default)]
    growth: Value,
    #[serde(default)]
    movement: Value,
}

impl ShoppingTrendsSource {
    pub fn new(http: HttpFetcher, url: &str) -> Self {
        Self {
            http,
            url: url.to_string(),
        }
    }

    #[instrument(level = "info", skip_all, fields(url = %self.url))]
    async fn fetch_all(&self) -> Result<Vec<Item>, SourceError> {
        let resp: TrendsResponse = self.http.get_json(&self.url, &[]).await?;
        let fetched_at = Utc::now().to_rfc3339();
        let items: Vec<Item> = resp
            .trends
            .into_iter()
            .map(|t| Item {
                source: "google_shopping_trends".to_string(),
                title: t.query.as_deref().map(clean_text),
                body: format!(
                    "Category: {} | Growth: {}% | Movement: {}",
                    display(&t.category),
                    display(&t.growth),
                    display(&t.movement)
                ),
                url: None,
                published_at: Some(fetched_at.clone()),
            })
            .collect();
        info!(count = items.len(), "Fetched shopping trends");
        Ok(items)
    }
}

/// Render a loosely typed JSON field without quotes.
fn display(v: &Value) -> String {
    match v {
        Value::Null => "unknown".to_string(),
        Value::String(s) => clean_text(s),
        other => other.to_string(),
    }
}

impl Source for ShoppingTrendsSource {
    fn name(&self) -> &str {
        "google_shopping_trends"
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

    #[tokio::test]
    async fn test_fetch_trends() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/shopping/trends")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"trends": [
                    {"query": "heated vest", "category": "Apparel", "growth": 340, "movement": "up"},
                    {"query": "robot mop", "category": "Home", "growth": 12.5}
                ]}"#,
            )
            .create_async()
            .await;

        let http = HttpFetcher::new(Duration::from_secs(5), RetryPolicy::immediate(1)).unwrap();
        let source = ShoppingTrendsSource::new(
            http,
            &format!("{}/shopping/trends?country=us", server.url()),
        );
        let items = source.fetch().await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].source, "google_shopping_trends");
        assert_eq!(items[0].title.as_deref(), Some("heated vest"));
        assert_eq!(items[0].body, "Category: Apparel | Growth: 340% | Movement: up");
        assert_eq!(items[1].body, "Category: Home | Growth: 12.5% | Movement: unknown");
        assert!(items[0].published_at.is_some());
        assert_eq!(items[0].url, None);
    }
}
