//! NewsAPI `everything` search, one query per configured category.

use super::http::HttpFetcher;
use super::{Source, SourceError};
use crate::models::Item;
use crate::utils::clean_text;
use chrono::{Duration, Utc};
use futures::future::{BoxFuture, FutureExt};
use serde::Deserialize;
use tracing::{info, instrument, warn};

pub struct NewsApiSource {
    http: HttpFetcher,
    base_url: String,
    api_key: Option<String>,
    categories: Vec<String>,
    days_back: i64,
    page_size: u32,
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    source: Option<ArticleSource>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

impl NewsApiSource {
    pub fn new(
        http: HttpFetcher,
        base_url: &str,
        api_key: Option<String>,
        categories: Vec<String>,
        days_back: i64,
        page_size: u32,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            categories,
            days_back,
            page_size,
        }
    }

    #[instrument(level = "info", skip_all)]
    async fn fetch_all(&self) -> Result<Vec<Item>, SourceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("No NEWSAPI_KEY; skipping NewsAPI");
            return Ok(Vec::new());
        };

        let from = (Utc::now() - Duration::days(self.days_back)).date_naive().to_string();
        let page_size = self.page_size.to_string();
        let url = format!("{}/v2/everything", self.base_url);

        let mut items = Vec::new();
        for category in &self.categories {
            let query = [
                ("q", category.as_str()),
                ("from", from.as_str()),
                ("sortBy", "publishedAt"),
                ("language", "en"),
                ("pageSize", page_size.as_str()),
                ("apiKey", api_key),
            ];
            match self.http.get_json::<NewsResponse>(&url, &query).await {
                Ok(resp) if resp.status == "ok" => {
                    let before = items.len();
                    items.extend(resp.articles.into_iter().map(to_item));
                    info!(%category, count = items.len() - before, "Fetched news");
                }
                Ok(resp) => {
                    warn!(%category, status = %resp.status, message = ?resp.message, "NewsAPI returned an error");
                }
                Err(e) => {
                    warn!(%category, error = %e, "NewsAPI request failed");
                }
            }
        }
        Ok(items)
    }
}

fn to_item(a: Article) -> Item {
    let title = a.title.as_deref().map(clean_text);
    let body = format!(
        "{}\n\n{}",
        title.as_deref().unwrap_or_default(),
        a.description.as_deref().map(clean_text).unwrap_or_default()
    );
    Item {
        source: a
            .source
            .and_then(|s| s.name)
            .unwrap_or_else(|| "newsapi".to_string()),
        title,
        body,
        url: a.url,
        published_at: a.published_at,
    }
}

impl Source for NewsApiSource {
    fn name(&self) -> &str {
        "newsapi"
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<Item>, SourceError>> {
        self.fetch_all().boxed()
    }
}
