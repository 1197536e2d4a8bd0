//! YouTube: trending videos through an Invidious instance, and review
//! searches through the YouTube Data API.

use super::http::HttpFetcher;
use super::{Source, SourceError};
use crate::models::Item;
use crate::utils::clean_text;
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use serde::Deserialize;
use tracing::{info, instrument, warn};

fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

pub struct YouTubeTrending {
    http: HttpFetcher,
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrendingVideo {
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    video_id: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    published: Option<i64>,
}

impl YouTubeTrending {
    pub fn new(http: HttpFetcher, url: &str) -> Self {
        Self {
            http,
            url: url.to_string(),
        }
    }

    #[instrument(level = "info", skip_all, fields(url = %self.url))]
    async fn fetch_all(&self) -> Result<Vec<Item>, SourceError> {
        let videos: Vec<TrendingVideo> = self.http.get_json(&self.url, &[]).await?;
        let items: Vec<Item> = videos.into_iter().map(trending_item).collect();
        info!(count = items.len(), "Fetched trending videos");
        Ok(items)
    }
}

fn trending_item(v: TrendingVideo) -> Item {
    let title = v.title.as_deref().map(clean_text);
    Item {
        source: "youtube_trending".to_string(),
        body: v
            .description
            .as_deref()
            .map(clean_text)
            .filter(|d| !d.is_empty())
            .or_else(|| title.clone())
            .unwrap_or_default(),
        title,
        url: v.video_id.as_deref().map(watch_url),
        published_at: v
            .published
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .map(|dt| dt.to_rfc3339()),
    }
}

impl Source for YouTubeTrending {
    fn name(&self) -> &str {
        "youtube_trending"
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<Item>, SourceError>> {
        self.fetch_all().boxed()
    }
}

pub struct YouTubeReviews {
    http: HttpFetcher,
    search_url: String,
    api_key: Option<String>,
    keywords: Vec<String>,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: ResultId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    published_at: Option<String>,
}

impl YouTubeReviews {
    pub fn new(
        http: HttpFetcher,
        api_base_url: &str,
        api_key: Option<String>,
        keywords: Vec<String>,
        max_results: u32,
    ) -> Self {
        Self {
            http,
            search_url: format!("{}/youtube/v3/search", api_base_url.trim_end_matches('/')),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            keywords,
            max_results,
        }
    }

    #[instrument(level = "info", skip_all)]
    async fn fetch_all(&self) -> Result<Vec<Item>, SourceError> {
        let Some(key) = self.api_key.as_deref() else {
            warn!("No YOUTUBE_API_KEY; skipping review search");
            return Ok(Vec::new());
        };

        let max_results = self.max_results.to_string();
        let mut items = Vec::new();
        for kw in &self.keywords {
            let query = [
                ("part", "snippet"),
                ("q", kw.as_str()),
                ("maxResults", max_results.as_str()),
                ("type", "video"),
                ("key", key),
            ];
            match self.http.get_json::<SearchResponse>(&self.search_url, &query).await {
                Ok(resp) => {
                    let before = items.len();
                    items.extend(resp.items.into_iter().map(|r| review_item(kw, r)));
                    info!(keyword = %kw, count = items.len() - before, "Fetched reviews");
                }
                Err(e) => warn!(keyword = %kw, error = %e, "Review search failed"),
            }
        }
        Ok(items)
    }
}

fn review_item(kw: &str, r: SearchResult) -> Item {
    let title = clean_text(&r.snippet.title);
    let description = clean_text(&r.snippet.description);
    Item {
        source: format!("youtube_review:{kw}"),
        body: if description.is_empty() { title.clone() } else { description },
        title: Some(title),
        url: r.id.video_id.as_deref().map(watch_url),
        published_at: r.snippet.published_at,
    }
}

impl Source for YouTubeReviews {
    fn name(&self) -> &str {
        "youtube_reviews"
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<Item>, SourceError>> {
        self.fetch_all().boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RetryPolicy;
    use mockito::Matcher;
    use std::time::Duration;

    fn http() -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(5), RetryPolicy::immediate(1)).unwrap()
    }

    #[tokio::test]
    async fn test_trending() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/v1/trending")
            .match_query(Matcher::UrlEncoded("region".into(), "US".into()))
            .with_status(200)
            .with_body(
                r#"[
                    {"type": "video", "title": "iPhone 17 Pro  teardown", "videoId": "abc123",
                     "description": "", "published": 1764892800, "viewCount": 100},
                    {"type": "video", "title": "Steam Frame hands-on", "videoId": "def456",
                     "description": "Valve's new headset"}
                ]"#,
            )
            .create_async()
            .await;

        let source = YouTubeTrending::new(http(), &format!("{}/api/v1/trending?region=US", server.url()));
        let items = source.fetch().await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].source, "youtube_trending");
        assert_eq!(items[0].title.as_deref(), Some("iPhone 17 Pro teardown"));
        assert_eq!(items[0].body, "iPhone 17 Pro teardown");
        assert_eq!(items[0].url.as_deref(), Some("https://www.youtube.com/watch?v=abc123"));
        assert_eq!(items[0].published_at.as_deref(), Some("2025-12-05T00:00:00+00:00"));
        assert_eq!(items[1].body, "Valve's new headset");
        assert_eq!(items[1].published_at, None);
    }

    #[tokio::test]
    async fn test_trending_failure_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/trending")
            .with_status(502)
            .create_async()
            .await;

        let source = YouTubeTrending::new(http(), &format!("{}/trending", server.url()));
        assert!(source.fetch().await.is_err());
    }

    #[tokio::test]
    async fn test_reviews_without_key_are_skipped() {
        let source = YouTubeReviews::new(http(), "http://127.0.0.1:9", Some("  ".into()), vec!["unboxing".into()], 5);
        assert!(source.fetch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reviews() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/youtube/v3/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "laptop review".into()),
                Matcher::UrlEncoded("maxResults".into(), "5".into()),
                Matcher::UrlEncoded("type".into(), "video".into()),
                Matcher::UrlEncoded("key".into(), "yt".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"items": [{"id": {"kind": "youtube#video", "videoId": "xyz"},
                    "snippet": {"title": "MacBook Air M4 review", "description": "Best laptop?",
                                "publishedAt": "2025-12-01T12:00:00Z"}}]}"#,
            )
            .create_async()
            .await;

        let source = YouTubeReviews::new(
            http(),
            &server.url(),
            Some("yt".into()),
            vec!["laptop review".into()],
            5,
        );
        let items = source.fetch().await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, "youtube_review:laptop review");
        assert_eq!(items[0].body, "Best laptop?");
        assert_eq!(items[0].url.as_deref(), Some("https://www.youtube.com/watch?v=xyz"));
        assert_eq!(items[0].published_at.as_deref(), Some("2025-12-01T12:00:00Z"));
    }
}
