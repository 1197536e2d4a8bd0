//! Source adapters and the item collector.
//!
//! Each adapter turns one public source into a list of [`Item`]s. The
//! collector runs them one after another in a fixed order and concatenates
//! the results; a failing source contributes nothing and the run continues.
//!
//! # Sources
//!
//! | Source | Module | Method | Credential |
//! |--------|--------|--------|------------|
//! | NewsAPI | [`newsapi`] | JSON API, one call per category | `NEWSAPI_KEY` |
//! | Reddit | [`reddit`] | `hot.json` per subreddit | none |
//! | Amazon best sellers | [`amazon`] | HTML scraping | none |
//! | Google News | [`rss`] | RSS search per query | none |
//! | Tech feeds | [`rss`] | RSS/Atom | none |
//! | YouTube trending | [`youtube`] | Invidious API | none |
//! | YouTube reviews | [`youtube`] | Data API search per keyword | `YOUTUBE_API_KEY` |
//! | Product Hunt | [`producthunt`] | GraphQL (opt-in) | `PRODUCT_HUNT_API_KEY` |
//! | Shopping trends | [`shopping`] | SEMrush JSON (opt-in) | none |
//!
//! Adapters that need a missing credential log a warning and return no items.

use crate::config::{Credentials, SourcesConfig};
use crate::models::Item;
use futures::future::BoxFuture;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, instrument, warn};

pub mod amazon;
pub mod http;
pub mod newsapi;
pub mod producthunt;
pub mod reddit;
pub mod rss;
pub mod shopping;
pub mod youtube;

use http::HttpFetcher;

/// Why a source produced nothing.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),
    /// `url` has its query string removed.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("source reported an error: {0}")]
    Upstream(String),
}

/// The URL is dropped: API keys travel in query strings.
impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e.without_url())
    }
}

/// One data source.
///
/// `fetch` returns a boxed future so heterogeneous adapters can live in one
/// list.
pub trait Source: Send + Sync {
    fn name(&self) -> &str;

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<Item>, SourceError>>;
}

/// Run every source in order and concatenate their items.
#[instrument(level = "info", skip_all, fields(sources = sources.len()))]
pub async fn collect_items(sources: &[Box<dyn Source>]) -> Vec<Item> {
    let mut items = Vec::new();
    for source in sources {
        let t0 = Instant::now();
        match source.fetch().await {
            Ok(found) => {
                info!(
                    source = source.name(),
                    count = found.len(),
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "Collected items"
                );
                items.extend(found);
            }
            Err(e) => {
                warn!(source = source.name(), error = %e, "Source failed; contributing no items");
            }
        }
    }
    info!(total = items.len(), "Collection finished");
    items
}

/// Build the configured sources in their fixed collection order.
pub fn build_sources(
    cfg: &SourcesConfig,
    creds: &Credentials,
    http: &HttpFetcher,
) -> Vec<Box<dyn Source>> {
    let mut sources: Vec<Box<dyn Source>> = vec![
        Box::new(newsapi::NewsApiSource::new(
            http.clone(),
            &cfg.newsapi_base_url,
            creds.newsapi_key.clone(),
            cfg.news_categories.clone(),
            cfg.news_days_back,
            cfg.news_page_size,
        )),
        Box::new(reddit::RedditSource::new(
            http.clone(),
            &cfg.reddit_base_url,
            cfg.subreddits.clone(),
            cfg.reddit_limit,
        )),
        Box::new(amazon::AmazonBestSellers::new(http.clone(), &cfg.amazon_url)),
        Box::new(rss::RssSource::google_news(
            http.clone(),
            &cfg.google_news_base_url,
            &cfg.google_news_queries,
        )),
        Box::new(rss::RssSource::feeds(http.clone(), &cfg.rss_feeds)),
        Box::new(youtube::YouTubeTrending::new(http.clone(), &cfg.youtube_trending_url)),
        Box::new(youtube::YouTubeReviews::new(
            http.clone(),
            &cfg.youtube_api_base_url,
            creds.youtube_api_key.clone(),
            cfg.youtube_review_keywords.clone(),
            cfg.youtube_max_results,
        )),
    ];

    if cfg.product_hunt {
        sources.push(Box::new(producthunt::ProductHuntSource::new(
            http.clone(),
            &cfg.product_hunt_url,
            creds.product_hunt_api_key.clone(),
        )));
    }
    if cfg.shopping_trends {
        sources.push(Box::new(shopping::ShoppingTrendsSource::new(
            http.clone(),
            &cfg.shopping_trends_url,
        )));
    }

    let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
    info!(?names, "Configured sources");
    sources
}
