//! Reddit hot posts through the public `hot.json` listing.

use super::http::{decode_json, HttpFetcher};
use super::{Source, SourceError};
use crate::models::Item;
use crate::utils::clean_text;
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// Reddit rejects browser agents without cookies; it wants an app identifier.
const REDDIT_USER_AGENT: &str = "trend-agent/1.0";

pub struct RedditSource {
    http: HttpFetcher,
    base_url: String,
    subreddits: Vec<String>,
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: String,
    #[serde(default)]
    selftext: Option<String>,
    permalink: String,
    created_utc: f64,
}

impl RedditSource {
    pub fn new(http: HttpFetcher, base_url: &str, subreddits: Vec<String>, limit: u32) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            subreddits,
            limit,
        }
    }

    #[instrument(level = "info", skip_all)]
    async fn fetch_all(&self) -> Result<Vec<Item>, SourceError> {
        let limit = self.limit.to_string();
        let mut items = Vec::new();

        for sub in &self.subreddits {
            let url = format!("{}/r/{}/hot.json", self.base_url, sub);
            let result = self
                .http
                .send(&url, |c| {
                    c.get(&url)
                        .header(USER_AGENT, REDDIT_USER_AGENT)
                        .query(&[("limit", limit.as_str())])
                })
                .await
                .and_then(|body| decode_json::<Listing>(&body));

            match result {
                Ok(listing) => {
                    let before = items.len();
                    items.extend(
                        listing
                            .data
                            .children
                            .into_iter()
                            .map(|c| to_item(sub, &self.base_url, c.data)),
                    );
                    info!(subreddit = %sub, count = items.len() - before, "Fetched Reddit posts");
                }
                Err(e) => warn!(subreddit = %sub, error = %e, "Reddit fetch failed"),
            }
        }
        Ok(items)
    }
}

fn to_item(sub: &str, base_url: &str, p: Post) -> Item {
    let title = clean_text(&p.title);
    let body = p
        .selftext
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| title.clone());
    Item {
        source: format!("reddit/{sub}"),
        title: Some(title),
        body,
        url: Some(format!("{base_url}{}", p.permalink)),
        published_at: DateTime::<Utc>::from_timestamp(p.created_utc as i64, 0)
            .map(|dt| dt.to_rfc3339()),
    }
}

impl Source for RedditSource {
    fn name(&self) -> &str {
        "reddit"
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<Item>, SourceError>> {
        self.fetch_all().boxed()
    }
}
