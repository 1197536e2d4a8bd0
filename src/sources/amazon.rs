//! Amazon electronics best-seller list, scraped from HTML.
//!
//! Each product tile (`.zg-grid-general-faceout`) yields one item. The title
//! comes from the truncated title element or, failing that, the image alt
//! text; tiles without either are skipped.

use super::http::HttpFetcher;
use super::{Source, SourceError};
use crate::models::Item;
use crate::utils::clean_text;
use futures::future::{BoxFuture, FutureExt};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, instrument};
use url::Url;

const AMAZON_BASE_URL: &str = "https://www.amazon.com";

static TILE: Lazy<Selector> = Lazy::new(|| Selector::parse(".zg-grid-general-faceout").unwrap());
static TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".p13n-sc-truncate-desktop-type2").unwrap());
static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a.a-link-normal").unwrap());
static RANK: Lazy<Selector> = Lazy::new(|| Selector::parse(".zg-bdg-text").unwrap());

pub struct AmazonBestSellers {
    http: HttpFetcher,
    url: String,
}

impl AmazonBestSellers {
    pub fn new(http: HttpFetcher, url: &str) -> Self {
        Self {
            http,
            url: url.to_string(),
        }
    }

    #[instrument(level = "info", skip_all, fields(url = %self.url))]
    async fn fetch_all(&self) -> Result<Vec<Item>, SourceError> {
        let html = self
            .http
            .send(&self.url, |c| {
                c.get(&self.url).header("Accept-Language", "en-US,en;q=0.9")
            })
            .await?;
        let items = parse_best_sellers(&html);
        info!(count = items.len(), "Scraped Amazon best sellers");
        Ok(items)
    }
}

/// Extract product items from a best-seller page.
pub fn parse_best_sellers(html: &str) -> Vec<Item> {
    let base = Url::parse(AMAZON_BASE_URL).ok();
    let document = Html::parse_document(html);
    document
        .select(&TILE)
        .filter_map(|tile| parse_tile(tile, base.as_ref()))
        .collect()
}

fn parse_tile(tile: ElementRef<'_>, base: Option<&Url>) -> Option<Item> {
    let title = tile
        .select(&TITLE)
        .next()
        .map(|e| clean_text(&e.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .or_else(|| {
            tile.select(&IMAGE)
                .next()
                .and_then(|img| img.value().attr("alt"))
                .map(clean_text)
                .filter(|t| !t.is_empty())
        })?;

    let url = tile
        .select(&LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| base.and_then(|b| b.join(href).ok()))
        .map(|u| u.to_string());

    let rank = tile
        .select(&RANK)
        .next()
        .map(|e| clean_text(&e.text().collect::<String>()))
        .unwrap_or_else(|| "unknown".to_string());

    Some(Item {
        source: "amazon".to_string(),
        body: format!("{title} (Amazon Best Seller Rank: {rank})"),
        title: Some(title),
        url,
        published_at: None,
    })
}

impl Source for AmazonBestSellers {
    fn name(&self) -> &str {
        "amazon"
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<Item>, SourceError>> {
        self.fetch_all().boxed()
    }
}
