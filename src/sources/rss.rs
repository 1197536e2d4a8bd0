//! RSS 2.0 and Atom feeds: Google News searches and the tech news feeds.
//!
//! Feeds are decoded with `quick_xml`'s serde support. A document without an
//! RSS `<channel>` is retried as an Atom `<feed>`.

use super::http::HttpFetcher;
use super::{Source, SourceError};
use crate::models::Item;
use crate::utils::{clean_text, strip_html};
use futures::future::{BoxFuture, FutureExt};
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// One feed to poll and the `source` label its items carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub label: String,
    pub url: String,
}

pub struct RssSource {
    name: &'static str,
    http: HttpFetcher,
    feeds: Vec<Feed>,
}

impl RssSource {
    /// Google News search feeds, one per query, labelled `GoogleNews`.
    pub fn google_news(http: HttpFetcher, base_url: &str, queries: &[String]) -> Self {
        let base = base_url.trim_end_matches('/');
        let feeds = queries
            .iter()
            .map(|q| Feed {
                label: "GoogleNews".to_string(),
                url: format!("{base}/rss/search?q={}", urlencoding::encode(q)),
            })
            .collect();
        Self {
            name: "google_news",
            http,
            feeds,
        }
    }

    /// Plain feeds; each item is labelled with its feed URL.
    pub fn feeds(http: HttpFetcher, urls: &[String]) -> Self {
        let feeds = urls
            .iter()
            .map(|u| Feed {
                label: u.clone(),
                url: u.clone(),
            })
            .collect();
        Self {
            name: "rss_feeds",
            http,
            feeds,
        }
    }

    #[instrument(level = "info", skip_all, fields(source = self.name, feeds = self.feeds.len()))]
    async fn fetch_all(&self) -> Result<Vec<Item>, SourceError> {
        let mut items = Vec::new();
        for feed in &self.feeds {
            let parsed = self
                .http
                .get_text(&feed.url, &[])
                .await
                .and_then(|xml| parse_feed(&xml, &feed.label));
            match parsed {
                Ok(found) => {
                    info!(feed = %feed.url, count = found.len(), "Parsed feed");
                    items.extend(found);
                }
                Err(e) => warn!(feed = %feed.url, error = %e, "Feed failed"),
            }
        }
        Ok(items)
    }
}

impl Source for RssSource {
    fn name(&self) -> &str {
        self.name
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<Item>, SourceError>> {
        self.fetch_all().boxed()
    }
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<TextNode>,
    summary: Option<TextNode>,
    content: Option<TextNode>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
}

/// Element whose attributes (`type="html"`) we ignore.
#[derive(Debug, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

/// Parse an RSS or Atom document into items labelled `label`.
pub fn parse_feed(xml: &str, label: &str) -> Result<Vec<Item>, SourceError> {
    let xml = scrub_html_entities(xml);
    let rss_err = match quick_xml::de::from_str::<Rss>(&xml) {
        Ok(rss) => return Ok(rss.channel.items.into_iter().map(|i| rss_item(i, label)).collect()),
        Err(e) => e,
    };
    if !xml.contains("<feed") {
        return Err(SourceError::Decode(format!("not an RSS or Atom document: {rss_err}")));
    }
    quick_xml::de::from_str::<AtomFeed>(&xml)
        .map(|atom| atom.entries.into_iter().map(|e| atom_entry(e, label)).collect())
        .map_err(|e| SourceError::Decode(format!("invalid Atom feed: {e}")))
}

fn rss_item(i: RssItem, label: &str) -> Item {
    let title = i.title.as_deref().map(clean_text);
    let body = i
        .description
        .as_deref()
        .map(strip_html)
        .filter(|d| !d.is_empty())
        .or_else(|| title.clone())
        .unwrap_or_default();
    Item {
        source: label.to_string(),
        title,
        body,
        url: i.link.map(|l| l.trim().to_string()),
        published_at: i.pub_date,
    }
}

fn atom_entry(e: AtomEntry, label: &str) -> Item {
    let title = e.title.map(|t| clean_text(&t.value));
    let body = e
        .summary
        .or(e.content)
        .map(|t| strip_html(&t.value))
        .filter(|d| !d.is_empty())
        .or_else(|| title.clone())
        .unwrap_or_default();
    let url = e
        .links
        .iter()
        .find(|l| l.rel.as_deref().is_none_or(|r| r == "alternate"))
        .or(e.links.first())
        .and_then(|l| l.href.clone());
    Item {
        source: label.to_string(),
        title,
        body,
        url,
        published_at: e.published.or(e.updated),
    }
}

/// HTML entities that are not defined in XML and would break the parser.
fn scrub_html_entities(s: &str) -> String {
    s.replace("&nbsp;", "&#160;")
        .replace("&ndash;", "&#8211;")
        .replace("&mdash;", "&#8212;")
        .replace("&ldquo;", "&#8220;")
        .replace("&rdquo;", "&#8221;")
        .replace("&lsquo;", "&#8216;")
        .replace("&rsquo;", "&#8217;")
        .replace("&hellip;", "&#8230;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RetryPolicy;
    use std::time::Duration;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>TechCrunch</title>
    <link>https://techcrunch.com</link>
    <item>
      <title>Robot vacuums get arms &amp; legs</title>
      <link>https://techcrunch.com/robot</link>
      <pubDate>Fri, 05 Dec 2025 10:00:00 +0000</pubDate>
      <description><![CDATA[<p>Roborock shows a vacuum with an arm.</p>]]></description>
    </item>
    <item>
      <title>No description here</title>
      <link>https://techcrunch.com/bare</link>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>The Verge</title>
  <entry>
    <title type="html">AI PCs&nbsp;arrive</title>
    <link rel="alternate" type="text/html" href="https://www.theverge.com/ai-pcs"/>
    <published>2025-12-05T09:00:00-05:00</published>
    <updated>2025-12-05T10:00:00-05:00</updated>
    <summary type="html">&lt;p&gt;Copilot+ everywhere.&lt;/p&gt;</summary>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss() {
        let items = parse_feed(RSS, "https://techcrunch.com/feed/").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].source, "https://techcrunch.com/feed/");
        assert_eq!(items[0].title.as_deref(), Some("Robot vacuums get arms & legs"));
        assert_eq!(items[0].body, "Roborock shows a vacuum with an arm.");
        assert_eq!(items[0].url.as_deref(), Some("https://techcrunch.com/robot"));
        assert_eq!(items[0].published_at.as_deref(), Some("Fri, 05 Dec 2025 10:00:00 +0000"));
        assert_eq!(items[1].body, "No description here");
        assert_eq!(items[1].published_at, None);
    }

    #[test]
    fn test_parse_atom() {
        let items = parse_feed(ATOM, "verge").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title.as_deref(), Some("AI PCs arrive"));
        assert_eq!(items[0].body, "Copilot+ everywhere.");
        assert_eq!(items[0].url.as_deref(), Some("https://www.theverge.com/ai-pcs"));
        assert_eq!(items[0].published_at.as_deref(), Some("2025-12-05T09:00:00-05:00"));
    }

    #[test]
    fn test_parse_garbage_is_decode_error() {
        assert!(matches!(
            parse_feed("<html><body>not a feed</body></html>", "x"),
            Err(SourceError::Decode(_))
        ));
    }

    #[test]
    fn test_google_news_urls_are_encoded() {
        let http = HttpFetcher::new(Duration::from_secs(1), RetryPolicy::immediate(1)).unwrap();
        let source = RssSource::google_news(http, "https://news.google.com/", &["smart home".into()]);
        assert_eq!(source.feeds[0].url, "https://news.google.com/rss/search?q=smart%20home");
        assert_eq!(source.feeds[0].label, "GoogleNews");
    }

    #[tokio::test]
    async fn test_failed_feed_is_skipped() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/good.xml")
            .with_status(200)
            .with_body(RSS)
            .create_async()
            .await;
        let _bad = server
            .mock("GET", "/bad.xml")
            .with_status(500)
            .create_async()
            .await;

        let http = HttpFetcher::new(Duration::from_secs(5), RetryPolicy::immediate(1)).unwrap();
        let source = RssSource::feeds(
            http,
            &[format!("{}/bad.xml", server.url()), format!("{}/good.xml", server.url())],
        );
        let items = source.fetch().await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].source.ends_with("/good.xml"));
    }
}
