//! Shared HTTP plumbing for the source adapters.
//!
//! Every request goes through [`HttpFetcher::send`], which retries transport
//! errors and non-2xx answers under the ingestion [`RetryPolicy`]
//! (exponential backoff with jitter).

use super::SourceError;
use crate::api::RetryPolicy;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

/// Browser-like agent; several sources serve reduced pages to unknown agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, retry })
    }

    /// Send the request produced by `build`, retrying under the policy, and
    /// return the body of the first successful response.
    #[instrument(level = "debug", skip_all, fields(%label))]
    pub async fn send<F>(&self, label: &str, build: F) -> Result<String, SourceError>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        self.retry
            .run(label, |_attempt| {
                let request = build(&self.client);
                async move {
                    let resp = request.send().await?;
                    let status = resp.status();
                    if !status.is_success() {
                        let mut url = resp.url().clone();
                        url.set_query(None);
                        return Err(SourceError::Status {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                    }
                    let body = resp.text().await?;
                    debug!(bytes = body.len(), "Fetched");
                    Ok(body)
                }
            })
            .await
            .map_err(|exhausted| exhausted.last_error)
    }

    /// GET `url` with optional query parameters and return the body.
    pub async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, SourceError> {
        self.send(url, |c| c.get(url).query(query)).await
    }

    /// GET `url` and decode the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let body = self.get_text(url, query).await?;
        decode_json(&body)
    }
}

pub fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::Decode(e.to_string()))
}
