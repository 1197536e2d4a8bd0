//! OpenAI Responses API client.
//!
//! Sends `{"model": ..., "input": prompt}` to `{base_url}/v1/responses` and
//! concatenates every `output_text` part of the answer.

use super::{LlmError, TextGenerator};
use crate::utils::{char_len, truncate_for_log};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

impl TextGenerator for OpenAiClient {
    fn name(&self) -> &str {
        &self.model
    }

    #[instrument(level = "info", skip_all, fields(model = %self.model, prompt_chars = char_len(prompt)))]
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingCredential {
            backend: "openai",
            var: "OPENAI_API_KEY",
        })?;

        let t0 = Instant::now();
        let resp = self
            .http
            .post(format!("{}/v1/responses", self.base_url))
            .bearer_auth(api_key)
            .json(&ResponsesRequest {
                model: &self.model,
                input: prompt,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), elapsed_ms = t0.elapsed().as_millis() as u64, "OpenAI call failed");
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body, 300),
            });
        }

        let body: ResponsesBody = resp.json().await?;
        let text = output_text(&body).ok_or(LlmError::EmptyResponse)?;
        debug!(elapsed_ms = t0.elapsed().as_millis() as u64, chars = char_len(&text), "OpenAI call succeeded");
        Ok(text)
    }
}

fn output_text(body: &ResponsesBody) -> Option<String> {
    let text: String = body
        .output
        .iter()
        .flat_map(|item| item.content.iter())
        .filter(|part| part.kind == "output_text")
        .filter_map(|part| part.text.as_deref())
        .collect();
    if text.trim().is_empty() { None } else { Some(text) }
}
