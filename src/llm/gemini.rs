//! Google Gemini `generateContent` client, used for long prompts.

use super::{LlmError, TextGenerator};
use crate::utils::{char_len, truncate_for_log};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// The key travels in a header so it never appears in a request URL.
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateBody {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiClient {
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

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    #[instrument(level = "info", skip_all, fields(model = %self.model, prompt_chars = char_len(prompt)))]
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingCredential {
            backend: "gemini",
            var: "GEMINI_API_KEY",
        })?;

        let t0 = Instant::now();
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            urlencoding::encode(&self.model)
        );
        let resp = self
            .http
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .json(&GenerateRequest {
                contents: vec![Content {
                    parts: vec![Part { text: prompt }],
                }],
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), elapsed_ms = t0.elapsed().as_millis() as u64, "Gemini call failed");
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body, 300),
            });
        }

        let body: GenerateBody = resp.json().await?;
        let text = candidate_text(&body).ok_or(LlmError::EmptyResponse)?;
        debug!(elapsed_ms = t0.elapsed().as_millis() as u64, chars = char_len(&text), "Gemini call succeeded");
        Ok(text)
    }
}

fn candidate_text(body: &GenerateBody) -> Option<String> {
    let text: String = body
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();
    if text.trim().is_empty() { None } else { Some(text) }
}
