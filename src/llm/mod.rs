//! Text-generation backends.
//!
//! The pipeline only knows the [`TextGenerator`] capability: send a prompt,
//! get text back. Two concrete clients implement it:
//!
//! | Client | Used for | API |
//! |--------|----------|-----|
//! | [`OpenAiClient`] | batch summaries, small-context refinement | Responses API |
//! | [`GeminiClient`] | large-context refinement | `generateContent` |
//!
//! A client built without credentials stays usable: every call returns
//! [`LlmError::MissingCredential`], which the callers turn into marker or
//! error text instead of aborting the run.

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

pub mod gemini;
pub mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// Errors a backend call can produce.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("{backend} has no credential; set {var}")]
    MissingCredential {
        backend: &'static str,
        var: &'static str,
    },
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("backend returned no text")]
    EmptyResponse,
}

/// The URL is dropped: endpoints may carry credentials.
impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e.without_url())
    }
}

/// A backend that turns a prompt into text.
///
/// Implementations perform a single request/response exchange. Retrying is
/// the caller's concern.
pub trait TextGenerator {
    /// Short label used in logs and error texts.
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// HTTP client for LLM calls. Long prompts take a while, hence the generous timeout.
pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("trend_engine/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
}
