//! Run configuration.
//!
//! Values are layered in this order, later layers winning:
//!
//! 1. built-in defaults ([`AppConfig::default`])
//! 2. an optional YAML file (`--config`)
//! 3. command-line flags and their environment variables ([`crate::cli::Cli`])
//!
//! Credentials never come from the YAML file. [`AppConfig::validate`] runs
//! once at startup; any error there is fatal and happens before the first
//! network call. A missing credential is not an error: the affected backend
//! or source degrades instead.

use crate::analysis::router::DEFAULT_ROUTING_THRESHOLD;
use crate::api::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub models: ModelConfig,
    pub endpoints: EndpointConfig,
    pub sources: SourcesConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Titles per summarization call.
    pub batch_size: usize,
    /// Refinement prompts shorter than this many characters go to the
    /// small-context model.
    pub routing_threshold: usize,
    /// Batches summarized concurrently. 1 keeps the calls strictly sequential.
    pub summarize_concurrency: usize,
    pub summarize_attempts: usize,
    pub summarize_retry_delay_secs: u64,
    /// Per-request timeout for LLM calls.
    pub llm_timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            routing_threshold: DEFAULT_ROUTING_THRESHOLD,
            summarize_concurrency: 1,
            summarize_attempts: 3,
            summarize_retry_delay_secs: 2,
            llm_timeout_secs: 300,
        }
    }
}

impl AnalysisConfig {
    pub fn summarize_retry(&self) -> RetryPolicy {
        RetryPolicy::fixed(
            self.summarize_attempts,
            Duration::from_secs(self.summarize_retry_delay_secs),
        )
    }
}

/// Model identifiers for the three roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Cheap model for per-batch summaries.
    pub fast: String,
    /// Model for refinement prompts under the routing threshold.
    pub small_context: String,
    /// Long-context model for everything else.
    pub large_context: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            fast: "gpt-4.1-mini".to_string(),
            small_context: "gpt-4.1".to_string(),
            large_context: "gemini-2.5-pro".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub openai_base_url: String,
    pub gemini_base_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            openai_base_url: crate::llm::openai::DEFAULT_BASE_URL.to_string(),
            gemini_base_url: crate::llm::gemini::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub http_timeout_secs: u64,
    /// Attempts per HTTP request made by the adapters.
    pub fetch_attempts: usize,
    pub fetch_backoff_base_ms: u64,
    pub fetch_backoff_max_ms: u64,
    pub fetch_backoff_jitter_ms: u64,

    pub newsapi_base_url: String,
    pub news_categories: Vec<String>,
    pub news_days_back: i64,
    pub news_page_size: u32,

    pub reddit_base_url: String,
    pub subreddits: Vec<String>,
    pub reddit_limit: u32,

    pub amazon_url: String,

    pub google_news_base_url: String,
    pub google_news_queries: Vec<String>,
    pub rss_feeds: Vec<String>,

    pub youtube_trending_url: String,
    pub youtube_api_base_url: String,
    pub youtube_review_keywords: Vec<String>,
    pub youtube_max_results: u32,

    pub product_hunt: bool,
    pub product_hunt_url: String,

    pub shopping_trends: bool,
    pub shopping_trends_url: String,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: 15,
            fetch_attempts: 3,
            fetch_backoff_base_ms: 1_000,
            fetch_backoff_max_ms: 30_000,
            fetch_backoff_jitter_ms: 250,

            newsapi_base_url: "https://newsapi.org".to_string(),
            news_categories: strings(&[
                "technology",
                "gadgets",
                "consumer electronics",
                "AI",
                "smart home",
                "robotics",
            ]),
            news_days_back: 1,
            news_page_size: 30,

            reddit_base_url: "https://www.reddit.com".to_string(),
            subreddits: strings(&[
                "technology",
                "gadgets",
                "technews",
                "hardware",
                "Apple",
                "Android",
                "HomeAutomation",
            ]),
            reddit_limit: 50,

            amazon_url: "https://www.amazon.com/Best-Sellers-Electronics/zgbs/electronics"
                .to_string(),

            google_news_base_url: "https://news.google.com".to_string(),
            google_news_queries: strings(&[
                "smart home",
                "consumer electronics",
                "gadgets",
                "robot vacuum",
                "AI tools",
                "wireless earbuds",
            ]),
            rss_feeds: strings(&[
                "https://techcrunch.com/feed/",
                "https://www.theverge.com/rss/index.xml",
                "https://www.wired.com/feed/rss",
                "https://www.engadget.com/rss.xml",
                "https://www.gsmarena.com/rss-news-reviews.php3",
            ]),

            youtube_trending_url: "https://invidious.projectsegfau.lt/api/v1/trending?region=US"
                .to_string(),
            youtube_api_base_url: "https://www.googleapis.com".to_string(),
            youtube_review_keywords: strings(&[
                "tech review",
                "unboxing",
                "smart home review",
                "gadget review",
                "laptop review",
                "headphones review",
            ]),
            youtube_max_results: 25,

            product_hunt: false,
            product_hunt_url: "https://api.producthunt.com/v2/api/graphql".to_string(),

            shopping_trends: false,
            shopping_trends_url: "https://trends-production.api.semrush.com/shopping/trends?country=us"
                .to_string(),
        }
    }
}

impl SourcesConfig {
    /// Ingestion retry policy. A zero base delay retries without waiting.
    pub fn fetch_retry(&self) -> RetryPolicy {
        if self.fetch_backoff_base_ms == 0 {
            return RetryPolicy::immediate(self.fetch_attempts);
        }
        RetryPolicy::exponential(
            self.fetch_attempts,
            Duration::from_millis(self.fetch_backoff_base_ms),
            Duration::from_millis(self.fetch_backoff_max_ms),
            Duration::from_millis(self.fetch_backoff_jitter_ms),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_path: PathBuf,
    /// Also write the full run record as JSON when set.
    pub json_output_path: Option<PathBuf>,
    /// Who the brief is addressed to.
    pub audience: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("trend_report.txt"),
            json_output_path: None,
            audience: "a major European consumer electronics retailer (MediaMarkt/Saturn style)"
                .to_string(),
        }
    }
}

/// API keys, read from the environment or the command line only.
#[derive(Clone, Default, PartialEq)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub newsapi_key: Option<String>,
    pub youtube_api_key: Option<String>,
    pub product_hunt_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set = |v: &Option<String>| if v.is_some() { "<set>" } else { "<missing>" };
        f.debug_struct("Credentials")
            .field("openai_api_key", &set(&self.openai_api_key))
            .field("gemini_api_key", &set(&self.gemini_api_key))
            .field("newsapi_key", &set(&self.newsapi_key))
            .field("youtube_api_key", &set(&self.youtube_api_key))
            .field("product_hunt_api_key", &set(&self.product_hunt_api_key))
            .finish()
    }
}

impl AppConfig {
    /// Load a YAML config file. Missing sections and fields take their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Reject settings that would make the run meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.analysis;
        if a.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be greater than 0".into()));
        }
        if a.routing_threshold == 0 {
            return Err(ConfigError::Invalid(
                "routing_threshold must be greater than 0".into(),
            ));
        }
        if a.summarize_attempts == 0 {
            return Err(ConfigError::Invalid(
                "summarize_attempts must be greater than 0".into(),
            ));
        }
        if a.summarize_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "summarize_concurrency must be greater than 0".into(),
            ));
        }
        for (role, model) in [
            ("fast", &self.models.fast),
            ("small_context", &self.models.small_context),
            ("large_context", &self.models.large_context),
        ] {
            if model.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("models.{role} must not be empty")));
            }
        }
        if self.report.output_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("report.output_path must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = AppConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.analysis.batch_size, 100);
        assert_eq!(cfg.analysis.routing_threshold, 20_000);
        assert_eq!(cfg.models.fast, "gpt-4.1-mini");
        assert_eq!(cfg.models.large_context, "gemini-2.5-pro");
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let cfg = AppConfig::from_yaml_str(
            "analysis:\n  batch_size: 25\nmodels:\n  large_context: gemini-1.5-pro-latest\n",
        )
        .unwrap();
        assert_eq!(cfg.analysis.batch_size, 25);
        assert_eq!(cfg.analysis.routing_threshold, 20_000);
        assert_eq!(cfg.models.large_context, "gemini-1.5-pro-latest");
        assert_eq!(cfg.models.fast, "gpt-4.1-mini");
        assert_eq!(cfg.sources.subreddits.len(), 7);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(AppConfig::from_yaml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_negative_batch_size_is_a_parse_error() {
        assert!(AppConfig::from_yaml_str("analysis:\n  batch_size: -5\n").is_err());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut cfg = AppConfig::default();
        cfg.analysis.batch_size = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let mut cfg = AppConfig::default();
        cfg.analysis.routing_threshold = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_empty_model_rejected() {
        let mut cfg = AppConfig::default();
        cfg.models.small_context = "  ".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("models.small_context"));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = AppConfig::from_yaml_file(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_credentials_debug_hides_values() {
        let creds = Credentials {
            openai_api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        let dbg = format!("{creds:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("<set>"));
    }

    #[test]
    fn test_retry_policies() {
        let cfg = AppConfig::default();
        assert_eq!(
            cfg.analysis.summarize_retry(),
            RetryPolicy::fixed(3, Duration::from_secs(2))
        );
        assert_eq!(cfg.sources.fetch_retry().max_attempts, 3);

        let mut sources = SourcesConfig::default();
        sources.fetch_backoff_base_ms = 0;
        assert_eq!(sources.fetch_retry(), RetryPolicy::immediate(3));
    }
}
