//! Command-line interface definitions for the trend engine.
//!
//! Every option can also come from an environment variable. Options left
//! unset keep the value from the YAML config file (or the built-in default),
//! see [`Cli::apply_to`].

use crate::config::{AppConfig, Credentials};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for a trend analysis run.
///
/// # Examples
///
/// ```sh
/// # Defaults: report written to ./trend_report.txt
/// trend_engine
///
/// # Custom config, JSON run record, and a lower routing threshold
/// trend_engine -c trends.yaml -o out/report.txt --json-output out/run.json \
///     --routing-threshold 15000
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "TREND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Where to write the text report
    #[arg(short, long, env = "TREND_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Also write the full run record as JSON to this path
    #[arg(short, long)]
    pub json_output: Option<PathBuf>,

    /// Titles per summarization batch
    #[arg(long, env = "TREND_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Combined summaries shorter than this (in characters) go to the small-context model
    #[arg(long, env = "TREND_ROUTING_THRESHOLD")]
    pub routing_threshold: Option<usize>,

    /// Batches summarized at the same time
    #[arg(long)]
    pub summarize_concurrency: Option<usize>,

    /// Model used for batch summaries
    #[arg(long, env = "TREND_FAST_MODEL")]
    pub fast_model: Option<String>,

    /// Model used to refine short inputs
    #[arg(long, env = "TREND_SMALL_CONTEXT_MODEL")]
    pub small_context_model: Option<String>,

    /// Model used to refine long inputs
    #[arg(long, env = "TREND_LARGE_CONTEXT_MODEL")]
    pub large_context_model: Option<String>,

    /// Who the report is addressed to
    #[arg(long)]
    pub audience: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Google Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// NewsAPI key
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    pub newsapi_key: Option<String>,

    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub youtube_api_key: Option<String>,

    /// Product Hunt developer token
    #[arg(long, env = "PRODUCT_HUNT_API_KEY", hide_env_values = true)]
    pub product_hunt_api_key: Option<String>,
}

impl Cli {
    /// Overlay the options that were given onto `cfg`.
    pub fn apply_to(&self, cfg: &mut AppConfig) {
        if let Some(path) = &self.output {
            cfg.report.output_path = path.clone();
        }
        if let Some(path) = &self.json_output {
            cfg.report.json_output_path = Some(path.clone());
        }
        if let Some(audience) = &self.audience {
            cfg.report.audience = audience.clone();
        }
        if let Some(n) = self.batch_size {
            cfg.analysis.batch_size = n;
        }
        if let Some(n) = self.routing_threshold {
            cfg.analysis.routing_threshold = n;
        }
        if let Some(n) = self.summarize_concurrency {
            cfg.analysis.summarize_concurrency = n;
        }
        if let Some(m) = &self.fast_model {
            cfg.models.fast = m.clone();
        }
        if let Some(m) = &self.small_context_model {
            cfg.models.small_context = m.clone();
        }
        if let Some(m) = &self.large_context_model {
            cfg.models.large_context = m.clone();
        }
    }

    /// API keys; blank values count as missing.
    pub fn credentials(&self) -> Credentials {
        let key = |v: &Option<String>| v.clone().filter(|k| !k.trim().is_empty());
        Credentials {
            openai_api_key: key(&self.openai_api_key),
            gemini_api_key: key(&self.gemini_api_key),
            newsapi_key: key(&self.newsapi_key),
            youtube_api_key: key(&self.youtube_api_key),
            product_hunt_api_key: key(&self.product_hunt_api_key),
        }
    }
}
