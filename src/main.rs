//! # Trend Engine
//!
//! A consumer-electronics trend pipeline. It collects headlines from public
//! sources, condenses them batch by batch with a fast LLM, and refines the
//! combined summaries into a structured trend report with a model chosen by
//! input size.
//!
//! ## Features
//!
//! - Collects items from NewsAPI, Reddit, Amazon best sellers, Google News,
//!   tech RSS/Atom feeds and YouTube, plus opt-in Product Hunt and shopping
//!   trends
//! - Summarizes titles in fixed-size batches with retries and a failure marker
//! - Routes the refinement prompt to a small-context (OpenAI) or
//!   large-context (Gemini) model by character count
//! - Writes the report as text, and optionally the whole run as JSON
//!
//! ## Usage
//!
//! ```sh
//! OPENAI_API_KEY=... GEMINI_API_KEY=... trend_engine -o trend_report.txt
//! ```
//!
//! ## Architecture
//!
//! 1. **Collection**: run every source in a fixed order; failed sources add nothing
//! 2. **Batching**: keep titled items, split titles into batches
//! 3. **Summarizing**: one fast-model call per batch (retried, never fatal)
//! 4. **Refinement**: one call to the routed model; errors become report text
//! 5. **Output**: text report on disk and stdout, optional JSON run record

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod analysis;
mod api;
mod cli;
mod config;
mod llm;
mod models;
mod outputs;
mod sources;
mod utils;

use analysis::batcher::Batcher;
use analysis::pipeline::TrendAnalyzer;
use analysis::router::{RefinementRouter, ReportContext};
use analysis::summarizer::BatchSummarizer;
use cli::Cli;
use config::{AppConfig, ConfigError};
use llm::{GeminiClient, OpenAiClient};
use outputs::{json, report};
use sources::http::HttpFetcher;
use utils::ensure_parent_writable;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // A missing .env is fine; real environment variables still apply.
    let dotenv = dotenvy::dotenv().ok();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!(dotenv = ?dotenv, "trend_engine starting up");

    // ---- Configuration (fatal on error) ----
    let args = Cli::parse();
    let mut cfg = match &args.config {
        Some(path) => {
            let cfg = AppConfig::from_yaml_file(path)?;
            info!(path = %path.display(), "Loaded configuration");
            cfg
        }
        None => AppConfig::default(),
    };
    args.apply_to(&mut cfg);
    if let Err(e) = cfg.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }
    let creds = args.credentials();
    debug!(?cfg, ?creds, "Effective configuration");

    // Early check: fail before any network work if the report can't be written
    for path in std::iter::once(&cfg.report.output_path).chain(cfg.report.json_output_path.as_ref()) {
        if let Err(e) = ensure_parent_writable(path).await {
            error!(
                path = %path.display(),
                error = %e,
                "Output location is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    // ---- Collect ----
    let http = HttpFetcher::new(
        Duration::from_secs(cfg.sources.http_timeout_secs),
        cfg.sources.fetch_retry(),
    )?;
    let source_list = sources::build_sources(&cfg.sources, &creds, &http);
    let items = sources::collect_items(&source_list).await;
    info!(count = items.len(), "Total items collected");

    // ---- Backends ----
    let llm_http = llm::http_client(Duration::from_secs(cfg.analysis.llm_timeout_secs))?;
    let fast = OpenAiClient::new(
        llm_http.clone(),
        cfg.endpoints.openai_base_url.as_str(),
        creds.openai_api_key.clone(),
        cfg.models.fast.as_str(),
    );
    let small = OpenAiClient::new(
        llm_http.clone(),
        cfg.endpoints.openai_base_url.as_str(),
        creds.openai_api_key.clone(),
        cfg.models.small_context.as_str(),
    );
    let large = GeminiClient::new(
        llm_http,
        cfg.endpoints.gemini_base_url.as_str(),
        creds.gemini_api_key.clone(),
        cfg.models.large_context.as_str(),
    );
    if !fast.has_credential() {
        warn!(model = fast.model(), "OPENAI_API_KEY is not set; summaries and small-context refinement will fail");
    }
    if !large.has_credential() {
        warn!("GEMINI_API_KEY is not set; large-context refinement will fail");
    }

    // ---- Analyze ----
    let batcher = Batcher::new(cfg.analysis.batch_size)
        .ok_or_else(|| ConfigError::Invalid("batch_size must be greater than 0".into()))?;
    let summarizer = BatchSummarizer::new(fast, cfg.analysis.summarize_retry())
        .with_concurrency(cfg.analysis.summarize_concurrency);
    let router = RefinementRouter::new(small, large, cfg.analysis.routing_threshold);
    info!(
        batch_size = batcher.batch_size(),
        threshold = router.threshold(),
        concurrency = cfg.analysis.summarize_concurrency,
        "Analysis configured"
    );
    let context = ReportContext {
        date: Local::now().date_naive(),
        audience: cfg.report.audience.clone(),
    };
    let analyzer = TrendAnalyzer::new(batcher, summarizer, router, context);
    let run = analyzer.analyze(&items).await;

    // ---- Output ----
    report::write_report(&run.report, &cfg.report.output_path).await?;
    report::print_report(&mut std::io::stdout().lock(), &run.report)?;

    if let Some(path) = &cfg.report.json_output_path {
        if let Err(e) = json::write_run(&run, path).await {
            error!(path = %path.display(), error = %e, "Failed to write JSON run record");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        route = ?run.report.route,
        degraded = run.report.degraded,
        "Execution complete"
    );

    Ok(())
}
