//! Data models shared by the ingestion and analysis stages.
//!
//! - [`Item`]: one normalized record produced by a source adapter
//! - [`Batch`]: an ordered group of titles summarized in one LLM call
//! - [`BatchSummary`]: the fast model's answer for one batch (or a failure marker)
//! - [`TrendReport`]: the final text produced by the refinement pass
//! - [`TrendRun`]: everything derived during one run, for the JSON sink
//!
//! Items are created per run and never mutated; everything else is derived
//! from them and lives only for the duration of the run.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A single collected unit of text with provenance metadata.
///
/// Only `title` is consumed by the analysis pipeline. The other fields are
/// kept so the run record shows where each title came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Origin identifier (site, subreddit, feed URL, ...).
    pub source: String,
    /// Short text. Items without a usable title are dropped before batching.
    pub title: Option<String>,
    /// Longer text or description; may repeat the title.
    pub body: String,
    /// Optional link back to the original record.
    pub url: Option<String>,
    /// Timestamp as reported by the source. Format is source-dependent.
    pub published_at: Option<String>,
}

impl Item {
    /// The trimmed title, or `None` if it is absent or blank.
    pub fn usable_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// An ordered, bounded group of titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Position of this batch in collection order, starting at 0.
    pub index: usize,
    pub titles: Vec<String>,
}

/// Summary text for one batch, aligned by `index` with its [`Batch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub index: usize,
    pub text: String,
    /// True when `text` is the failure marker rather than model output.
    pub failed: bool,
}

/// Which refinement backend produced the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    SmallContext,
    LargeContext,
}

/// The terminal artifact of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendReport {
    pub text: String,
    /// `None` when the run short-circuited because there was nothing to analyze.
    pub route: Option<Route>,
    /// True when `text` is an error text instead of a model answer.
    pub degraded: bool,
}

/// Everything derived during one run, in the order it was produced.
#[derive(Debug, Serialize)]
pub struct TrendRun {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub items_collected: usize,
    pub titles_analyzed: usize,
    pub batches: Vec<Batch>,
    pub summaries: Vec<BatchSummary>,
    pub combined: String,
    pub report: TrendReport,
}
