//! The batched analysis pipeline: titles → batches → summaries → report.

use super::batcher::{titles_of, Batcher};
use super::router::{combine_summaries, refinement_prompt, RefinementRouter, ReportContext};
use super::summarizer::BatchSummarizer;
use crate::llm::TextGenerator;
use crate::models::{Item, TrendReport, TrendRun};
use crate::utils::char_len;
use chrono::Local;
use tracing::{info, instrument, warn};

/// Report text used when there was nothing to analyze. No backend is called.
pub const NO_DATA_REPORT: &str =
    "No trend report was generated: no items with titles were collected in this run.";

#[derive(Debug)]
pub struct TrendAnalyzer<F, S, L> {
    batcher: Batcher,
    summarizer: BatchSummarizer<F>,
    router: RefinementRouter<S, L>,
    context: ReportContext,
}

impl<F, S, L> TrendAnalyzer<F, S, L>
where
    F: TextGenerator,
    S: TextGenerator,
    L: TextGenerator,
{
    pub fn new(
        batcher: Batcher,
        summarizer: BatchSummarizer<F>,
        router: RefinementRouter<S, L>,
        context: ReportContext,
    ) -> Self {
        Self {
            batcher,
            summarizer,
            router,
            context,
        }
    }

    /// Run the whole analysis over `items`. Always produces a report.
    #[instrument(level = "info", skip_all, fields(items = items.len()))]
    pub async fn analyze(&self, items: &[Item]) -> TrendRun {
        let started_at = Local::now();
        let titles = titles_of(items);
        let batches = self.batcher.split(&titles);
        info!(
            titles = titles.len(),
            batches = batches.len(),
            batch_size = self.batcher.batch_size(),
            "Batched titles"
        );

        if batches.is_empty() {
            warn!("Nothing to analyze; skipping all backend calls");
            return TrendRun {
                started_at,
                finished_at: Local::now(),
                items_collected: items.len(),
                titles_analyzed: 0,
                batches,
                summaries: Vec::new(),
                combined: String::new(),
                report: TrendReport {
                    text: NO_DATA_REPORT.to_string(),
                    route: None,
                    degraded: true,
                },
            };
        }

        let summaries = self.summarizer.summarize_all(&batches).await;
        let failed = summaries.iter().filter(|s| s.failed).count();
        if failed > 0 {
            warn!(failed, total = summaries.len(), "Some batches carry a failure marker");
        }

        let combined = combine_summaries(&summaries);
        let prompt = refinement_prompt(&combined, &self.context);
        info!(combined_chars = char_len(&combined), prompt_chars = char_len(&prompt), "Running final refinement");
        let report = self.router.refine(&prompt).await;

        TrendRun {
            started_at,
            finished_at: Local::now(),
            items_collected: items.len(),
            titles_analyzed: titles.len(),
            batches,
            summaries,
            combined,
            report,
        }
    }
}
