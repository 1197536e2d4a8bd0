//! Per-batch summarization against the fast backend.
//!
//! Every batch gets the same retry budget. A batch that still fails is not
//! dropped: its summary becomes [`failure_marker`] so the refinement pass (and
//! the reader of the final report) can see the gap.

use crate::api::RetryPolicy;
use crate::llm::TextGenerator;
use crate::models::{Batch, BatchSummary};
use crate::utils::char_len;
use futures::stream::{self, StreamExt};
use std::time::Instant;
use tracing::{error, info, instrument};

/// Text substituted for a batch whose summarization never succeeded.
pub fn failure_marker(attempts: usize) -> String {
    format!("ERROR: batch summarization failed after {attempts} attempts")
}

#[derive(Debug)]
pub struct BatchSummarizer<G> {
    backend: G,
    retry: RetryPolicy,
    concurrency: usize,
}

impl<G: TextGenerator> BatchSummarizer<G> {
    pub fn new(backend: G, retry: RetryPolicy) -> Self {
        Self {
            backend,
            retry,
            concurrency: 1,
        }
    }

    /// Allow up to `concurrency` batches in flight. Output order is unaffected.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Summarize every batch. The result is aligned 1:1 with `batches`.
    #[instrument(level = "info", skip_all, fields(batches = batches.len(), concurrency = self.concurrency))]
    pub async fn summarize_all(&self, batches: &[Batch]) -> Vec<BatchSummary> {
        let total = batches.len();
        // `buffered` yields in submission order, so placement follows batch
        // index regardless of which call returns first.
        stream::iter(batches)
            .map(|batch| async move {
                info!(batch = batch.index + 1, total, titles = batch.titles.len(), "Summarizing batch");
                self.summarize(batch).await
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Summarize one batch under the retry policy.
    pub async fn summarize(&self, batch: &Batch) -> BatchSummary {
        let prompt = batch.render_prompt();
        let label = format!("batch {} via {}", batch.index + 1, self.backend.name());
        let t0 = Instant::now();

        match self
            .retry
            .run(&label, |_attempt| self.backend.generate(&prompt))
            .await
        {
            Ok(text) => {
                info!(
                    batch = batch.index + 1,
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    chars = char_len(&text),
                    "Batch summarized"
                );
                BatchSummary {
                    index: batch.index,
                    text,
                    failed: false,
                }
            }
            Err(exhausted) => {
                error!(
                    batch = batch.index + 1,
                    attempts = exhausted.attempts,
                    error = %exhausted.last_error,
                    "Batch summarization failed; substituting marker"
                );
                BatchSummary {
                    index: batch.index,
                    text: failure_marker(exhausted.attempts),
                    failed: true,
                }
            }
        }
    }
}
