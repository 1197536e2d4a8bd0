//! Final refinement pass and size-based backend selection.
//!
//! The batch summaries are joined into one text, embedded into the report
//! prompt, and sent to exactly one of two backends:
//!
//! ```text
//! chars(prompt) <  threshold  -> small-context backend
//! chars(prompt) >= threshold  -> large-context backend
//! ```
//!
//! Character count (not bytes, not tokens) is the only input to the decision.
//! Neither call is retried here, and a failure becomes the report text.

use crate::llm::TextGenerator;
use crate::models::{BatchSummary, Route, TrendReport};
use crate::utils::char_len;
use chrono::{Datelike, NaiveDate};
use itertools::Itertools;
use tracing::{info, instrument, warn};

/// Default routing threshold, in characters.
pub const DEFAULT_ROUTING_THRESHOLD: usize = 20_000;

/// Static parts of the report prompt that are not derived from the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    pub date: NaiveDate,
    /// Who the brief is written for, e.g. a retailer name.
    pub audience: String,
}

impl ReportContext {
    fn long_date(&self) -> String {
        self.date.format("%B %-d, %Y").to_string()
    }

    fn quarter(&self) -> String {
        format!("Q{} {}", self.date.month0() / 3 + 1, self.date.year())
    }
}

/// Join summaries with a blank line, in batch order.
pub fn combine_summaries(summaries: &[BatchSummary]) -> String {
    summaries
        .iter()
        .sorted_by_key(|s| s.index)
        .map(|s| s.text.as_str())
        .join("\n\n")
}

/// Embed the combined batch summaries into the report prompt.
pub fn refinement_prompt(combined: &str, ctx: &ReportContext) -> String {
    let date = ctx.long_date();
    let quarter = ctx.quarter();
    let audience = &ctx.audience;
    let month_year = ctx.date.format("%B %Y");
    format!(
        r#"
You are a senior market analyst preparing a professional trend intelligence brief
for {audience}.

The date today is **{date}**.
Always use THIS date in the report header.

Use the insights below to generate a highly structured, retail-focused report:

{combined}

=========================
### FINAL TREND REPORT TEMPLATE
=========================

### TO: Retail Strategy & Merchandising Leadership
### FROM: Senior Consumer Electronics & Retail Trend Analyst
### DATE: {date}
### SUBJECT: Final {quarter} Trend Report — AI, Automation & Consumer Electronics Momentum

----------------------------------
### **SECTION 1 — EXECUTIVE SUMMARY (5–7 lines)**
Provide a crisp, strategic overview of the highest-impact forces shaping consumer electronics demand.
Emphasize cross-platform convergence (news + Reddit + Amazon + YouTube + RSS).

----------------------------------
### **SECTION 2 — TOP 10–12 CROSS-PLATFORM TRENDS**
For each trend, include:

**Trend Title (bold, 3–6 words)**
- Why It Is Rising
- Market Impact (retail context preferred)
- Evidence Snapshot (1–2 bullets from any platforms)
- Trend Score (0–100)
- Status (Rising / Stable / Cooling)

Keep each trend short, sharp, and retailer-actionable.

----------------------------------
### **SECTION 3 — RETAIL ACTION RECOMMENDATIONS (6–8 bullets)**
Concrete steps {audience} could execute:
- assortment
- merchandising
- promotions
- pricing
- online/offline experience
- experimental categories

----------------------------------
### STYLE RULES:
- No outdated years (always {month_year}).
- No long paragraphs—make everything digestible.
- Use real-sounding business language.
- Avoid generic AI fluff.
----------------------------------

Generate the full finalized report.
"#
    )
}

/// Pick the backend for a prompt of `prompt_chars` characters.
pub fn select_route(prompt_chars: usize, threshold: usize) -> Route {
    if prompt_chars < threshold {
        Route::SmallContext
    } else {
        Route::LargeContext
    }
}

/// Strategy selection between a small-context and a large-context backend.
#[derive(Debug)]
pub struct RefinementRouter<S, L> {
    small: S,
    large: L,
    threshold: usize,
}

impl<S: TextGenerator, L: TextGenerator> RefinementRouter<S, L> {
    pub fn new(small: S, large: L, threshold: usize) -> Self {
        Self {
            small,
            large,
            threshold,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Send `prompt` to the backend chosen by its length. Never fails: backend
    /// errors are returned as the report text with `degraded` set.
    #[instrument(level = "info", skip_all)]
    pub async fn refine(&self, prompt: &str) -> TrendReport {
        let chars = char_len(prompt);
        let route = select_route(chars, self.threshold);

        let (name, result) = match route {
            Route::SmallContext => {
                info!(chars, threshold = self.threshold, backend = self.small.name(), "Prompt is small; using small-context backend");
                (self.small.name(), self.small.generate(prompt).await)
            }
            Route::LargeContext => {
                info!(chars, threshold = self.threshold, backend = self.large.name(), "Prompt is large; using large-context backend");
                (self.large.name(), self.large.generate(prompt).await)
            }
        };

        match result {
            Ok(text) => TrendReport {
                text,
                route: Some(route),
                degraded: false,
            },
            Err(e) => {
                warn!(backend = name, error = %e, "Refinement call failed; reporting error text");
                TrendReport {
                    text: format!("{name} refinement error: {e}"),
                    route: Some(route),
                    degraded: true,
                }
            }
        }
    }
}
