//! Batched LLM analysis.
//!
//! # Stages
//!
//! 1. [`batcher`]: usable titles are split into fixed-size groups
//! 2. [`summarizer`]: each group is summarized by the fast backend, with retries
//! 3. [`router`]: the summaries are merged into the report prompt and sent to
//!    the small- or large-context backend depending on its length
//!
//! [`pipeline::TrendAnalyzer`] wires the three together and short-circuits to
//! a fixed "no data" report when there is nothing to analyze.

pub mod batcher;
pub mod pipeline;
pub mod router;
pub mod summarizer;
