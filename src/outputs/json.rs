//! JSON run record.
//!
//! Serializes the whole [`TrendRun`] (timestamps, counts, batches, per-batch
//! summaries, combined text and the final report) so a run can be inspected
//! or diffed later without calling any backend again.

use crate::models::TrendRun;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`TrendRun`] as pretty-printed JSON to `path`.
///
/// Missing parent directories are created.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_run(run: &TrendRun, path: &Path) -> Result<(), Box<dyn Error + Send + Sync>> {
    let json = serde_json::to_string_pretty(run)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(batches = run.batches.len(), "Wrote JSON run record");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Batch, BatchSummary, Route, TrendReport};
    use chrono::Local;

    #[tokio::test]
    async fn test_write_run() {
        let run = TrendRun {
            started_at: Local::now(),
            finished_at: Local::now(),
            items_collected: 3,
            titles_analyzed: 2,
            batches: vec![Batch {
                index: 0,
                titles: vec!["A".into(), "B".into()],
            }],
            summaries: vec![BatchSummary {
                index: 0,
                text: "summary".into(),
                failed: false,
            }],
            combined: "summary".into(),
            report: TrendReport {
                text: "report".into(),
                route: Some(Route::LargeContext),
                degraded: false,
            },
        };
        let dir = std::env::temp_dir().join(format!("trend_engine_json_{}", std::process::id()));
        let path = dir.join("run.json");

        write_run(&run, &path).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["items_collected"], 3);
        assert_eq!(value["batches"][0]["titles"][1], "B");
        assert_eq!(value["report"]["route"], "large_context");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
