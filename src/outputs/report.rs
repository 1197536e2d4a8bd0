//! Plain-text report output: the file on disk and the console copy.

use crate::models::TrendReport;
use std::error::Error;
use std::io::Write;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

const BANNER: &str = "==================================================";

/// Write the report text verbatim to `path`, creating parent directories.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_report(report: &TrendReport, path: &Path) -> Result<(), Box<dyn Error + Send + Sync>> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).await?;
    }
    fs::write(path, &report.text).await?;
    info!(bytes = report.text.len(), route = ?report.route, degraded = report.degraded, "Wrote trend report");
    Ok(())
}

/// Print the report between banner lines.
pub fn print_report(out: &mut impl Write, report: &TrendReport) -> std::io::Result<()> {
    writeln!(out, "\n{BANNER}")?;
    writeln!(out, "TREND REPORT")?;
    writeln!(out, "{BANNER}\n")?;
    writeln!(out, "{}", report.text)?;
    writeln!(out, "\n{BANNER}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Route;

    fn report() -> TrendReport {
        TrendReport {
            text: "1. Executive Summary\n- Smart rings are up".to_string(),
            route: Some(Route::SmallContext),
            degraded: false,
        }
    }

    #[tokio::test]
    async fn test_write_report_verbatim() {
        let dir = std::env::temp_dir().join(format!("trend_engine_report_{}", std::process::id()));
        let path = dir.join("out").join("trend_report.txt");

        write_report(&report(), &path).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), report().text);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_print_report_between_banners() {
        let mut buf = Vec::new();
        print_report(&mut buf, &report()).unwrap();
        let printed = String::from_utf8(buf).unwrap();

        assert!(printed.contains(&format!("{BANNER}\nTREND REPORT\n{BANNER}")));
        assert!(printed.contains("- Smart rings are up\n"));
        assert!(printed.trim_end().ends_with(BANNER));
    }
}
