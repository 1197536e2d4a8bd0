//! Small helpers for text cleanup, logging and the file system.
//!
//! - Whitespace/entity normalization for scraped titles and descriptions
//! - String truncation for log fields and error bodies
//! - Output location validation before any network work starts

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Collapse runs of whitespace into single spaces and trim.
pub fn clean_text(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Strip HTML tags (RSS descriptions often embed markup) and clean whitespace.
pub fn strip_html(s: &str) -> String {
    let without_tags = TAGS.replace_all(s, " ");
    clean_text(&decode_common_entities(&without_tags))
}

/// Decode the handful of entities that survive XML parsing in feed bodies.
pub fn decode_common_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut after `max` bytes (moved back to a character
/// boundary) with an ellipsis and byte count indicator appended.
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Length in Unicode scalar values, the unit used for routing and size logs.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Ensure the directory that will hold `file_path` exists and is writable.
///
/// Creates missing directories, then writes and removes a scratch file.
#[instrument(level = "info", skip_all, fields(path = %file_path.display()))]
pub async fn ensure_parent_writable(file_path: &Path) -> Result<(), Box<dyn Error + Send + Sync>> {
    let dir = match file_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    fs::create_dir_all(&dir).await?;
    // Plain std fs for the scratch file.
    let scratch_path = dir.join("..__write_check__");
    stdfs::File::create(&scratch_path)?;
    let _ = stdfs::remove_file(&scratch_path);
    info!(dir = %dir.display(), "Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        let s = "é".repeat(10); // 20 bytes
        let result = truncate_for_log(&s, 5);
        assert!(result.starts_with("éé…"));
        assert!(result.contains("(+16 bytes)"));
    }

    #[test]
    fn test_char_len_counts_characters_not_bytes() {
        assert_eq!(char_len(""), 0);
        assert_eq!(char_len("abc"), 3);
        assert_eq!(char_len("é€😀"), 3);
        assert_eq!("é€😀".len(), 9);
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Apple\n\t Vision   Pro  "), "Apple Vision Pro");
        assert_eq!(clean_text("   "), "");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<p>Robot vacuums&nbsp;<b>drop</b> in price &amp; more</p>"),
            "Robot vacuums drop in price & more"
        );
    }

    #[tokio::test]
    async fn test_ensure_parent_writable_creates_directories() {
        let base = std::env::temp_dir().join(format!("trend_engine_writable_{}", std::process::id()));
        let target = base.join("nested").join("report.txt");

        ensure_parent_writable(&target).await.unwrap();

        assert!(base.join("nested").is_dir());
        assert!(!base.join("nested").join("..__write_check__").exists());
        let _ = std::fs::remove_dir_all(&base);
    }
}
