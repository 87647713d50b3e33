//! JSON output of scraped records.
//!
//! Files are pretty-printed with a four-space indent and keep non-ASCII text
//! as-is, so the Chinese titles stay readable in the file.

use crate::config::ContentType;
use crate::models::{ItemFailure, Record};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// `<slug>_<YYYYMMDD-HHMMSS>[_<suffix>].json`
pub fn output_file_name(content_type: ContentType, started: &DateTime<Local>, suffix: Option<&str>) -> String {
    let stamp = started.format("%Y%m%d-%H%M%S");
    match suffix {
        Some(suffix) => format!("{}_{}_{}.json", content_type.slug(), stamp, suffix),
        None => format!("{}_{}.json", content_type.slug(), stamp),
    }
}

/// Serialize `value` with a four-space indent.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

async fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), Box<dyn Error>> {
    let bytes = to_pretty_json(value)?;
    fs::write(path, bytes).await?;
    Ok(())
}

/// Write the records of one run; returns the path written.
#[instrument(level = "info", skip(records, started), fields(count = records.len()))]
pub async fn write_records(
    records: &[Record],
    output_dir: &Path,
    content_type: ContentType,
    started: &DateTime<Local>,
) -> Result<PathBuf, Box<dyn Error>> {
    let path = output_dir.join(output_file_name(content_type, started, None));
    write_json(records, &path).await?;
    info!(path = %path.display(), "Wrote records");
    Ok(path)
}

/// Write the per-item failures of a keep-going run next to its records.
#[instrument(level = "info", skip(failures, started), fields(count = failures.len()))]
pub async fn write_failures(
    failures: &[ItemFailure],
    output_dir: &Path,
    content_type: ContentType,
    started: &DateTime<Local>,
) -> Result<PathBuf, Box<dyn Error>> {
    let path = output_dir.join(output_file_name(content_type, started, Some("failures")));
    write_json(failures, &path).await?;
    info!(path = %path.display(), "Wrote failures");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn started() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 5, 6, 8, 15, 0).unwrap()
    }

    fn records() -> Vec<Record> {
        vec![
            Record {
                title: "焦點新聞".to_string(),
                url: "https://www.nkust.edu.tw/p/406-1000-1.php".to_string(),
                date: Some(String::new()),
                content: "內容".to_string(),
            },
            Record {
                title: "校史".to_string(),
                url: "https://www.nkust.edu.tw/p/412-1000-1.php".to_string(),
                date: None,
                content: "沿革".to_string(),
            },
        ]
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(
            output_file_name(ContentType::HotNews, &started(), None),
            "hot_news_20250506-081500.json"
        );
        assert_eq!(
            output_file_name(ContentType::About, &started(), Some("failures")),
            "about_20250506-081500_failures.json"
        );
    }

    #[test]
    fn test_pretty_json_is_indented_and_unescaped() {
        let text = String::from_utf8(to_pretty_json(&records()).unwrap()).unwrap();
        assert!(text.contains("焦點新聞"));
        assert!(!text.contains("\\u"));
        assert!(text.contains("\n    {\n        \"title\""));
    }

    #[tokio::test]
    async fn test_write_records_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = write_records(&records(), dir.path(), ContentType::Honors, &started())
            .await
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "honors_20250506-081500.json");

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["date"], "");
        assert!(items[1].get("date").is_none());
    }

    #[tokio::test]
    async fn test_write_failures() {
        let dir = TempDir::new().unwrap();
        let failures = vec![ItemFailure {
            url: "https://www.nkust.edu.tw/p/missing.php".to_string(),
            error: "https://www.nkust.edu.tw/p/missing.php returned HTTP 404 Not Found".to_string(),
        }];
        let path = write_failures(&failures, dir.path(), ContentType::HotNews, &started())
            .await
            .unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("missing.php"));
    }
}
