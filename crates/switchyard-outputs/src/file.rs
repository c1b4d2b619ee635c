//! File output for persistent result logging.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use switchyard_core::{JsonMap, Output, Result};

/// Output that writes workflow results to a file on disk.
///
/// Builds audit trails and datasets out of workflow runs. Parent
/// directories are created as needed. Config keys: `path` (default
/// `output.json`), `append` (default true), `format` ("json" or "jsonl",
/// default "json"), `include_timestamp` (wraps each entry as
/// `{timestamp, data}`, default true), `pretty` (indented JSON, only in
/// "json" format, default false).
///
/// In append mode, "jsonl" writes one object per line while "json"
/// separates entries with a leading newline.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileOutput;

impl FileOutput {
    /// Create a file output.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Output for FileOutput {
    async fn send(&self, result: &JsonMap, config: &JsonMap) -> Result<()> {
        let path = config
            .get("path")
            .and_then(|value| value.as_str())
            .unwrap_or("output.json");
        let append = config
            .get("append")
            .and_then(|value| value.as_bool())
            .unwrap_or(true);
        let format = config
            .get("format")
            .and_then(|value| value.as_str())
            .unwrap_or("json")
            .to_lowercase();
        let pretty = config
            .get("pretty")
            .and_then(|value| value.as_bool())
            .unwrap_or(false);
        let include_timestamp = config
            .get("include_timestamp")
            .and_then(|value| value.as_bool())
            .unwrap_or(true);

        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let payload = if include_timestamp {
            json!({ "timestamp": Utc::now().to_rfc3339(), "data": result })
        } else {
            json!(result)
        };
        let rendered = if pretty && format == "json" {
            serde_json::to_string_pretty(&payload)?
        } else {
            serde_json::to_string(&payload)?
        };

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)
            .await?;

        let text = if format == "jsonl" {
            format!("{rendered}\n")
        } else if append {
            format!("\n{rendered}")
        } else {
            rendered
        };
        file.write_all(text.as_bytes()).await?;
        file.flush().await?;

        debug!("Wrote workflow result to {}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn result_map() -> JsonMap {
        json!({ "status": "ok" }).as_object().cloned().unwrap()
    }

    fn config(entries: Value) -> JsonMap {
        entries.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn jsonl_append_writes_one_object_per_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.jsonl");
        let cfg = config(json!({
            "path": path.to_str().unwrap(),
            "format": "jsonl",
        }));

        let output = FileOutput::new();
        output.send(&result_map(), &cfg).await.unwrap();
        output.send(&result_map(), &cfg).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let entry: Value = serde_json::from_str(line).unwrap();
            assert_eq!(entry["data"]["status"], "ok");
            assert!(entry["timestamp"].is_string());
        }
    }

    #[tokio::test]
    async fn overwrite_without_timestamp_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("result.json");
        let cfg = config(json!({
            "path": path.to_str().unwrap(),
            "append": false,
            "include_timestamp": false,
            "pretty": true,
        }));

        let output = FileOutput::new();
        output.send(&result_map(), &cfg).await.unwrap();
        output.send(&result_map(), &cfg).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains('\n'), "pretty output is multi-line");
        let entry: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(entry, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn json_append_separates_entries_with_a_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.json");
        let cfg = config(json!({
            "path": path.to_str().unwrap(),
            "include_timestamp": false,
        }));

        FileOutput::new().send(&result_map(), &cfg).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with('\n'));
        let entry: Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(entry["status"], "ok");
    }

    #[tokio::test]
    async fn missing_parent_directories_are_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deep/out.jsonl");
        let cfg = config(json!({
            "path": path.to_str().unwrap(),
            "format": "jsonl",
        }));

        FileOutput::new().send(&result_map(), &cfg).await.unwrap();
        assert!(path.exists());
    }
}
