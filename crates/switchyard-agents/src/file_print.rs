//! Agent that prints a changed file's content to stdout.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use switchyard_core::{Agent, Event, JsonMap, Result};

const DEFAULT_MAX_SIZE: u64 = 1_048_576;
const RULE: &str = "============================================================";

/// Agent that reads `event.data["file_path"]` and prints the file to
/// stdout inside a banner.
///
/// Guards run before anything is printed: the path must be present, point
/// at an existing regular file no larger than `max_size` (default 1 MiB),
/// and decode as UTF-8. A failed guard is reported through the result's
/// `error` field rather than a failed invocation, so a noisy directory
/// does not tear down the workflow.
///
/// Config keys: `max_size` (bytes), `show_path` and `show_size` (bools,
/// default true) controlling the banner lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilePrintAgent;

impl FilePrintAgent {
    /// Create a file-print agent.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Agent for FilePrintAgent {
    async fn process(&self, event: &Event, config: &JsonMap) -> Result<JsonMap> {
        let max_size = config
            .get("max_size")
            .and_then(|value| value.as_u64())
            .unwrap_or(DEFAULT_MAX_SIZE);
        let show_path = config
            .get("show_path")
            .and_then(|value| value.as_bool())
            .unwrap_or(true);
        let show_size = config
            .get("show_size")
            .and_then(|value| value.as_bool())
            .unwrap_or(true);
        let trigger_action = event
            .data
            .get("action")
            .and_then(|value| value.as_str())
            .unwrap_or("unknown")
            .to_string();

        let mut result = JsonMap::new();
        result.insert("agent".into(), json!("file_print"));
        result.insert("action".into(), json!("file_content_displayed"));
        result.insert("trigger_action".into(), json!(trigger_action.clone()));
        result.insert("file_path".into(), Value::Null);
        result.insert("file_size".into(), Value::Null);
        result.insert("encoding".into(), json!("utf-8"));
        result.insert("content_displayed".into(), json!(false));
        result.insert("processing_time".into(), json!(Utc::now().to_rfc3339()));

        let file_path = match event.data.get("file_path").and_then(|value| value.as_str()) {
            Some(path) => path.to_string(),
            None => {
                result.insert("error".into(), json!("Event data has no file_path"));
                return Ok(result);
            }
        };
        result.insert("file_path".into(), json!(file_path));
        let path = Path::new(&file_path);

        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(_) => {
                result.insert(
                    "error".into(),
                    json!(format!("File does not exist: {file_path}")),
                );
                return Ok(result);
            }
        };
        if !metadata.is_file() {
            result.insert(
                "error".into(),
                json!(format!("Not a regular file: {file_path}")),
            );
            return Ok(result);
        }

        let file_size = metadata.len();
        result.insert("file_size".into(), json!(file_size));
        if file_size > max_size {
            result.insert(
                "error".into(),
                json!(format!(
                    "File size exceeds the limit: {file_size} > {max_size} bytes"
                )),
            );
            return Ok(result);
        }

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                result.insert(
                    "error".into(),
                    json!(format!("No permission to read file: {file_path}")),
                );
                return Ok(result);
            }
            Err(e) => {
                result.insert("error".into(), json!(format!("Failed to read file: {e}")));
                return Ok(result);
            }
        };
        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(_) => {
                result.insert(
                    "error".into(),
                    json!(format!(
                        "File is not valid UTF-8 (possibly binary): {file_path}"
                    )),
                );
                return Ok(result);
            }
        };

        info!(
            "Displaying file for {}: {} ({} bytes)",
            trigger_action, file_path, file_size
        );

        println!("{RULE}");
        println!("Trigger: {trigger_action}");
        if show_path {
            println!("File: {file_path}");
        }
        if show_size {
            println!("Size: {file_size} bytes");
        }
        println!("{RULE}");
        println!("{content}");
        println!("{RULE}");

        result.insert("content_displayed".into(), json!(true));
        Ok(result)
    }
}
