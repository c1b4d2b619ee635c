//! Console output for development and debugging.

use async_trait::async_trait;
use chrono::Local;

use switchyard_core::{JsonMap, Output, Result};

const DEFAULT_PREFIX: &str = "[SWITCHYARD]";

/// Output that prints each workflow result as JSON on stdout.
///
/// Handy while developing a workflow: every result is immediately
/// visible in the terminal. Config keys: `prefix` (default
/// "[SWITCHYARD]"), `pretty` (indented JSON, default true), `timestamp`
/// (local wall clock appended to the prefix, default false). Multi-line
/// pretty JSON prints the prefix on its own line so the object below it
/// stays copy-pasteable.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleOutput;

impl ConsoleOutput {
    /// Create a console output.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Output for ConsoleOutput {
    async fn send(&self, result: &JsonMap, config: &JsonMap) -> Result<()> {
        let mut prefix = config
            .get("prefix")
            .and_then(|value| value.as_str())
            .unwrap_or(DEFAULT_PREFIX)
            .to_string();
        let pretty = config
            .get("pretty")
            .and_then(|value| value.as_bool())
            .unwrap_or(true);

        let rendered = if pretty {
            serde_json::to_string_pretty(result)?
        } else {
            serde_json::to_string(result)?
        };

        if config
            .get("timestamp")
            .and_then(|value| value.as_bool())
            .unwrap_or(false)
        {
            prefix = format!("{} {}", prefix, Local::now().format("%Y-%m-%d %H:%M:%S"));
        }

        if pretty && rendered.contains('\n') {
            println!("{prefix}");
            println!("{rendered}");
        } else {
            println!("{prefix} {rendered}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn result_map() -> JsonMap {
        json!({ "status": "ok", "file": "note.md" })
            .as_object()
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn send_succeeds_with_defaults() {
        ConsoleOutput::new()
            .send(&result_map(), &JsonMap::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn send_succeeds_compact_with_timestamp() {
        let config = json!({ "pretty": false, "timestamp": true, "prefix": "[TEST]" })
            .as_object()
            .cloned()
            .unwrap();
        ConsoleOutput::new()
            .send(&result_map(), &config)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn nested_results_serialize() {
        let result = json!({
            "original_event": { "data": { "deep": [1, 2, 3] } },
            "success": true,
        })
        .as_object()
        .cloned()
        .unwrap();
        ConsoleOutput::new().send(&result, &JsonMap::new()).await.unwrap();
    }
}
