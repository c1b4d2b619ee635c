//! Watch trigger configuration parsed from a workflow's trigger config.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use switchyard_core::JsonMap;

use crate::error::{Error, Result};

/// Filename globs excluded by default: editor swap, backup, and scratch
/// files that routinely appear next to the file being edited.
pub(crate) const DEFAULT_TEMP_PATTERNS: &[&str] = &[
    "*.tmp",
    "*.temp",
    "~*",
    ".#*",
    "#*#",
    ".DS_Store",
    "Thumbs.db",
    "*.swp",
    "*.swo",
    "*~",
    "*.bak",
    "*.orig",
];

/// Parsed configuration for a file watch.
///
/// All keys are optional; anything omitted falls back to the defaults
/// documented per field.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Directory to observe (default: current directory).
    pub path: PathBuf,
    /// Whether subdirectories are included (default: false).
    pub recursive: bool,
    /// Event type published for each coalesced change (default:
    /// `"file_change"`).
    pub event_type: String,
    /// Allow-list of filename globs; empty means every file qualifies.
    pub filename_patterns: Vec<String>,
    /// Filename globs that are always excluded (default:
    /// [`DEFAULT_TEMP_PATTERNS`]).
    pub ignore_temp_files: Vec<String>,
    /// React to newly created files (default: true).
    pub watch_created: bool,
    /// React to modified files (default: true).
    pub watch_modified: bool,
    /// Quiet period after the last raw notification before publishing
    /// (default: 1 second).
    pub debounce_delay: Duration,
}

impl WatchConfig {
    /// Extract a watch configuration from a trigger config mapping.
    pub fn from_config(config: &JsonMap) -> Result<Self> {
        let path = PathBuf::from(config.get("path").and_then(Value::as_str).unwrap_or("."));
        let recursive = config
            .get("recursive")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let event_type = config
            .get("event_type")
            .and_then(Value::as_str)
            .unwrap_or("file_change")
            .to_string();

        let filename_patterns = string_list(config, "filename_patterns").unwrap_or_default();
        let ignore_temp_files = string_list(config, "ignore_temp_files").unwrap_or_else(|| {
            DEFAULT_TEMP_PATTERNS
                .iter()
                .map(|p| (*p).to_string())
                .collect()
        });

        let (watch_created, watch_modified) = match string_list(config, "watch_events") {
            None => (true, true),
            Some(events) => (
                events.iter().any(|e| e == "created"),
                events.iter().any(|e| e == "modified"),
            ),
        };

        let delay_secs = match config.get("debounce_delay") {
            None => 1.0,
            Some(value) => value.as_f64().ok_or_else(|| {
                Error::Config(format!("debounce_delay must be a number, got {value}"))
            })?,
        };
        let debounce_delay = Duration::try_from_secs_f64(delay_secs)
            .map_err(|e| Error::Config(format!("invalid debounce_delay {delay_secs}: {e}")))?;

        Ok(Self {
            path,
            recursive,
            event_type,
            filename_patterns,
            ignore_temp_files,
            watch_created,
            watch_modified,
            debounce_delay,
        })
    }
}

fn string_list(config: &JsonMap, key: &str) -> Option<Vec<String>> {
    config.get(key).and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}
