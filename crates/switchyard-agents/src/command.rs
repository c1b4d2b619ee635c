//! Agent that runs an external command built from templates.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use switchyard_core::{Agent, Event, JsonMap, Result};

use crate::template;

const DEFAULT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

/// Agent that renders a command line from the event and executes it.
///
/// `config["command"]` and each entry of `config["args"]` go through the
/// placeholder engine before execution, so a workflow can hand the changed
/// file to any external tool (`{file_path}`, `{file_content}`,
/// `{output_path}`, any event-data key). When the event carries a
/// `file_path`, the file is checked against `max_file_size` (default
/// 1 MiB) and `allowed_extensions` before its content enters the context.
///
/// A `prompt` in the config is rendered the same way and appended as the
/// final argument; `custom_prompt` in the event data takes precedence,
/// which lets a manual trigger override the workflow's prompt per firing.
///
/// The child process runs under `timeout` seconds (default 300) and is
/// killed when the deadline passes. Stdout, stderr, the exit code, and the wall
/// time all land in the result mapping; guard failures and run failures
/// are reported through the result's `error` field, not a failed
/// invocation.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandAgent;

impl CommandAgent {
    /// Create a command agent.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Agent for CommandAgent {
    async fn process(&self, event: &Event, config: &JsonMap) -> Result<JsonMap> {
        let file_hint = event
            .data
            .get("file_path")
            .and_then(|value| value.as_str())
            .unwrap_or("unknown");
        info!(
            "Command agent triggered by {} (event: {})",
            file_hint, event.event_type
        );

        let mut result = JsonMap::new();
        result.insert("agent".into(), json!("command"));
        result.insert("action".into(), json!("command_executed"));
        result.insert("command".into(), Value::Null);
        result.insert("prompt_used".into(), Value::Null);
        result.insert("file_path".into(), Value::Null);
        result.insert("file_size".into(), Value::Null);
        result.insert("execution_time".into(), Value::Null);
        result.insert("stdout".into(), Value::Null);
        result.insert("stderr".into(), Value::Null);
        result.insert("exit_code".into(), Value::Null);
        result.insert("success".into(), json!(false));
        result.insert("processing_time".into(), json!(Utc::now().to_rfc3339()));

        let program_template = match config.get("command").and_then(|value| value.as_str()) {
            Some(command) => command.to_string(),
            None => {
                result.insert("error".into(), json!("No command configured"));
                return Ok(result);
            }
        };

        // File details are optional; a command without one still runs with
        // the bare event context.
        let mut file: Option<PathBuf> = None;
        let mut file_content: Option<String> = None;
        if let Some(raw_path) = event.data.get("file_path").and_then(|value| value.as_str()) {
            let path = PathBuf::from(raw_path);
            result.insert(
                "file_path".into(),
                json!(template::absolutize(&path).display().to_string()),
            );

            let metadata = match tokio::fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(_) => {
                    result.insert(
                        "error".into(),
                        json!(format!("File does not exist: {raw_path}")),
                    );
                    return Ok(result);
                }
            };
            if !metadata.is_file() {
                result.insert(
                    "error".into(),
                    json!(format!("Not a regular file: {raw_path}")),
                );
                return Ok(result);
            }

            let file_size = metadata.len();
            result.insert("file_size".into(), json!(file_size));
            if let Some(guard) = validate_file(&path, file_size, config) {
                result.insert("error".into(), json!(guard));
                return Ok(result);
            }

            file_content = Some(match tokio::fs::read(&path).await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => format!("[failed to read {}: {e}]", path.display()),
            });
            file = Some(path);
        }

        let mut context =
            template::build_context(event, file.as_deref(), file_content.as_deref());
        if let Some(path) = &file {
            let output_dir = config.get("output_dir").and_then(|value| value.as_str());
            let output_suffix = config
                .get("output_suffix")
                .and_then(|value| value.as_str())
                .unwrap_or("");
            context.extend(template::output_paths(path, output_dir, output_suffix));
        }

        let program = template::render(&program_template, &context);
        result.insert("command".into(), json!(program.clone()));

        let mut args: Vec<String> = config
            .get("args")
            .and_then(|value| value.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .map(|arg| template::render(arg, &context))
                    .collect()
            })
            .unwrap_or_default();

        let prompt_template = event
            .data
            .get("custom_prompt")
            .and_then(|value| value.as_str())
            .filter(|prompt| !prompt.is_empty())
            .or_else(|| config.get("prompt").and_then(|value| value.as_str()));
        if let Some(prompt) = prompt_template {
            let rendered = template::render(prompt, &context);
            result.insert("prompt_used".into(), json!(rendered.clone()));
            args.push(rendered);
        }

        let timeout_secs = config
            .get("timeout")
            .and_then(|value| value.as_u64())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        info!("Running command: {} ({} args)", program, args.len());
        let started = Instant::now();
        let mut command = Command::new(&program);
        command.args(&args);
        command.kill_on_drop(true);

        match timeout(Duration::from_secs(timeout_secs), command.output()).await {
            Err(_) => {
                warn!("Command timed out after {}s: {}", timeout_secs, program);
                result.insert(
                    "error".into(),
                    json!(format!("Command timed out after {timeout_secs}s")),
                );
            }
            Ok(Err(e)) => {
                result.insert(
                    "error".into(),
                    json!(format!("Failed to run command: {e}")),
                );
            }
            Ok(Ok(output)) => {
                let execution_time = started.elapsed().as_secs_f64();
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                let stdout_len = stdout.len();

                result.insert("execution_time".into(), json!(execution_time));
                if let Some(code) = output.status.code() {
                    result.insert("exit_code".into(), json!(code));
                }

                if output.status.success() {
                    info!(
                        "Command completed in {:.1}s ({} bytes of stdout)",
                        execution_time, stdout_len
                    );
                    result.insert("success".into(), json!(true));
                } else {
                    let code = output
                        .status
                        .code()
                        .map_or_else(|| "signal".to_string(), |code| code.to_string());
                    result.insert(
                        "error".into(),
                        json!(format!(
                            "Command failed (exit code {code}): {}",
                            stderr.trim()
                        )),
                    );
                }
                result.insert("stdout".into(), json!(stdout));
                result.insert("stderr".into(), json!(stderr));
            }
        }

        Ok(result)
    }
}

/// Size and extension guard; a message means the file was rejected.
fn validate_file(path: &Path, file_size: u64, config: &JsonMap) -> Option<String> {
    let max_size = config
        .get("max_file_size")
        .and_then(|value| value.as_u64())
        .unwrap_or(DEFAULT_MAX_FILE_SIZE);
    if file_size > max_size {
        return Some(format!(
            "File size exceeds the limit: {file_size} > {max_size} bytes"
        ));
    }

    if let Some(allowed) = config
        .get("allowed_extensions")
        .and_then(|value| value.as_array())
    {
        if !allowed.is_empty() {
            let extension = path
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
                .unwrap_or_default();
            let permitted = allowed
                .iter()
                .filter_map(Value::as_str)
                .any(|ext| ext.to_lowercase() == extension);
            if !permitted {
                return Some(format!("File extension not allowed: {extension}"));
            }
        }
    }

    None
}
