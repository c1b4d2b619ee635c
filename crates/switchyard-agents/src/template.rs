//! Placeholder rendering for prompts and command lines.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{json, Value};

use switchyard_core::{Event, JsonMap};

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^}]+)\}").expect("valid regex"));

/// Replace `{key}` placeholders in `template` with context values.
///
/// String values substitute as-is; every other JSON value substitutes in
/// its JSON rendering. Keys absent from the context render as
/// `{MISSING:key}` so a half-filled template stays visible in the output
/// instead of failing silently.
pub fn render(template: &str, context: &JsonMap) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            let key = &caps[1];
            match context.get(key) {
                Some(value) => render_value(value),
                None => format!("{{MISSING:{key}}}"),
            }
        })
        .into_owned()
}

/// Build the substitution context for an event.
///
/// Starts from the event's data mapping, then layers on the file name
/// pieces when a path is known and the file's content when it has been
/// read. `event_type` is always present.
pub fn build_context(
    event: &Event,
    file_path: Option<&Path>,
    file_content: Option<&str>,
) -> JsonMap {
    let mut context = event.data.clone();

    if let Some(path) = file_path {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let basename = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        context.insert("file_name".into(), json!(stem));
        context.insert("file_extension".into(), json!(extension_of(path)));
        context.insert(
            "file_path".into(),
            json!(absolutize(path).display().to_string()),
        );
        context.insert("file_basename".into(), json!(basename));

        if let Some(content) = file_content {
            context.insert("file_content".into(), json!(content));
        }
    }

    context.insert("event_type".into(), json!(event.event_type));
    context
}

/// Entries describing where a command should write its result file.
///
/// The output lands next to the input unless `output_dir` overrides it;
/// `output_suffix` is inserted between the stem and the extension.
pub fn output_paths(input: &Path, output_dir: Option<&str>, output_suffix: &str) -> JsonMap {
    let dir = match output_dir {
        Some(dir) => PathBuf::from(dir),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let dir = absolutize(&dir);
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let basename = format!("{stem}{output_suffix}");
    let name = format!("{basename}{}", extension_of(input));

    let mut entries = JsonMap::new();
    entries.insert(
        "output_path".into(),
        json!(dir.join(&name).display().to_string()),
    );
    entries.insert("output_dir".into(), json!(dir.display().to_string()));
    entries.insert("output_name".into(), json!(name));
    entries.insert("output_basename".into(), json!(basename));
    entries
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

pub(crate) fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
