//! YAML workflow config loading and preparation.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::json;
use tracing::{debug, info, warn};

use switchyard_core::{JsonMap, Workflow};

use crate::error::{Error, Result};

static ENV_VAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)").expect("valid regex")
});

/// Load and prepare every workflow defined in a YAML config file.
///
/// The file must exist and parse as YAML; a document that is not a
/// mapping, or has no `workflows` list, yields an empty result rather
/// than an error. Each entry is prepared independently: a malformed one
/// is logged and skipped so its siblings still load.
///
/// Preparation per workflow:
/// - `agent.prompt_file` is resolved (relative paths against the config
///   file's directory), its content installed as `agent.prompt`, and the
///   key removed. A missing prompt file is a warning, not a failure.
/// - Tilde and `$VAR` expansion runs over `trigger.path`,
///   `agent.output_dir`, and `output.path`.
pub fn load_workflows(config_path: &Path) -> Result<Vec<Workflow>> {
    if !config_path.exists() {
        return Err(Error::NotFound(config_path.display().to_string()));
    }
    let content = std::fs::read_to_string(config_path)?;
    let doc: serde_yaml::Value = serde_yaml::from_str(&content)?;

    let mapping = match doc.as_mapping() {
        Some(mapping) => mapping,
        None => {
            warn!(
                "Config {} is not a mapping, no workflows loaded",
                config_path.display()
            );
            return Ok(Vec::new());
        }
    };
    let entries = match lookup(mapping, "workflows").and_then(|value| value.as_sequence()) {
        Some(entries) => entries,
        None => {
            warn!("Config {} has no workflows list", config_path.display());
            return Ok(Vec::new());
        }
    };

    let config_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let mut workflows = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        match prepare_workflow(entry, config_dir) {
            Ok(workflow) => {
                info!("Loaded workflow: {}", workflow.name);
                workflows.push(workflow);
            }
            Err(e) => {
                warn!("Skipping workflow entry {}: {}", index, e);
            }
        }
    }
    Ok(workflows)
}

/// Expand a leading tilde and `$VAR` / `${VAR}` references in `text`.
///
/// Unset variables are kept literally so a typo is visible in the
/// resulting path instead of silently collapsing to an empty segment.
pub fn expand_env_vars(text: &str) -> String {
    let mut expanded = text.to_string();
    if expanded == "~" || expanded.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            expanded = format!("{}{}", home.display(), &expanded[1..]);
        }
    }

    ENV_VAR_RE
        .replace_all(&expanded, |caps: &Captures<'_>| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

fn prepare_workflow(entry: &serde_yaml::Value, config_dir: &Path) -> Result<Workflow> {
    let entry = entry
        .as_mapping()
        .ok_or_else(|| Error::Malformed("not a mapping".into()))?;
    let name = lookup(entry, "name")
        .and_then(|value| value.as_str())
        .ok_or_else(|| Error::Malformed("missing name".into()))?;

    let mut trigger = section(entry, "trigger")?;
    let mut agent = section(entry, "agent")?;
    let mut output = section(entry, "output")?;

    install_prompt(&mut agent, config_dir);
    expand_key(&mut trigger, "path");
    expand_key(&mut agent, "output_dir");
    expand_key(&mut output, "path");

    Ok(Workflow::new(name, trigger, agent, output))
}

/// Replace `prompt_file` with the file's content under the `prompt` key.
fn install_prompt(agent: &mut JsonMap, config_dir: &Path) {
    let prompt_file = match agent.get("prompt_file").and_then(|value| value.as_str()) {
        Some(path) => path.to_string(),
        None => return,
    };
    let resolved = if Path::new(&prompt_file).is_absolute() {
        PathBuf::from(&prompt_file)
    } else {
        config_dir.join(&prompt_file)
    };

    match std::fs::read_to_string(&resolved) {
        Ok(content) => {
            agent.insert("prompt".into(), json!(content));
            agent.remove("prompt_file");
            debug!("Loaded prompt from {}", resolved.display());
        }
        Err(e) => {
            warn!("Prompt file {} not readable: {}", resolved.display(), e);
        }
    }
}

fn expand_key(section: &mut JsonMap, key: &str) {
    if let Some(value) = section.get(key).and_then(|value| value.as_str()) {
        let expanded = expand_env_vars(value);
        section.insert(key.to_string(), json!(expanded));
    }
}

/// Fetch a workflow sub-mapping as a `JsonMap`; absent means empty.
fn section(entry: &serde_yaml::Mapping, key: &str) -> Result<JsonMap> {
    let value = match lookup(entry, key) {
        Some(value) => value,
        None => return Ok(JsonMap::new()),
    };
    let json = serde_json::to_value(value)
        .map_err(|e| Error::Malformed(format!("{key} section: {e}")))?;
    match json {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(Error::Malformed(format!("{key} section is not a mapping"))),
    }
}

fn lookup<'a>(mapping: &'a serde_yaml::Mapping, key: &str) -> Option<&'a serde_yaml::Value> {
    mapping
        .iter()
        .find_map(|(k, v)| (k.as_str() == Some(key)).then_some(v))
}
