//! Config-driven mode: load workflows from YAML and run until Ctrl-C.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use switchyard_core::{Engine, Workflow};
use switchyard_watch::FileWatchTrigger;
use tracing::debug;

use super::register_stock_components;

/// Load workflows from `config_path`, wire them up, and run until Ctrl-C.
pub async fn execute(config_path: &Path) -> Result<()> {
    println!("📁 Loading workflows from {}", config_path.display());
    let workflows = switchyard_config::load_workflows(config_path)?;
    if workflows.is_empty() {
        anyhow::bail!("no usable workflows in {}", config_path.display());
    }
    println!("📝 Loaded {} workflow(s)", workflows.len());

    let engine = Arc::new(Engine::new());
    register_stock_components(&engine);

    let mut watch_triggers = HashSet::new();
    for mut workflow in workflows {
        assign_file_watch_trigger(&engine, &mut watch_triggers, &mut workflow);
        println!("   {} {}", "registered".green(), workflow.name);
        engine.add_workflow(workflow);
    }

    println!("\n🚀 Switchyard running (press Ctrl+C to stop)\n");

    let runner = Arc::clone(&engine);
    let mut engine_task = tokio::spawn(async move { runner.start().await });

    tokio::select! {
        result = &mut engine_task => result??,
        _ = tokio::signal::ctrl_c() => {
            println!("\n⏹️  Stopping switchyard...");
            engine.stop().await;
            engine_task.await??;
            println!("✅ Switchyard stopped");
        }
    }

    Ok(())
}

/// Give a `file_watcher` workflow its own trigger instance.
///
/// A watch trigger holds a single watcher, so each distinct watched path
/// needs its own instance. The instance is registered under a name
/// derived from the path and the workflow's trigger type is rewritten to
/// that name; workflows watching the same path share one instance.
fn assign_file_watch_trigger(
    engine: &Engine,
    registered: &mut HashSet<String>,
    workflow: &mut Workflow,
) {
    if workflow.trigger_type() != Some("file_watcher") {
        return;
    }
    let path = workflow
        .trigger_config
        .get("path")
        .and_then(|v| v.as_str())
        .unwrap_or(".")
        .to_string();
    let name = watch_trigger_name(&path);
    if registered.insert(name.clone()) {
        debug!("Creating watch trigger '{}' for path {}", name, path);
        engine.register_trigger(name.clone(), Arc::new(FileWatchTrigger::new()));
    }
    workflow
        .trigger_config
        .insert("type".to_string(), json!(name));
}

fn watch_trigger_name(path: &str) -> String {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    format!("file_watcher_{}", hasher.finish())
}
