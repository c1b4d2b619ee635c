//! Interactive mode: fire the manual trigger from a prompt loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use serde_json::json;
use switchyard_core::{ControllableTrigger, Engine, JsonMap, Workflow};

use super::register_stock_components;

/// Start a background echo workflow and read trigger commands from stdin.
pub async fn execute() -> Result<()> {
    let engine = Arc::new(Engine::new());
    let manual = register_stock_components(&engine);
    engine.add_workflow(manual_workflow());

    let runner = Arc::clone(&engine);
    let engine_task = tokio::spawn(async move { runner.start().await });

    // The trigger comes up inside the spawned start; wait for it so the
    // first command cannot fall into the gap.
    for _ in 0..100 {
        if manual.is_running() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    println!("🎮 Manual trigger mode");
    print_help();
    println!();

    loop {
        let Some(line) = read_command()? else {
            break;
        };
        let line = line.trim();
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or("").to_lowercase();
        let args: Vec<&str> = parts.collect();

        match command.as_str() {
            "" => continue,
            "trigger" | "t" => {
                manual.trigger(trigger_payload(&args)).await?;
                println!("{}", "Trigger sent".green());
            }
            "help" | "h" => print_help(),
            "quit" | "q" => break,
            other => {
                println!(
                    "{} unknown command '{}', type 'help' for the command list",
                    "error:".red(),
                    other
                );
            }
        }
    }

    println!("\n⏹️  Stopping manual mode...");
    engine.stop().await;
    engine_task.await??;
    println!("✅ Manual mode stopped");
    Ok(())
}

/// Workflow that echoes every manual event back to the console.
fn manual_workflow() -> Workflow {
    let trigger = json!({"type": "manual", "event_type": "manual_trigger"});
    let agent = json!({"type": "echo", "message": "Manual event processed"});
    let output = json!({
        "type": "console",
        "prefix": "[MANUAL]",
        "pretty": true,
        "timestamp": true,
    });
    Workflow::new(
        "manual_workflow",
        to_map(trigger),
        to_map(agent),
        to_map(output),
    )
}

fn to_map(value: serde_json::Value) -> JsonMap {
    value.as_object().cloned().unwrap_or_default()
}

/// Event payload for one `trigger` command.
///
/// `key=value` arguments become payload fields verbatim, values keeping
/// their case. A bare `trigger` is marked as a plain manual command. The
/// local timestamp is always attached.
fn trigger_payload(args: &[&str]) -> JsonMap {
    let mut data = JsonMap::new();
    for arg in args {
        match arg.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                data.insert(key.to_string(), json!(value));
            }
            _ => println!("   ignoring '{}' (expected key=value)", arg),
        }
    }
    if data.is_empty() {
        data.insert("user_input".to_string(), json!("manual_command"));
    }
    data.insert("timestamp".to_string(), json!(Local::now().to_rfc3339()));
    data
}

fn print_help() {
    println!("Commands:");
    println!("  trigger [key=value]...  (or 't') - fire a manual event with the given payload");
    println!("  help                    (or 'h') - show this help");
    println!("  quit                    (or 'q') - exit manual mode");
}

/// Prompt and read one line from stdin. `None` means end of input.
fn read_command() -> Result<Option<String>> {
    use std::io::{self, BufRead, Write};

    print!("> ");
    io::stdout().flush()?;
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Payload parsing --

    #[test]
    fn bare_trigger_is_marked_as_manual_command() {
        let payload = trigger_payload(&[]);
        assert_eq!(payload.get("user_input"), Some(&json!("manual_command")));
        assert!(payload.contains_key("timestamp"));
    }

    #[test]
    fn key_value_arguments_keep_their_case() {
        let payload = trigger_payload(&["file_path=/TMP/Note.md", "Reason=Review"]);
        assert_eq!(payload.get("file_path"), Some(&json!("/TMP/Note.md")));
        assert_eq!(payload.get("Reason"), Some(&json!("Review")));
        assert_eq!(payload.get("user_input"), None);
        assert!(payload.contains_key("timestamp"));
    }

    #[test]
    fn malformed_arguments_are_skipped() {
        let payload = trigger_payload(&["loose", "=nokey", "kind=note"]);
        assert_eq!(payload.get("kind"), Some(&json!("note")));
        assert_eq!(payload.get("loose"), None);
        assert_eq!(payload.len(), 2); // kind + timestamp
    }

    #[test]
    fn value_may_contain_equals_signs() {
        let payload = trigger_payload(&["expr=a=b"]);
        assert_eq!(payload.get("expr"), Some(&json!("a=b")));
    }

    // -- Background workflow --

    #[test]
    fn manual_workflow_routes_manual_events_to_the_console() {
        let workflow = manual_workflow();
        assert_eq!(workflow.event_type(), "manual_trigger");
        assert_eq!(workflow.trigger_type(), Some("manual"));
        assert_eq!(workflow.agent_type(), Some("echo"));
        assert_eq!(workflow.output_type(), Some("console"));
        assert_eq!(
            workflow.output_config.get("prefix"),
            Some(&json!("[MANUAL]"))
        );
    }
}
