//! Subcommand implementations.

pub mod manual;
pub mod run;

use std::sync::Arc;

use switchyard_agents::{CommandAgent, EchoAgent, FilePrintAgent};
use switchyard_core::{Engine, ManualTrigger, Trigger};
use switchyard_outputs::{ConsoleOutput, FileOutput};

/// Register the bundled components every mode starts from.
///
/// File watch triggers are not registered here: one instance is created
/// per watched path while workflows are installed, so they cannot be
/// shared under a single name. The manual trigger handle is returned so
/// the interactive mode can fire it directly.
pub(crate) fn register_stock_components(engine: &Engine) -> Arc<ManualTrigger> {
    let manual = Arc::new(ManualTrigger::new());
    engine.register_trigger("manual", Arc::clone(&manual) as Arc<dyn Trigger>);
    engine.register_agent("echo", Arc::new(EchoAgent::new()));
    engine.register_agent("file_print", Arc::new(FilePrintAgent::new()));
    engine.register_agent("command", Arc::new(CommandAgent::new()));
    engine.register_output("console", Arc::new(ConsoleOutput::new()));
    engine.register_output("file", Arc::new(FileOutput::new()));
    manual
}
