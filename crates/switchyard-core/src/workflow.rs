//! Workflow definition binding a trigger, an agent, and an output.

use crate::events::JsonMap;

/// Named binding of one trigger config, one agent config, and one output
/// config.
///
/// Configs are taken by value at construction and never mutated afterwards,
/// so a workflow can be shared freely between the engine and the bus
/// callbacks it installs. The `type` key of each config names the registered
/// component to use; the trigger config's `event_type` key names the bus
/// subscription (default `"default"`).
#[derive(Debug, Clone)]
pub struct Workflow {
    /// Human-readable workflow name, used in diagnostics.
    pub name: String,
    /// Configuration handed to the trigger, including its `type`.
    pub trigger_config: JsonMap,
    /// Configuration handed to the agent, including its `type`.
    pub agent_config: JsonMap,
    /// Configuration handed to the output, including its `type`.
    pub output_config: JsonMap,
}

impl Workflow {
    /// Create a workflow from its three component configs.
    pub fn new(
        name: impl Into<String>,
        trigger_config: JsonMap,
        agent_config: JsonMap,
        output_config: JsonMap,
    ) -> Self {
        Self {
            name: name.into(),
            trigger_config,
            agent_config,
            output_config,
        }
    }

    /// Bus event type this workflow subscribes to.
    pub fn event_type(&self) -> &str {
        config_str(&self.trigger_config, "event_type").unwrap_or("default")
    }

    /// Registered trigger name from the trigger config, if present.
    pub fn trigger_type(&self) -> Option<&str> {
        config_str(&self.trigger_config, "type")
    }

    /// Registered agent name from the agent config, if present.
    pub fn agent_type(&self) -> Option<&str> {
        config_str(&self.agent_config, "type")
    }

    /// Registered output name from the output config, if present.
    pub fn output_type(&self) -> Option<&str> {
        config_str(&self.output_config, "type")
    }
}

fn config_str<'a>(config: &'a JsonMap, key: &str) -> Option<&'a str> {
    config.get(key).and_then(|v| v.as_str())
}
