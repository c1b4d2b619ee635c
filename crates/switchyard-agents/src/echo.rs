//! Echo agent for testing workflow wiring.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use switchyard_core::{Agent, Event, JsonMap, Result};

/// Agent that wraps the incoming event in a structured response.
///
/// Useful for exercising a workflow without a real processor: the result
/// carries the full original event plus processing metadata. Stateless,
/// so a single instance may serve any number of workflows.
///
/// Config keys: `message` (string included in the response, default
/// "Event processed") and `include_config` (bool, echoes the agent config
/// back in the response when true).
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoAgent;

impl EchoAgent {
    /// Create an echo agent.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Agent for EchoAgent {
    async fn process(&self, event: &Event, config: &JsonMap) -> Result<JsonMap> {
        let message = config
            .get("message")
            .and_then(|value| value.as_str())
            .unwrap_or("Event processed");

        let mut result = JsonMap::new();
        result.insert(
            "original_event".into(),
            json!({
                "id": event.id,
                "type": event.event_type,
                "source": event.source,
                "timestamp": event.timestamp.to_rfc3339(),
                "data": event.data,
            }),
        );
        result.insert("agent".into(), json!("echo"));
        result.insert("message".into(), json!(message));
        result.insert("processing_time".into(), json!(Utc::now().to_rfc3339()));

        if config
            .get("include_config")
            .and_then(|value| value.as_bool())
            .unwrap_or(false)
        {
            result.insert("config".into(), json!(config));
        }

        Ok(result)
    }
}
