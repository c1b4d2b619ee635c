//! On-demand trigger fired from user action rather than observation.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::bus::EventBus;
use crate::error::Result;
use crate::events::{Event, JsonMap};
use crate::traits::{ControllableTrigger, Trigger};

struct ManualState {
    bus: Arc<EventBus>,
    event_type: String,
}

/// Trigger that publishes an event each time [`ManualTrigger::trigger`] is
/// called, typically from a CLI command or a test.
///
/// Config options: `event_type` (default `"manual"`).
pub struct ManualTrigger {
    state: Mutex<Option<ManualState>>,
}

impl ManualTrigger {
    /// Create a stopped manual trigger.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    /// Whether the trigger has been started and not yet stopped.
    pub fn is_running(&self) -> bool {
        self.state.lock().is_some()
    }
}

impl Default for ManualTrigger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Trigger for ManualTrigger {
    async fn start(&self, bus: Arc<EventBus>, config: JsonMap) -> Result<()> {
        let event_type = config
            .get("event_type")
            .and_then(|v| v.as_str())
            .unwrap_or("manual")
            .to_string();
        *self.state.lock() = Some(ManualState { bus, event_type });
        info!("Manual trigger started");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        *self.state.lock() = None;
        info!("Manual trigger stopped");
        Ok(())
    }
}

#[async_trait]
impl ControllableTrigger for ManualTrigger {
    async fn trigger(&self, data: JsonMap) -> Result<()> {
        let fired = {
            let state = self.state.lock();
            state
                .as_ref()
                .map(|s| (Arc::clone(&s.bus), s.event_type.clone()))
        };
        let Some((bus, event_type)) = fired else {
            warn!("Manual trigger is not running");
            return Ok(());
        };
        bus.publish(Event::new(event_type, data, "manual"))
    }
}
