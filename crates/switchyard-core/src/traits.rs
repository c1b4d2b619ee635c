//! Capability contracts for pluggable components.

use std::sync::Arc;

use async_trait::async_trait;

use crate::bus::EventBus;
use crate::error::Result;
use crate::events::{Event, JsonMap};

/// A component that detects occurrences and publishes events.
///
/// Implementations are registered with the engine under a name and resolved
/// from workflow trigger configs at startup.
#[async_trait]
pub trait Trigger: Send + Sync {
    /// Begin producing events onto `bus` as configured.
    ///
    /// May spawn background work that runs until [`Trigger::stop`]; the call
    /// itself must return once observation is established.
    async fn start(&self, bus: Arc<EventBus>, config: JsonMap) -> Result<()>;

    /// Cease producing events and release resources.
    ///
    /// Must be safe to call when never started or already stopped.
    async fn stop(&self) -> Result<()>;
}

/// A trigger that can also be fired on demand.
#[async_trait]
pub trait ControllableTrigger: Trigger {
    /// Publish one event immediately with the given payload.
    async fn trigger(&self, data: JsonMap) -> Result<()>;
}

/// A component that processes one event into a result mapping.
///
/// Must be safe to invoke concurrently for unrelated events.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Process `event` according to `config` and return the result.
    async fn process(&self, event: &Event, config: &JsonMap) -> Result<JsonMap>;
}

/// A component that delivers an agent's result somewhere external.
#[async_trait]
pub trait Output: Send + Sync {
    /// Deliver `result` according to `config`.
    async fn send(&self, result: &JsonMap, config: &JsonMap) -> Result<()>;
}
