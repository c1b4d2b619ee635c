//! Error types for the event bus and engine.

use thiserror::Error;

/// Errors produced by the bus, the engine, and component contracts.
#[derive(Error, Debug)]
pub enum Error {
    /// Component is already running (or was already run; neither the bus
    /// nor the engine is restartable).
    #[error("{0} is already running")]
    AlreadyRunning(&'static str),

    /// The bus no longer accepts events.
    #[error("Event bus is closed")]
    Closed,

    /// A workflow references a trigger that was never registered.
    #[error("Trigger '{trigger}' not registered for workflow '{workflow}'")]
    TriggerNotRegistered {
        /// Trigger type named by the workflow.
        trigger: String,
        /// Workflow that referenced it.
        workflow: String,
    },

    /// A workflow references an agent that was never registered.
    #[error("Agent '{agent}' not found for workflow '{workflow}'")]
    AgentNotRegistered {
        /// Agent type named by the workflow.
        agent: String,
        /// Workflow that referenced it.
        workflow: String,
    },

    /// A workflow references an output that was never registered.
    #[error("Output '{output}' not found for workflow '{workflow}'")]
    OutputNotRegistered {
        /// Output type named by the workflow.
        output: String,
        /// Workflow that referenced it.
        workflow: String,
    },

    /// Trigger startup or shutdown error.
    #[error("Trigger error: {0}")]
    Trigger(String),

    /// Agent processing error.
    #[error("Agent error: {0}")]
    Agent(String),

    /// Output delivery error.
    #[error("Output error: {0}")]
    Output(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A subscriber callback failed or panicked.
    #[error("Subscriber error: {0}")]
    Subscriber(String),

    /// Operation timed out.
    #[error("Operation timed out after {0}s")]
    Timeout(u64),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for switchyard operations.
pub type Result<T> = std::result::Result<T, Error>;
