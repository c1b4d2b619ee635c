//! Event values routed through the bus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// String-keyed JSON object used for event data, component configs, and
/// agent results.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// A single occurrence routed through the event bus.
///
/// Events are read-only after construction. Dispatch hands every subscriber
/// its own clone, so no subscriber can observe another's copy, and the data
/// mapping is taken by value at construction, so the producer keeps no handle
/// into the stored payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Unique identifier, generated when not supplied.
    pub id: String,

    /// Routing key, matched exactly against subscriptions.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Arbitrary payload.
    pub data: JsonMap,

    /// Creation time, set when not supplied.
    pub timestamp: DateTime<Utc>,

    /// Identifier of the producing component, for diagnostics.
    pub source: String,
}

impl Event {
    /// Create an event with a fresh id and the current time.
    pub fn new(event_type: impl Into<String>, data: JsonMap, source: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_type: event_type.into(),
            data,
            timestamp: Utc::now(),
            source: source.into(),
        }
    }

    /// Replace the generated id. An empty id keeps the generated one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !id.is_empty() {
            self.id = id;
        }
        self
    }

    /// Replace the generated timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
