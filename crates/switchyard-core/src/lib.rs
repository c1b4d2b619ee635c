//! Event bus and workflow orchestration core.
//!
//! Occurrences detected by [`Trigger`]s are published as [`Event`]s onto the
//! [`EventBus`], which dispatches each one to every callback subscribed to
//! its type. The [`Engine`] ties the pieces together: it keeps name-keyed
//! registries of triggers, [`Agent`]s, and [`Output`]s, and installs one bus
//! callback per [`Workflow`] that runs the event through the workflow's
//! agent and hands the result to its output.
//!
//! Failure containment is the core property: a failing callback never
//! affects its siblings or the dispatch loop, and a failing workflow never
//! affects another workflow.
//!
//! ```no_run
//! use std::sync::Arc;
//! use switchyard_core::prelude::*;
//!
//! # async fn demo() -> switchyard_core::Result<()> {
//! let engine = Engine::new();
//! engine.register_trigger("manual", Arc::new(ManualTrigger::new()));
//! let mut trigger_config = JsonMap::new();
//! trigger_config.insert("type".into(), "manual".into());
//! engine.add_workflow(Workflow::new(
//!     "demo",
//!     trigger_config,
//!     JsonMap::new(),
//!     JsonMap::new(),
//! ));
//! engine.start().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod bus;
pub mod engine;
pub mod error;
pub mod events;
pub mod manual;
pub mod traits;
pub mod workflow;

pub use bus::EventBus;
pub use engine::Engine;
pub use error::{Error, Result};
pub use events::{Event, JsonMap};
pub use manual::ManualTrigger;
pub use traits::{Agent, ControllableTrigger, Output, Trigger};
pub use workflow::Workflow;

/// Convenience re-exports for downstream crates.
pub mod prelude {
    pub use crate::bus::EventBus;
    pub use crate::engine::Engine;
    pub use crate::error::{Error, Result};
    pub use crate::events::{Event, JsonMap};
    pub use crate::manual::ManualTrigger;
    pub use crate::traits::{Agent, ControllableTrigger, Output, Trigger};
    pub use crate::workflow::Workflow;
}
