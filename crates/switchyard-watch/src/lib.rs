//! File system watching trigger for the switchyard event bus.
//!
//! Watches a directory tree through the platform's native notification
//! API, debounces the raw notification stream per file, and publishes a
//! single event once a file's change burst settles. Temp-file noise and
//! unwanted filenames are filtered out before debouncing.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use switchyard_core::{EventBus, Trigger};
//! use switchyard_watch::FileWatchTrigger;
//!
//! # async fn demo() -> switchyard_core::Result<()> {
//! let bus = Arc::new(EventBus::new());
//! let trigger = FileWatchTrigger::new();
//! let config = json!({
//!     "path": "./inbox",
//!     "recursive": true,
//!     "event_type": "file_change",
//!     "debounce_delay": 1.0,
//! });
//! trigger
//!     .start(Arc::clone(&bus), config.as_object().cloned().unwrap_or_default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
mod debounce;
pub mod error;
mod filter;
mod trigger;

pub use config::WatchConfig;
pub use error::{Error, Result};
pub use trigger::FileWatchTrigger;
