//! Workflow config loading for switchyard.
//!
//! Reads a YAML file with a `workflows:` list and turns each entry into
//! a [`switchyard_core::Workflow`], loading external prompt files and
//! expanding `~` and `$VAR` references in path-like config values along
//! the way. A malformed entry is skipped with a warning so one typo does
//! not take the whole config down.
//!
//! ```yaml
//! workflows:
//!   - name: summarize-notes
//!     trigger:
//!       type: file_watcher
//!       path: ~/notes
//!       event_type: file_change
//!     agent:
//!       type: command
//!       command: summarize
//!       prompt_file: prompts/summarize.md
//!     output:
//!       type: console
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod error;
mod loader;

pub use error::{Error, Result};
pub use loader::{expand_env_vars, load_workflows};
