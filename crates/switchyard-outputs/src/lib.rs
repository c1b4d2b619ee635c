//! Stock outputs for switchyard workflows.
//!
//! Two destinations for agent results: [`ConsoleOutput`] prints JSON to
//! stdout for development and live monitoring, [`FileOutput`] persists
//! JSON or JSONL entries on disk for audit trails and datasets. Both are
//! stateless and fully driven by the workflow's output config.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod console;
pub mod file;

pub use console::ConsoleOutput;
pub use file::FileOutput;
