//! Switchyard command line interface.
//!
//! Two modes over the same engine: `run` loads workflows from a YAML
//! config and keeps them alive until Ctrl-C, `manual` starts an
//! interactive prompt that fires the manual trigger on demand. Both
//! register the bundled triggers, agents, and outputs before starting.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
