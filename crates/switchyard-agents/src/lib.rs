//! Stock agents for switchyard workflows.
//!
//! Three processors cover the common ground between "prove the wiring
//! works" and "hand the file to a real tool":
//!
//! - [`EchoAgent`] wraps the event in a structured response, for testing
//!   and development.
//! - [`FilePrintAgent`] prints a changed file's content to stdout with
//!   size and encoding guards.
//! - [`CommandAgent`] renders a command line through the placeholder
//!   engine in [`template`] and runs it with a timeout.
//!
//! All three are stateless and report their own failures inside the
//! result mapping, so one bad file never tears down a workflow.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod command;
pub mod echo;
pub mod file_print;
pub mod template;

pub use command::CommandAgent;
pub use echo::EchoAgent;
pub use file_print::FilePrintAgent;
