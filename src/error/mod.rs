//! Error handling for the shell interpreter.
//!
//! All failure paths in the crate funnel into [`ShellError`], which the
//! top-level `execute` entry point flattens into a plain error string for
//! the caller. Driver errors keep their typed structure until that point so
//! the human-readable message can be extracted from the driver's error
//! kinds rather than from `Debug` output.

pub mod kinds;
pub mod mongo;

pub use kinds::{ExecutionError, ParseError, Result, ShellError};
pub use mongo::driver_error_message;
