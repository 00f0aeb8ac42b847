//! Embedded MongoDB shell command interpreter.
//!
//! This library interprets a practical subset of mongosh-style command
//! strings and executes them against a database through the official
//! driver. It backs the query console of the Mongopad admin UI: the UI
//! sends a raw command string plus the currently selected collection, and
//! gets back a JSON result or an error message.
//!
//! # Modules
//!
//! - `error`: Error types and driver error message extraction
//! - `executor`: Command execution engine
//! - `parser`: Scanning, dispatch, and literal parsing
//! - `shell`: Top-level entry point and multi-statement orchestration
//!
//! # Example
//!
//! ```no_run
//! use mongodb::Client;
//! use mongopad_shell::shell;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//!     let db = client.database("app");
//!
//!     let response = shell::execute("db.users.find({active: true}).limit(5)", &db, "").await;
//!     println!("{}", serde_json::to_string(&response)?);
//!     Ok(())
//! }
//! ```
//!
//! Command strings are never evaluated as code. Arguments are parsed with
//! strict JSON first and a restricted literal grammar second; anything
//! outside that grammar is rejected.

pub mod error;
pub mod executor;
pub mod parser;
pub mod shell;

// Re-export commonly used types
pub use error::{ExecutionError, ParseError, Result, ShellError};
pub use executor::{ResultData, ShellExecutor};
pub use parser::{ShellCommand, parse_command};
pub use shell::{ShellResponse, execute};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
