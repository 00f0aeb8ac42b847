//! Command parsing: raw shell text to executable descriptors.
//!
//! The pipeline is string-first. [`scan`] walks raw text with a
//! quote-aware state machine to split statements, extract balanced
//! argument regions, and locate method calls. [`dispatch`] detects which
//! operation a statement is and assembles a [`ShellCommand`]. Argument
//! text is parsed into BSON by [`literal`], which tries strict JSON first
//! and falls back to a restricted literal grammar tokenized by [`lexer`].
//! No expression evaluation happens anywhere in this pipeline.

pub mod command;
pub mod dispatch;
pub mod lexer;
pub mod literal;
pub mod scan;

pub use command::{BulkOperation, FindModifiers, ShellCommand, UpdateArgs};
pub use dispatch::parse_command;
pub use literal::{parse_argument, parse_document, parse_document_array};
