use std::fmt;

use crate::error::mongo::driver_error_message;

/// Crate-wide `Result` type using [`ShellError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, ShellError>;

/// Top-level error type for shell interpreter operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum ShellError {
    /// Command parsing errors.
    Parse(ParseError),

    /// Command execution errors.
    Execution(ExecutionError),

    /// MongoDB driver errors.
    MongoDb(mongodb::error::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Parsing-specific errors.
#[derive(Debug)]
pub enum ParseError {
    /// Syntax error in command text.
    SyntaxError(String),

    /// Invalid command format.
    InvalidCommand(String),

    /// Command text matched none of the recognized operations.
    UnsupportedCommand,

    /// Invalid query or argument document.
    InvalidQuery(String),

    /// Invalid aggregation pipeline.
    InvalidPipeline(String),
}

/// Execution-specific errors.
#[derive(Debug)]
pub enum ExecutionError {
    /// Query execution failed.
    QueryFailed(String),

    /// Invalid operation parameters.
    InvalidParameters(String),
}

/// Operations the interpreter understands, listed in the unsupported-command
/// error so the shell transcript can show the user what is available.
pub const SUPPORTED_OPERATIONS: &str = "find, aggregate, count, insertOne, insertMany, \
updateOne, updateMany, deleteOne, deleteMany, bulkWrite, getCollectionNames, db.stats()";

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::Parse(e) => write!(f, "{e}"),
            ShellError::Execution(e) => write!(f, "{e}"),
            ShellError::MongoDb(e) => write!(f, "{}", driver_error_message(e)),
            ShellError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::SyntaxError(msg) => write!(f, "Syntax error: {msg}"),
            ParseError::InvalidCommand(msg) => write!(f, "Invalid command: {msg}"),
            ParseError::UnsupportedCommand => write!(
                f,
                "Command not supported or invalid syntax. Supported commands: {SUPPORTED_OPERATIONS}"
            ),
            ParseError::InvalidQuery(msg) => write!(f, "Invalid query: {msg}"),
            ParseError::InvalidPipeline(msg) => write!(f, "Invalid pipeline: {msg}"),
        }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            ExecutionError::InvalidParameters(msg) => write!(f, "Invalid parameters: {msg}"),
        }
    }
}

impl std::error::Error for ShellError {}
impl std::error::Error for ParseError {}
impl std::error::Error for ExecutionError {}

/* ========================= Conversions to ShellError ========================= */

impl From<ParseError> for ShellError {
    fn from(err: ParseError) -> Self {
        ShellError::Parse(err)
    }
}

impl From<ExecutionError> for ShellError {
    fn from(err: ExecutionError) -> Self {
        ShellError::Execution(err)
    }
}

impl From<mongodb::error::Error> for ShellError {
    fn from(err: mongodb::error::Error) -> Self {
        ShellError::MongoDb(err)
    }
}

impl From<String> for ShellError {
    fn from(msg: String) -> Self {
        ShellError::Generic(msg)
    }
}

impl From<&str> for ShellError {
    fn from(msg: &str) -> Self {
        ShellError::Generic(msg.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_command_lists_operations() {
        let err = ShellError::from(ParseError::UnsupportedCommand);
        let msg = err.to_string();
        assert!(msg.contains("Supported commands"));
        assert!(msg.contains("bulkWrite"));
        assert!(msg.contains("db.stats()"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::SyntaxError("unbalanced parentheses".to_string());
        assert_eq!(err.to_string(), "Syntax error: unbalanced parentheses");
    }
}
