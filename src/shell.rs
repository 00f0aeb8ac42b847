//! Top-level shell entry point and multi-statement orchestration.
//!
//! [`execute`] is the whole public surface: one command string in, one
//! [`ShellResponse`] out. Statements separated by top-level semicolons run
//! strictly in order; execution stops at the first failure, and the
//! response carries only the last statement's result. Side effects of
//! statements that already ran are not rolled back.

use mongodb::Database;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ShellError, driver_error_message};
use crate::executor::ShellExecutor;
use crate::parser::{parse_command, scan};

/// Response returned to the UI.
///
/// Serializes as `{"result": ...}` on success or `{"error": "..."}` on
/// failure. Execution failures never surface as an `Err` at this layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ShellResponse {
    Result(Value),
    Error(String),
}

/// Interpret and run a shell command string against a database.
///
/// `default_collection` is used when a statement omits the
/// `db.<collection>.` prefix; pass an empty string when no collection is
/// selected.
pub async fn execute(command: &str, db: &Database, default_collection: &str) -> ShellResponse {
    let trimmed = command.trim();
    if trimmed.is_empty() {
        return ShellResponse::Error("empty command".to_string());
    }

    let statements = scan::split_statements(trimmed);
    if statements.is_empty() {
        return ShellResponse::Error("empty command".to_string());
    }

    debug!(
        statements = statements.len(),
        database = db.name(),
        "interpreting shell input"
    );

    let executor = ShellExecutor::new(db);
    let mut last_result = Value::Null;

    for statement in statements {
        let outcome = run_statement(&executor, statement, default_collection).await;
        match outcome {
            Ok(value) => last_result = value,
            Err(error) => {
                info!("shell command failed: {}", error_message(&error));
                return ShellResponse::Error(format!(
                    "Error in command \"{statement}\": {}",
                    error_message(&error)
                ));
            }
        }
    }

    ShellResponse::Result(last_result)
}

async fn run_statement(
    executor: &ShellExecutor<'_>,
    statement: &str,
    default_collection: &str,
) -> Result<Value, ShellError> {
    let command = parse_command(statement, default_collection)?;
    let result = executor.execute(command).await?;
    Ok(result.to_json())
}

/// Render an error as the message string the UI shows. Driver errors go
/// through structured `ErrorKind` extraction; everything else uses its
/// `Display` form.
fn error_message(error: &ShellError) -> String {
    match error {
        ShellError::MongoDb(driver_error) => driver_error_message(driver_error),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    // Client construction is lazy, so parse failures can be exercised
    // through the full entry point without a running server.
    async fn test_database() -> mongodb::Database {
        let client = mongodb::Client::with_uri_str("mongodb://localhost:27017")
            .await
            .unwrap();
        client.database("shell_tests")
    }

    #[test]
    fn test_execute_rejects_empty_input() {
        init_tracing();
        tokio_test::block_on(async {
            let db = test_database().await;
            let response = execute("   ", &db, "items").await;
            assert_eq!(response, ShellResponse::Error("empty command".to_string()));
        });
    }

    #[test]
    fn test_execute_wraps_parse_failure_with_statement() {
        init_tracing();
        tokio_test::block_on(async {
            let db = test_database().await;
            let response = execute("db.users.find({a: 1}", &db, "").await;
            match response {
                ShellResponse::Error(msg) => {
                    assert!(msg.starts_with("Error in command \"db.users.find({a: 1}\":"));
                    assert!(msg.contains("unbalanced parentheses"));
                }
                other => panic!("expected error response, got {other:?}"),
            }
        });
    }

    #[test]
    fn test_execute_unsupported_command_lists_operations() {
        init_tracing();
        tokio_test::block_on(async {
            let db = test_database().await;
            let response = execute("db.foo.renameCollection('bar')", &db, "").await;
            match response {
                ShellResponse::Error(msg) => assert!(msg.contains("Supported commands")),
                other => panic!("expected error response, got {other:?}"),
            }
        });
    }

    #[test]
    fn test_response_serializes_result() {
        let response = ShellResponse::Result(json!([{"a": 1}]));
        let text = serde_json::to_string(&response).unwrap();
        assert_eq!(text, r#"{"result":[{"a":1}]}"#);
    }

    #[test]
    fn test_response_serializes_error() {
        let response = ShellResponse::Error("bad input".to_string());
        let text = serde_json::to_string(&response).unwrap();
        assert_eq!(text, r#"{"error":"bad input"}"#);
    }

    #[test]
    fn test_error_message_wraps_failing_statement() {
        // Parse failures do not need a live database.
        let statement = "db.users.find({a: 1}";
        let error = crate::parser::parse_command(statement, "users").unwrap_err();
        let message = format!(
            "Error in command \"{statement}\": {}",
            error_message(&error)
        );
        assert!(message.starts_with("Error in command \"db.users.find({a: 1}\":"));
        assert!(message.contains("unbalanced parentheses"));
    }
}
