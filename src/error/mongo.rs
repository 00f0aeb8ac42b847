//! Message extraction from MongoDB driver errors.
//!
//! The shell transcript displays a single error string per failed command,
//! so the interesting part of a driver error is the server's message (for
//! duplicate keys, validation failures, and the like). This module pulls
//! that message out of the driver's typed error kinds instead of parsing
//! `Debug` output.

use mongodb::error::{Error, ErrorKind, WriteFailure};

/// Extract a human-readable message from a MongoDB driver error.
///
/// Falls back to the driver's own `Display` output for kinds that carry no
/// structured message.
pub fn driver_error_message(error: &Error) -> String {
    match error.kind.as_ref() {
        ErrorKind::Write(write_failure) => match write_failure {
            WriteFailure::WriteError(write_error) => write_error.message.clone(),
            WriteFailure::WriteConcernError(wc_error) => wc_error.message.clone(),
            _ => error.to_string(),
        },
        ErrorKind::Command(command_error) => command_error.message.clone(),
        ErrorKind::InsertMany(insert_error) => {
            if let Some(first) = insert_error
                .write_errors
                .as_ref()
                .and_then(|errs| errs.first())
            {
                first.message.clone()
            } else if let Some(wc_error) = &insert_error.write_concern_error {
                wc_error.message.clone()
            } else {
                error.to_string()
            }
        }
        ErrorKind::Authentication { message, .. } => message.clone(),
        ErrorKind::InvalidArgument { message, .. } => message.clone(),
        ErrorKind::ServerSelection { message, .. } => message.clone(),
        _ => error.to_string(),
    }
}
