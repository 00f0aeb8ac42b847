//! Dispatch front-end: raw statement text to [`ShellCommand`].
//!
//! Determines which operation a statement represents, extracts its target
//! collection (falling back to the caller-supplied default), pulls argument
//! text out with the balanced-content extractor, and parses arguments into
//! BSON. Detection order is fixed and mirrors the shell's supported
//! operation list; text that matches nothing yields the unsupported-command
//! error verbatim.

use mongodb::bson::{Bson, Document};

use crate::error::{ParseError, Result};
use crate::parser::command::{BulkOperation, FindModifiers, ShellCommand, UpdateArgs};
use crate::parser::literal::{parse_argument, parse_document, parse_document_array};
use crate::parser::scan;

/// Parse one statement (already split on top-level semicolons) into a
/// command descriptor.
pub fn parse_command(statement: &str, default_collection: &str) -> Result<ShellCommand> {
    let trimmed = statement.trim();

    if scan::has_method_call(trimmed, "find") {
        return parse_find(trimmed, default_collection);
    }
    if scan::has_method_call(trimmed, "aggregate") {
        return parse_aggregate(trimmed, default_collection);
    }
    if scan::has_method_call(trimmed, "countDocuments") || scan::has_method_call(trimmed, "count")
    {
        return parse_count(trimmed, default_collection);
    }
    if scan::has_method_call(trimmed, "insertOne") {
        return parse_insert(trimmed, default_collection, false);
    }
    if scan::has_method_call(trimmed, "insertMany") {
        return parse_insert(trimmed, default_collection, true);
    }
    if scan::has_method_call(trimmed, "updateOne") {
        return parse_update(trimmed, default_collection, false);
    }
    if scan::has_method_call(trimmed, "updateMany") {
        return parse_update(trimmed, default_collection, true);
    }
    if scan::has_method_call(trimmed, "deleteOne") {
        return parse_delete(trimmed, default_collection, false);
    }
    if scan::has_method_call(trimmed, "deleteMany") {
        return parse_delete(trimmed, default_collection, true);
    }
    if scan::has_method_call(trimmed, "bulkWrite") {
        return parse_bulk_write(trimmed, default_collection);
    }
    if scan::contains_outside_strings(trimmed, "getCollectionNames")
        || scan::contains_outside_strings(trimmed, "show collections")
    {
        return Ok(ShellCommand::ListCollections);
    }
    if scan::contains_outside_strings(trimmed, "db.stats(") {
        return Ok(ShellCommand::DbStats);
    }

    Err(ParseError::UnsupportedCommand.into())
}

/// Resolve the target collection for an operation, preferring an explicit
/// `db.<name>.<method>(` over the default.
fn target_collection(text: &str, method: &str, default_collection: &str) -> Result<String> {
    if let Some(name) = scan::collection_target(text, method) {
        return Ok(name);
    }
    if default_collection.is_empty() {
        return Err(ParseError::InvalidCommand(format!(
            "{method}() needs a collection: use db.<collection>.{method}(...) or select a \
             collection first"
        ))
        .into());
    }
    Ok(default_collection.to_string())
}

/// Extract the balanced argument text of the statement's `method(...)`
/// call, dotted or bare, surfacing unbalanced parentheses as a syntax
/// error.
fn argument_text<'a>(text: &'a str, method: &str) -> Result<scan::Balanced<'a>> {
    scan::statement_call(text, method).ok_or_else(|| {
        ParseError::SyntaxError(format!("unbalanced parentheses in {method}()")).into()
    })
}

fn parse_find(text: &str, default_collection: &str) -> Result<ShellCommand> {
    let collection = target_collection(text, "find", default_collection)?;
    let args = argument_text(text, "find")?;

    let filter = if args.content.trim().is_empty() {
        Document::new()
    } else {
        parse_document(args.content)?
    };

    let modifiers = parse_find_modifiers(text, args.end)?;

    Ok(ShellCommand::Find {
        collection,
        filter,
        modifiers,
    })
}

/// Collect chained `.project()`, `.sort()`, `.skip()`, `.limit()` calls
/// appearing anywhere after the `find(...)` arguments. Textual order does
/// not matter; the executor applies them in a fixed order.
fn parse_find_modifiers(text: &str, from: usize) -> Result<FindModifiers> {
    let mut modifiers = FindModifiers::default();

    let projection = scan::find_method_call(text, from, "project")
        .or_else(|| scan::find_method_call(text, from, "projection"));
    if let Some((_, args)) = projection {
        modifiers.projection = Some(parse_document(args.content)?);
    }

    if let Some((_, args)) = scan::find_method_call(text, from, "sort") {
        modifiers.sort = Some(parse_document(args.content)?);
    }

    if let Some((_, args)) = scan::find_method_call(text, from, "skip") {
        let skip = integer_argument(args.content, "skip")?;
        if skip < 0 {
            return Err(
                ParseError::InvalidQuery("skip() value must be non-negative".to_string()).into(),
            );
        }
        modifiers.skip = Some(skip as u64);
    }

    if let Some((_, args)) = scan::find_method_call(text, from, "limit") {
        let limit = integer_argument(args.content, "limit")?;
        if limit < 0 {
            return Err(
                ParseError::InvalidQuery("limit() value must be non-negative".to_string()).into(),
            );
        }
        modifiers.limit = Some(limit);
    }

    Ok(modifiers)
}

fn integer_argument(source: &str, method: &str) -> Result<i64> {
    match parse_argument(source)? {
        Bson::Int32(n) => Ok(n as i64),
        Bson::Int64(n) => Ok(n),
        Bson::Double(n) if n.fract() == 0.0 => Ok(n as i64),
        _ => Err(
            ParseError::InvalidQuery(format!("{method}() requires an integer argument")).into(),
        ),
    }
}

fn parse_aggregate(text: &str, default_collection: &str) -> Result<ShellCommand> {
    let collection = target_collection(text, "aggregate", default_collection)?;
    let args = argument_text(text, "aggregate")?;

    // Surface any shape mismatch under the pipeline error kind.
    let pipeline = parse_document_array(args.content).map_err(|e| match e {
        crate::error::ShellError::Parse(ParseError::InvalidQuery(msg)) => {
            ParseError::InvalidPipeline(msg).into()
        }
        other => other,
    })?;

    Ok(ShellCommand::Aggregate {
        collection,
        pipeline,
    })
}

fn parse_count(text: &str, default_collection: &str) -> Result<ShellCommand> {
    let method = if scan::has_method_call(text, "countDocuments") {
        "countDocuments"
    } else {
        "count"
    };
    let collection = target_collection(text, method, default_collection)?;
    let args = argument_text(text, method)?;

    let filter = if args.content.trim().is_empty() {
        Document::new()
    } else {
        parse_document(args.content)?
    };

    Ok(ShellCommand::Count { collection, filter })
}

fn parse_insert(text: &str, default_collection: &str, many: bool) -> Result<ShellCommand> {
    let method = if many { "insertMany" } else { "insertOne" };
    let collection = target_collection(text, method, default_collection)?;
    let args = argument_text(text, method)?;

    let value = parse_argument(args.content)?;

    if many {
        // A single object is coerced into a one-element batch.
        let documents = match value {
            Bson::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Bson::Document(doc) => Ok(doc),
                    _ => Err(ParseError::InvalidQuery(
                        "insertMany() array must contain only documents".to_string(),
                    )
                    .into()),
                })
                .collect::<Result<Vec<Document>>>()?,
            Bson::Document(doc) => vec![doc],
            _ => {
                return Err(ParseError::InvalidQuery(
                    "insertMany() requires an array of documents".to_string(),
                )
                .into());
            }
        };
        if documents.is_empty() {
            return Err(ParseError::InvalidQuery(
                "insertMany() requires at least one document".to_string(),
            )
            .into());
        }
        Ok(ShellCommand::InsertMany {
            collection,
            documents,
        })
    } else {
        match value {
            Bson::Document(document) => Ok(ShellCommand::InsertOne {
                collection,
                document,
            }),
            _ => Err(ParseError::InvalidQuery(
                "insertOne() requires a single document".to_string(),
            )
            .into()),
        }
    }
}

fn parse_update(text: &str, default_collection: &str, many: bool) -> Result<ShellCommand> {
    let method = if many { "updateMany" } else { "updateOne" };
    let collection = target_collection(text, method, default_collection)?;
    let args = argument_text(text, method)?;

    // Filter, update, and optional options are separated by top-level
    // commas only; commas nested inside braces stay put.
    let parts = scan::split_top_level(args.content);
    if parts.len() < 2 {
        return Err(ParseError::SyntaxError(format!(
            "{method}() is missing the filter or update parameter"
        ))
        .into());
    }
    if parts.len() > 3 {
        return Err(ParseError::SyntaxError(format!(
            "{method}() takes at most 3 arguments, got {}",
            parts.len()
        ))
        .into());
    }

    let filter = parse_document(parts[0])?;
    let update = parse_document(parts[1])?;
    let options = match parts.get(2) {
        Some(source) => UpdateArgs::from_document(&parse_document(source)?),
        None => UpdateArgs::default(),
    };

    if many {
        Ok(ShellCommand::UpdateMany {
            collection,
            filter,
            update,
            options,
        })
    } else {
        Ok(ShellCommand::UpdateOne {
            collection,
            filter,
            update,
            options,
        })
    }
}

fn parse_delete(text: &str, default_collection: &str, many: bool) -> Result<ShellCommand> {
    let method = if many { "deleteMany" } else { "deleteOne" };
    let collection = target_collection(text, method, default_collection)?;
    let args = argument_text(text, method)?;

    if args.content.trim().is_empty() {
        return Err(ParseError::SyntaxError(format!("{method}() requires a filter")).into());
    }

    let filter = parse_document(args.content)?;

    if many {
        Ok(ShellCommand::DeleteMany { collection, filter })
    } else {
        Ok(ShellCommand::DeleteOne { collection, filter })
    }
}

fn parse_bulk_write(text: &str, default_collection: &str) -> Result<ShellCommand> {
    let collection = target_collection(text, "bulkWrite", default_collection)?;
    let args = argument_text(text, "bulkWrite")?;

    let raw_operations = parse_document_array(args.content)?;

    let operations = raw_operations
        .iter()
        .map(BulkOperation::from_document)
        .collect::<Result<Vec<_>>>()?;

    if operations.is_empty() {
        return Err(ParseError::InvalidQuery(
            "bulkWrite() requires at least one operation".to_string(),
        )
        .into());
    }

    Ok(ShellCommand::BulkWrite {
        collection,
        operations,
    })
}
