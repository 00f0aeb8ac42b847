//! Parsed operation descriptors.
//!
//! A [`ShellCommand`] is the output of the dispatch front-end: the
//! operation kind, the target collection, and fully parsed BSON arguments.
//! Descriptors are transient - built per statement, consumed by one
//! executor call, then dropped.

use mongodb::bson::Document;

use crate::error::{ParseError, Result};

/// A single parsed shell statement, ready for execution.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    /// Find documents matching a filter, with optional chained modifiers.
    Find {
        collection: String,
        filter: Document,
        modifiers: FindModifiers,
    },

    /// Run an aggregation pipeline.
    Aggregate {
        collection: String,
        pipeline: Vec<Document>,
    },

    /// Count documents matching a filter.
    Count {
        collection: String,
        filter: Document,
    },

    /// Insert a single document.
    InsertOne {
        collection: String,
        document: Document,
    },

    /// Insert multiple documents.
    InsertMany {
        collection: String,
        documents: Vec<Document>,
    },

    /// Update the first matching document.
    UpdateOne {
        collection: String,
        filter: Document,
        update: Document,
        options: UpdateArgs,
    },

    /// Update all matching documents.
    UpdateMany {
        collection: String,
        filter: Document,
        update: Document,
        options: UpdateArgs,
    },

    /// Delete the first matching document.
    DeleteOne {
        collection: String,
        filter: Document,
    },

    /// Delete all matching documents.
    DeleteMany {
        collection: String,
        filter: Document,
    },

    /// Execute a list of write operations in order.
    BulkWrite {
        collection: String,
        operations: Vec<BulkOperation>,
    },

    /// List collection names in the database.
    ListCollections,

    /// Database statistics (`db.stats()`).
    DbStats,
}

impl ShellCommand {
    /// Name of the operation, for logging.
    pub fn operation_name(&self) -> &'static str {
        match self {
            ShellCommand::Find { .. } => "find",
            ShellCommand::Aggregate { .. } => "aggregate",
            ShellCommand::Count { .. } => "count",
            ShellCommand::InsertOne { .. } => "insertOne",
            ShellCommand::InsertMany { .. } => "insertMany",
            ShellCommand::UpdateOne { .. } => "updateOne",
            ShellCommand::UpdateMany { .. } => "updateMany",
            ShellCommand::DeleteOne { .. } => "deleteOne",
            ShellCommand::DeleteMany { .. } => "deleteMany",
            ShellCommand::BulkWrite { .. } => "bulkWrite",
            ShellCommand::ListCollections => "getCollectionNames",
            ShellCommand::DbStats => "db.stats",
        }
    }
}

/// Chained modifiers collected from a `find` call.
///
/// Parsing is order-independent, but the executor always applies these in
/// the fixed order filter, projection, sort, skip, limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindModifiers {
    pub projection: Option<Document>,
    pub sort: Option<Document>,
    pub skip: Option<u64>,
    pub limit: Option<i64>,
}

/// Options accepted by update operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateArgs {
    pub upsert: bool,
}

impl UpdateArgs {
    /// Read update options from a shell options document. Unknown fields
    /// are ignored; `upsert` defaults to false.
    pub fn from_document(doc: &Document) -> Self {
        Self {
            upsert: doc.get_bool("upsert").unwrap_or(false),
        }
    }
}

/// One normalized `bulkWrite` operation descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkOperation {
    InsertOne {
        document: Document,
    },
    UpdateOne {
        filter: Document,
        update: Document,
        upsert: bool,
    },
    UpdateMany {
        filter: Document,
        update: Document,
        upsert: bool,
    },
    DeleteOne {
        filter: Document,
    },
    DeleteMany {
        filter: Document,
    },
    ReplaceOne {
        filter: Document,
        replacement: Document,
        upsert: bool,
    },
}

impl BulkOperation {
    /// Normalize a raw operation descriptor into the driver's expected
    /// per-op shape. Accepts both the driver form
    /// (`{insertOne: {document: {...}}}`) and the shorthand where the
    /// inner document is the payload itself (`{insertOne: {...}}`,
    /// `{deleteOne: {...}}`). `upsert` defaults to false.
    pub fn from_document(doc: &Document) -> Result<Self> {
        if let Ok(inner) = doc.get_document("insertOne") {
            let document = inner
                .get_document("document")
                .cloned()
                .unwrap_or_else(|_| inner.clone());
            return Ok(BulkOperation::InsertOne { document });
        }

        if let Ok(inner) = doc.get_document("updateOne") {
            let (filter, update, upsert) = update_parts(inner, "updateOne")?;
            return Ok(BulkOperation::UpdateOne {
                filter,
                update,
                upsert,
            });
        }

        if let Ok(inner) = doc.get_document("updateMany") {
            let (filter, update, upsert) = update_parts(inner, "updateMany")?;
            return Ok(BulkOperation::UpdateMany {
                filter,
                update,
                upsert,
            });
        }

        if let Ok(inner) = doc.get_document("deleteOne") {
            let filter = inner
                .get_document("filter")
                .cloned()
                .unwrap_or_else(|_| inner.clone());
            return Ok(BulkOperation::DeleteOne { filter });
        }

        if let Ok(inner) = doc.get_document("deleteMany") {
            let filter = inner
                .get_document("filter")
                .cloned()
                .unwrap_or_else(|_| inner.clone());
            return Ok(BulkOperation::DeleteMany { filter });
        }

        if let Ok(inner) = doc.get_document("replaceOne") {
            let filter = inner.get_document("filter").map_err(|_| {
                ParseError::InvalidQuery("replaceOne operation requires a 'filter'".to_string())
            })?;
            let replacement = inner.get_document("replacement").map_err(|_| {
                ParseError::InvalidQuery(
                    "replaceOne operation requires a 'replacement'".to_string(),
                )
            })?;
            return Ok(BulkOperation::ReplaceOne {
                filter: filter.clone(),
                replacement: replacement.clone(),
                upsert: inner.get_bool("upsert").unwrap_or(false),
            });
        }

        Err(ParseError::InvalidQuery(
            "bulkWrite operations must be tagged with one of insertOne, updateOne, \
             updateMany, deleteOne, deleteMany, replaceOne"
                .to_string(),
        )
        .into())
    }
}

fn update_parts(inner: &Document, op: &str) -> Result<(Document, Document, bool)> {
    let filter = inner
        .get_document("filter")
        .map_err(|_| ParseError::InvalidQuery(format!("{op} operation requires a 'filter'")))?;
    let update = inner
        .get_document("update")
        .map_err(|_| ParseError::InvalidQuery(format!("{op} operation requires an 'update'")))?;
    Ok((
        filter.clone(),
        update.clone(),
        inner.get_bool("upsert").unwrap_or(false),
    ))
}
