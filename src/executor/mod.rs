//! Command execution against a MongoDB database.
//!
//! The [`ShellExecutor`] takes parsed [`ShellCommand`] descriptors and runs
//! them through the driver. The module is organized into sub-modules by
//! operation type:
//! - `read`: find, aggregate, count
//! - `write`: insert, update, delete
//! - `bulk`: bulkWrite
//! - `admin`: collection listing and database stats

use tracing::debug;

use crate::error::Result;
use crate::parser::ShellCommand;

mod admin;
mod bulk;
mod read;
pub mod result;
mod write;

pub use result::ResultData;

/// Executes parsed shell commands against one database handle.
pub struct ShellExecutor<'a> {
    db: &'a mongodb::Database,
}

impl<'a> ShellExecutor<'a> {
    pub fn new(db: &'a mongodb::Database) -> Self {
        Self { db }
    }

    /// Execute a single parsed command.
    pub async fn execute(&self, command: ShellCommand) -> Result<ResultData> {
        debug!(
            operation = command.operation_name(),
            database = self.db.name(),
            "executing shell command"
        );

        match command {
            ShellCommand::Find {
                collection,
                filter,
                modifiers,
            } => self.execute_find(&collection, filter, modifiers).await,

            ShellCommand::Aggregate {
                collection,
                pipeline,
            } => self.execute_aggregate(&collection, pipeline).await,

            ShellCommand::Count { collection, filter } => {
                self.execute_count(&collection, filter).await
            }

            ShellCommand::InsertOne {
                collection,
                document,
            } => self.execute_insert_one(&collection, document).await,

            ShellCommand::InsertMany {
                collection,
                documents,
            } => self.execute_insert_many(&collection, documents).await,

            ShellCommand::UpdateOne {
                collection,
                filter,
                update,
                options,
            } => {
                self.execute_update(&collection, filter, update, options, false)
                    .await
            }

            ShellCommand::UpdateMany {
                collection,
                filter,
                update,
                options,
            } => {
                self.execute_update(&collection, filter, update, options, true)
                    .await
            }

            ShellCommand::DeleteOne { collection, filter } => {
                self.execute_delete(&collection, filter, false).await
            }

            ShellCommand::DeleteMany { collection, filter } => {
                self.execute_delete(&collection, filter, true).await
            }

            ShellCommand::BulkWrite {
                collection,
                operations,
            } => self.execute_bulk_write(&collection, operations).await,

            ShellCommand::ListCollections => self.execute_list_collections().await,

            ShellCommand::DbStats => self.execute_db_stats().await,
        }
    }

    fn collection(&self, name: &str) -> mongodb::Collection<mongodb::bson::Document> {
        self.db.collection(name)
    }
}
