//! bulkWrite execution.
//!
//! Operations run strictly in order as individual driver calls against the
//! target collection, accumulating one summary. Execution stops at the
//! first failing operation and the error propagates to the caller. The
//! driver's client-level bulk API is not used here because it requires
//! MongoDB 8.0 on the server.

use mongodb::options::UpdateOptions;
use tracing::debug;

use crate::error::Result;
use crate::parser::BulkOperation;

use super::result::ResultData;

/// Bulk write implementation
impl super::ShellExecutor<'_> {
    pub(super) async fn execute_bulk_write(
        &self,
        collection: &str,
        operations: Vec<BulkOperation>,
    ) -> Result<ResultData> {
        debug!(
            "executing bulkWrite on collection '{}' with {} operation(s)",
            collection,
            operations.len()
        );

        let coll = self.collection(collection);

        let mut inserted = 0u64;
        let mut matched = 0u64;
        let mut modified = 0u64;
        let mut deleted = 0u64;
        let mut upserted_ids = Vec::new();

        for (index, operation) in operations.into_iter().enumerate() {
            match operation {
                BulkOperation::InsertOne { document } => {
                    coll.insert_one(document).await?;
                    inserted += 1;
                }

                BulkOperation::UpdateOne {
                    filter,
                    update,
                    upsert,
                } => {
                    let options = UpdateOptions::builder().upsert(upsert).build();
                    let result = coll
                        .update_one(filter, update)
                        .with_options(options)
                        .await?;
                    matched += result.matched_count;
                    modified += result.modified_count;
                    if let Some(id) = result.upserted_id {
                        upserted_ids.push((index, id));
                    }
                }

                BulkOperation::UpdateMany {
                    filter,
                    update,
                    upsert,
                } => {
                    let options = UpdateOptions::builder().upsert(upsert).build();
                    let result = coll
                        .update_many(filter, update)
                        .with_options(options)
                        .await?;
                    matched += result.matched_count;
                    modified += result.modified_count;
                    if let Some(id) = result.upserted_id {
                        upserted_ids.push((index, id));
                    }
                }

                BulkOperation::DeleteOne { filter } => {
                    let result = coll.delete_one(filter).await?;
                    deleted += result.deleted_count;
                }

                BulkOperation::DeleteMany { filter } => {
                    let result = coll.delete_many(filter).await?;
                    deleted += result.deleted_count;
                }

                BulkOperation::ReplaceOne {
                    filter,
                    replacement,
                    upsert,
                } => {
                    let options = mongodb::options::ReplaceOptions::builder()
                        .upsert(upsert)
                        .build();
                    let result = coll
                        .replace_one(filter, replacement)
                        .with_options(options)
                        .await?;
                    matched += result.matched_count;
                    modified += result.modified_count;
                    if let Some(id) = result.upserted_id {
                        upserted_ids.push((index, id));
                    }
                }
            }
        }

        Ok(ResultData::BulkWrite {
            inserted,
            matched,
            modified,
            deleted,
            upserted_ids,
        })
    }
}
