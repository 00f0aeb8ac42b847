//! Write operations: insert, update, delete.

use mongodb::bson::Document;
use mongodb::options::UpdateOptions;
use tracing::debug;

use crate::error::Result;
use crate::parser::UpdateArgs;

use super::result::ResultData;

/// Write operations implementation
impl super::ShellExecutor<'_> {
    pub(super) async fn execute_insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<ResultData> {
        debug!("executing insertOne on collection '{}'", collection);

        let result = self.collection(collection).insert_one(document).await?;

        Ok(ResultData::InsertOne {
            inserted_id: result.inserted_id,
        })
    }

    pub(super) async fn execute_insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<ResultData> {
        debug!(
            "executing insertMany on collection '{}' with {} document(s)",
            collection,
            documents.len()
        );

        let result = self.collection(collection).insert_many(documents).await?;

        // The driver returns ids keyed by batch index; flatten in order.
        let mut indexed: Vec<_> = result.inserted_ids.into_iter().collect();
        indexed.sort_by_key(|(index, _)| *index);
        let inserted_ids = indexed.into_iter().map(|(_, id)| id).collect();

        Ok(ResultData::InsertMany { inserted_ids })
    }

    pub(super) async fn execute_update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: UpdateArgs,
        many: bool,
    ) -> Result<ResultData> {
        debug!(
            "executing {} on collection '{}'",
            if many { "updateMany" } else { "updateOne" },
            collection
        );

        let coll = self.collection(collection);
        let update_options = UpdateOptions::builder().upsert(options.upsert).build();

        let result = if many {
            coll.update_many(filter, update)
                .with_options(update_options)
                .await?
        } else {
            coll.update_one(filter, update)
                .with_options(update_options)
                .await?
        };

        Ok(ResultData::Update {
            matched: result.matched_count,
            modified: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    pub(super) async fn execute_delete(
        &self,
        collection: &str,
        filter: Document,
        many: bool,
    ) -> Result<ResultData> {
        debug!(
            "executing {} on collection '{}'",
            if many { "deleteMany" } else { "deleteOne" },
            collection
        );

        let coll = self.collection(collection);
        let result = if many {
            coll.delete_many(filter).await?
        } else {
            coll.delete_one(filter).await?
        };

        Ok(ResultData::Delete {
            deleted: result.deleted_count,
        })
    }
}
