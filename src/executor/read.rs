//! Read operations: find, aggregate, count.

use futures::stream::TryStreamExt;
use mongodb::bson::Document;
use tracing::debug;

use crate::error::Result;
use crate::parser::FindModifiers;

use super::result::ResultData;

/// Read operations implementation
impl super::ShellExecutor<'_> {
    /// Execute a find query with its chained modifiers.
    ///
    /// Modifiers are applied in a fixed order regardless of how they were
    /// chained in the source text: projection, sort, skip, limit.
    pub(super) async fn execute_find(
        &self,
        collection: &str,
        filter: Document,
        modifiers: FindModifiers,
    ) -> Result<ResultData> {
        debug!("executing find on collection '{}'", collection);

        let mut options = mongodb::options::FindOptions::default();
        options.projection = modifiers.projection;
        options.sort = modifiers.sort;
        options.skip = modifiers.skip;
        options.limit = modifiers.limit;

        let cursor = self
            .collection(collection)
            .find(filter)
            .with_options(options)
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        Ok(ResultData::Documents(documents))
    }

    /// Execute an aggregation pipeline.
    pub(super) async fn execute_aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> Result<ResultData> {
        debug!(
            "executing aggregate on collection '{}' with {} stage(s)",
            collection,
            pipeline.len()
        );

        let cursor = self.collection(collection).aggregate(pipeline).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        Ok(ResultData::Documents(documents))
    }

    /// Execute a count with an optional filter.
    pub(super) async fn execute_count(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<ResultData> {
        debug!("executing count on collection '{}'", collection);

        let count = self.collection(collection).count_documents(filter).await?;

        Ok(ResultData::Count(count))
    }
}
