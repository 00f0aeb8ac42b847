//! Database-level operations: collection listing and stats.

use mongodb::bson::doc;
use tracing::debug;

use crate::error::Result;

use super::result::ResultData;

/// Admin operations implementation
impl super::ShellExecutor<'_> {
    pub(super) async fn execute_list_collections(&self) -> Result<ResultData> {
        debug!("listing collections in database '{}'", self.db.name());

        let names = self.db.list_collection_names().await?;

        Ok(ResultData::CollectionNames(names))
    }

    pub(super) async fn execute_db_stats(&self) -> Result<ResultData> {
        debug!("fetching stats for database '{}'", self.db.name());

        let stats = self.db.run_command(doc! {"dbStats": 1}).await?;

        Ok(ResultData::Document(stats))
    }
}
