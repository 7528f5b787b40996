//! `philoagents delete-memory` handler.

use tracing::info;

use crate::config::Settings;
use crate::error::Result;
use crate::store;

use super::DeleteMemoryArgs;

/// Drop a collection if it exists. Returns whether it was dropped.
pub async fn handle_delete_memory(args: DeleteMemoryArgs, settings: &Settings) -> Result<bool> {
    let collection = args
        .collection_name
        .unwrap_or_else(|| settings.long_term_memory_collection.clone());
    let data_dir = args.data_dir.unwrap_or_else(|| settings.data_dir.clone());
    let db_name = args.db_name.unwrap_or_else(|| settings.db_name.clone());

    let existing = store::list_collections(&data_dir, &db_name).await?;
    if !existing.contains(&store::normalize_label(&collection)) {
        info!(%collection, db = %db_name, "'{}' collection does not exist.", collection);
        return Ok(false);
    }

    store::drop_collection(&data_dir, &db_name, &collection).await?;
    info!(%collection, db = %db_name, "Successfully deleted '{}' collection.", collection);
    Ok(true)
}
