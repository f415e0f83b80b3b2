//! Profile collection lookups

use async_trait::async_trait;
use linka_common::config::{is_valid_identifier, ProfileStoreConfig};
use linka_common::{Error, Result};
use sqlx::SqlitePool;

use super::ProfileStore;
use crate::historial::model::ActorProfile;

/// Reads `id, display_name` rows from the configured collection
#[derive(Debug, Clone)]
pub struct SqlProfileStore {
    pool: SqlitePool,
    collection: String,
    lookup_sql: String,
}

impl SqlProfileStore {
    pub fn new(pool: SqlitePool, config: &ProfileStoreConfig) -> Result<Self> {
        if !is_valid_identifier(&config.collection) {
            return Err(Error::Config(format!(
                "Invalid profile collection name: '{}'",
                config.collection
            )));
        }

        Ok(Self {
            pool,
            collection: config.collection.clone(),
            lookup_sql: format!(
                "SELECT id, display_name FROM {} WHERE id = ?",
                config.collection
            ),
        })
    }
}

#[async_trait]
impl ProfileStore for SqlProfileStore {
    async fn get_profile(&self, actor_id: &str) -> Result<Option<ActorProfile>> {
        let row: Option<(String, Option<String>)> = sqlx::query_as(&self.lookup_sql)
            .bind(actor_id)
            .fetch_optional(&self.pool)
            .await?;

        // A document without a display name is treated as missing
        Ok(row.and_then(|(actor_id, display_name)| {
            display_name.map(|display_name| ActorProfile {
                actor_id,
                display_name,
            })
        }))
    }

    fn collection(&self) -> Option<String> {
        Some(self.collection.clone())
    }
}
