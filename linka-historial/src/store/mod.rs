//! Access to the external stores behind the historial
//!
//! Both stores are opaque external services reached through object-safe
//! traits. The sqlx implementations open read-only connections: this
//! service never writes.

use async_trait::async_trait;
use linka_common::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::historial::model::{ActorProfile, AudienceRecord, CampaignRecord, MessageRecord};

mod profiles;
mod warehouse;

pub use profiles::SqlProfileStore;
pub use warehouse::SqlRecordSource;

/// Bulk reads of the three historial source tables
///
/// Each call returns the full current set of records of one kind. Errors
/// are surfaced unchanged.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_campaigns(&self) -> Result<Vec<CampaignRecord>>;

    async fn fetch_audiences(&self) -> Result<Vec<AudienceRecord>>;

    async fn fetch_messages(&self) -> Result<Vec<MessageRecord>>;

    /// Names of the tables read, for diagnostics
    fn tables(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Get-by-key over the user profile collection
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// `Ok(None)` when no profile exists for the actor
    async fn get_profile(&self, actor_id: &str) -> Result<Option<ActorProfile>>;

    /// Name of the collection read, for diagnostics
    fn collection(&self) -> Option<String> {
        None
    }
}

/// Open a read-only pool for a store URL
pub async fn connect_readonly(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.read_only(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;

    Ok(pool)
}
