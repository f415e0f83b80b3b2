//! Historial (audit log) read model
//!
//! Fetch the three record streams concurrently, normalize them into one
//! event shape, resolve actor names, then filter/sort/paginate in memory.
//! Everything is rebuilt per request; nothing is cached or shared.

pub mod enricher;
pub mod model;
pub mod query;

use linka_common::config::HistorialConfig;
use linka_common::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::store::{ProfileStore, RecordSource};
use enricher::ActorEnricher;
use model::{NormalizedEvent, SourceRecord};
use query::{apply_query, HistoryPage, HistoryQuery};

pub use enricher::UNKNOWN_ACTOR;

/// Composes the historial page from the external stores
pub struct HistoryService {
    records: Arc<dyn RecordSource>,
    profiles: Arc<dyn ProfileStore>,
    settings: HistorialConfig,
}

impl HistoryService {
    pub fn new(
        records: Arc<dyn RecordSource>,
        profiles: Arc<dyn ProfileStore>,
        settings: HistorialConfig,
    ) -> Self {
        Self {
            records,
            profiles,
            settings,
        }
    }

    pub fn settings(&self) -> &HistorialConfig {
        &self.settings
    }

    /// Warehouse tables and profile collection this service reads
    pub fn sources(&self) -> (Vec<String>, Option<String>) {
        (self.records.tables(), self.profiles.collection())
    }

    /// Build one page of the general historial
    ///
    /// Any record fetch failure fails the whole request; actor lookups
    /// never do.
    pub async fn general(&self, query: &HistoryQuery) -> Result<HistoryPage> {
        let records = self.fetch_all().await?;
        let events = normalize(records);

        let enricher = ActorEnricher::new(
            self.profiles.as_ref(),
            self.settings.query_timeout(),
            self.settings.lookup_concurrency,
        );
        let enriched = enricher.enrich(events).await;

        let page = apply_query(enriched, query);
        debug!(
            "Historial page {} of {}: {} of {} matching events",
            query.page,
            page.pagination.total_pages,
            page.events.len(),
            page.pagination.total_count
        );
        Ok(page)
    }

    /// Run the three fetchers concurrently and merge in source order
    async fn fetch_all(&self) -> Result<Vec<SourceRecord>> {
        let timeout = self.settings.query_timeout();
        let (campaigns, audiences, messages) = tokio::try_join!(
            with_timeout(timeout, "campaign fetch", self.records.fetch_campaigns()),
            with_timeout(timeout, "audience fetch", self.records.fetch_audiences()),
            with_timeout(timeout, "message fetch", self.records.fetch_messages()),
        )?;

        debug!(
            "Fetched {} campaigns, {} audiences, {} messages",
            campaigns.len(),
            audiences.len(),
            messages.len()
        );

        let mut merged = Vec::with_capacity(campaigns.len() + audiences.len() + messages.len());
        merged.extend(campaigns.into_iter().map(SourceRecord::Campaign));
        merged.extend(audiences.into_iter().map(SourceRecord::Audience));
        merged.extend(messages.into_iter().map(SourceRecord::Message));
        Ok(merged)
    }
}

/// Normalize every record, logging how many timestamps were unparseable
fn normalize(records: Vec<SourceRecord>) -> Vec<NormalizedEvent> {
    let events: Vec<NormalizedEvent> = records.into_iter().map(SourceRecord::into_event).collect();

    let malformed = events.iter().filter(|e| e.epoch.is_none()).count();
    if malformed > 0 {
        warn!(
            "{} of {} historial events have unparseable timestamps",
            malformed,
            events.len()
        );
    }
    events
}

/// Single attempt bounded by `timeout`
async fn with_timeout<T>(
    timeout: Duration,
    what: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| Error::Timeout {
            operation: what.to_string(),
            after: timeout,
        })?
}
