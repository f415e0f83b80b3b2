//! Actor display-name resolution
//!
//! Distinct actor ids are looked up once each with a bounded number of
//! lookups in flight. Lookup failures never propagate: missing profiles,
//! store errors and timeouts all resolve to [`UNKNOWN_ACTOR`].

use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, warn};

use super::model::{HistoryEvent, NormalizedEvent};
use crate::store::ProfileStore;

/// Display name used when an actor cannot be resolved
pub const UNKNOWN_ACTOR: &str = "Usuario desconocido";

/// Resolves actor ids against a [`ProfileStore`]
pub struct ActorEnricher<'a> {
    store: &'a dyn ProfileStore,
    timeout: Duration,
    concurrency: usize,
}

impl<'a> ActorEnricher<'a> {
    pub fn new(store: &'a dyn ProfileStore, timeout: Duration, concurrency: usize) -> Self {
        Self {
            store,
            timeout,
            concurrency: concurrency.max(1),
        }
    }

    /// Attach a display name to every event; total over its input
    pub async fn enrich(&self, events: Vec<NormalizedEvent>) -> Vec<HistoryEvent> {
        let names = self
            .resolve_names(events.iter().map(|e| e.actor_id.as_str()))
            .await;

        events
            .into_iter()
            .map(|event| {
                let name = names
                    .get(&event.actor_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_ACTOR.to_string());
                event.with_display_name(name)
            })
            .collect()
    }

    /// Map of actor id to display name, one lookup per distinct id
    pub async fn resolve_names<'i>(
        &self,
        actor_ids: impl Iterator<Item = &'i str>,
    ) -> HashMap<String, String> {
        let mut seen = HashSet::new();
        let distinct: Vec<String> = actor_ids
            .filter(|id| seen.insert(*id))
            .map(str::to_string)
            .collect();

        debug!("Resolving {} distinct actors", distinct.len());

        stream::iter(distinct)
            .map(|actor_id| async move {
                let name = self.lookup(&actor_id).await;
                (actor_id, name)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }

    async fn lookup(&self, actor_id: &str) -> String {
        if actor_id.is_empty() {
            return UNKNOWN_ACTOR.to_string();
        }

        match tokio::time::timeout(self.timeout, self.store.get_profile(actor_id)).await {
            Ok(Ok(Some(profile))) => profile.display_name,
            Ok(Ok(None)) => {
                debug!("No profile for actor {}", actor_id);
                UNKNOWN_ACTOR.to_string()
            }
            Ok(Err(e)) => {
                warn!("Profile lookup failed for actor {}: {}", actor_id, e);
                UNKNOWN_ACTOR.to_string()
            }
            Err(_) => {
                warn!(
                    "Profile lookup for actor {} timed out after {:?}",
                    actor_id, self.timeout
                );
                UNKNOWN_ACTOR.to_string()
            }
        }
    }
}
