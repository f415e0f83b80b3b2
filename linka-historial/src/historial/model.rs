//! Source records and the derived history event shapes

use chrono::{DateTime, Utc};
use linka_common::{parse_flexible_timestamp, EventCategory, RawTimestamp};

/// Campaign creation record (warehouse `Campanas`)
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignRecord {
    pub id: String,
    pub name: String,
    pub created_at: RawTimestamp,
    pub owner_actor_id: String,
}

/// Audience creation record (warehouse `Audiencias`)
#[derive(Debug, Clone, PartialEq)]
pub struct AudienceRecord {
    pub id: String,
    pub name: String,
    pub created_at: RawTimestamp,
    pub owner_actor_id: String,
}

/// Message send record (warehouse `Mensajes`)
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    pub id: String,
    pub body: String,
    /// Delivery channel, e.g. `sms` or `whatsapp`
    pub kind: String,
    pub sent_at: RawTimestamp,
    pub owner_actor_id: String,
}

/// User profile from the document store
#[derive(Debug, Clone, PartialEq)]
pub struct ActorProfile {
    pub actor_id: String,
    pub display_name: String,
}

/// One record from any of the historial sources
#[derive(Debug, Clone, PartialEq)]
pub enum SourceRecord {
    Campaign(CampaignRecord),
    Audience(AudienceRecord),
    Message(MessageRecord),
}

/// Event in the common shape, before the actor is resolved
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    pub actor_id: String,
    pub action_phrase: String,
    pub timestamp: RawTimestamp,
    /// `None` when the upstream timestamp is unparseable
    pub epoch: Option<DateTime<Utc>>,
    pub category: EventCategory,
}

/// Fully resolved history event
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEvent {
    pub actor_id: String,
    pub actor_display_name: String,
    pub action_phrase: String,
    pub timestamp: RawTimestamp,
    pub epoch: Option<DateTime<Utc>>,
    pub category: EventCategory,
}

impl SourceRecord {
    pub fn category(&self) -> EventCategory {
        match self {
            SourceRecord::Campaign(_) => EventCategory::Campaign,
            SourceRecord::Audience(_) => EventCategory::Audience,
            SourceRecord::Message(_) => EventCategory::Message,
        }
    }

    /// Map the record to the common event shape
    pub fn into_event(self) -> NormalizedEvent {
        let category = self.category();
        let (actor_id, action_phrase, timestamp) = match self {
            SourceRecord::Campaign(c) => (
                c.owner_actor_id,
                format!("creó la campaña \"{}\"", c.name),
                c.created_at,
            ),
            SourceRecord::Audience(a) => (
                a.owner_actor_id,
                format!("creó la audiencia \"{}\"", a.name),
                a.created_at,
            ),
            SourceRecord::Message(m) => (
                m.owner_actor_id,
                format!("envió un mensaje {} \"{}\"", m.kind, m.body),
                m.sent_at,
            ),
        };

        NormalizedEvent {
            epoch: parse_flexible_timestamp(&timestamp),
            actor_id,
            action_phrase,
            timestamp,
            category,
        }
    }
}

impl NormalizedEvent {
    pub fn with_display_name(self, actor_display_name: String) -> HistoryEvent {
        HistoryEvent {
            actor_id: self.actor_id,
            actor_display_name,
            action_phrase: self.action_phrase,
            timestamp: self.timestamp,
            epoch: self.epoch,
            category: self.category,
        }
    }
}
