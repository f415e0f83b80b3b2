//! Event category vocabulary for the historial read model
//!
//! The category is matched on its canonical (unaccented, English) spelling.
//! The accented Spanish label is only produced for presentation via
//! [`EventCategory::display_label`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Which source record produced a history event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    /// Campaign creation
    Campaign,
    /// Audience creation
    Audience,
    /// Message send
    Message,
}

impl EventCategory {
    /// All categories in canonical order
    pub const ALL: [EventCategory; 3] = [
        EventCategory::Campaign,
        EventCategory::Audience,
        EventCategory::Message,
    ];

    /// Canonical spelling, used for matching and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Campaign => "campaign",
            EventCategory::Audience => "audience",
            EventCategory::Message => "message",
        }
    }

    /// Presentation label shown to end users
    pub fn display_label(&self) -> &'static str {
        match self {
            EventCategory::Campaign => "campaña",
            EventCategory::Audience => "audiencia",
            EventCategory::Message => "mensaje",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = Error;

    /// Accepts the canonical spelling plus the Spanish labels (with or
    /// without accent), case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "campaign" | "campaña" | "campana" => Ok(EventCategory::Campaign),
            "audience" | "audiencia" => Ok(EventCategory::Audience),
            "message" | "mensaje" => Ok(EventCategory::Message),
            other => Err(Error::InvalidInput(format!(
                "unknown event category '{}' (expected campaign, audience or message)",
                other
            ))),
        }
    }
}
