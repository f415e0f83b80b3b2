//! # Linka Common Library
//!
//! Shared code for the Linka backend services including:
//! - Error and result types
//! - Configuration loading (TOML bootstrap + overrides)
//! - Event category vocabulary for the historial read model
//! - Flexible timestamp parsing for warehouse/document-store dates

pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
pub use events::EventCategory;
pub use time::{parse_flexible_timestamp, RawTimestamp};
