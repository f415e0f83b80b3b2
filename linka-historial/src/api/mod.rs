//! HTTP API handlers for linka-historial

pub mod health;
pub mod historial;

pub use health::health_routes;
pub use historial::get_historial_general;
