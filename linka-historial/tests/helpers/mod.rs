//! Shared fixtures for linka-historial integration tests
//!
//! Builds the service over in-memory SQLite stores seeded with six events:
//! two campaigns, one audience, three messages.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use chrono::{TimeZone, Utc};
use linka_common::config::{HistorialConfig, ProfileStoreConfig, WarehouseConfig};
use linka_common::{Error, Result};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use linka_historial::historial::model::{AudienceRecord, CampaignRecord, MessageRecord};
use linka_historial::historial::HistoryService;
use linka_historial::store::{ProfileStore, RecordSource, SqlProfileStore, SqlRecordSource};
use linka_historial::{build_router, AppState};

/// Single-connection in-memory pool (each connection would get its own database)
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should open in-memory database")
}

/// Warehouse with the default `LINKA_` dataset prefix and six records
pub async fn seeded_warehouse() -> SqlitePool {
    let pool = memory_pool().await;

    for ddl in [
        "CREATE TABLE LINKA_Campanas (idCampana TEXT, nombre TEXT, fecha_creacion, idUsuario TEXT)",
        "CREATE TABLE LINKA_Audiencias (idAudiencia TEXT, nombre TEXT, fecha_creacion, idCampana TEXT, idUsuario TEXT)",
        "CREATE TABLE LINKA_Mensajes (idMensaje TEXT, contenido TEXT, tipo TEXT, fecha_envio, idUsuario TEXT)",
    ] {
        sqlx::query(ddl).execute(&pool).await.expect("Should create table");
    }

    let native = Utc
        .with_ymd_and_hms(2025, 9, 2, 10, 0, 0)
        .unwrap()
        .timestamp_millis();

    sqlx::query("INSERT INTO LINKA_Campanas VALUES ('c1', 'Campaña Septiembre', '2025-09-01T10:00:00Z', 'u1')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO LINKA_Campanas VALUES ('c2', 'Black Friday', ?, 'u2')")
        .bind(native)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        r#"INSERT INTO LINKA_Audiencias VALUES ('a1', 'Clientes VIP', '{"value":"2025-09-03T10:00:00.000Z"}', 'c1', 'u1')"#,
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO LINKA_Mensajes VALUES
            ('m1', 'Hola Mundo', 'sms', '2025-09-04 10:00:00 UTC', 'u2'),
            ('m2', 'Promo 2x1', 'whatsapp', '2025-09-05T10:00:00.000Z', 'u1'),
            ('m3', 'Recordatorio', 'sms', '2025-09-06T10:00:00Z', 'u9')",
    )
    .execute(&pool)
    .await
    .unwrap();

    pool
}

/// Profile store with two users; `u9` has no profile
pub async fn seeded_profiles() -> SqlitePool {
    let pool = memory_pool().await;
    sqlx::query("CREATE TABLE usuarios (id TEXT PRIMARY KEY, display_name TEXT, email TEXT, rol TEXT)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO usuarios VALUES
            ('u1', 'Juan Pérez', 'juan@example.com', 'admin'),
            ('u2', 'Ana Gómez', 'ana@example.com', 'agente')",
    )
    .execute(&pool)
    .await
    .unwrap();
    pool
}

pub fn settings() -> HistorialConfig {
    HistorialConfig {
        query_timeout_ms: 2000,
        ..HistorialConfig::default()
    }
}

/// Router over the seeded SQLite stores
pub async fn seeded_app() -> axum::Router {
    let records = SqlRecordSource::new(seeded_warehouse().await, &WarehouseConfig::default())
        .expect("Valid warehouse config");
    let profiles = SqlProfileStore::new(seeded_profiles().await, &ProfileStoreConfig::default())
        .expect("Valid profile config");
    app_with(Arc::new(records), Arc::new(profiles), settings())
}

pub fn app_with(
    records: Arc<dyn RecordSource>,
    profiles: Arc<dyn ProfileStore>,
    settings: HistorialConfig,
) -> axum::Router {
    build_router(AppState::new(HistoryService::new(records, profiles, settings)))
}

/// Record source whose message fetch fails or hangs
pub struct BrokenRecords {
    pub hang: bool,
}

#[async_trait]
impl RecordSource for BrokenRecords {
    async fn fetch_campaigns(&self) -> Result<Vec<CampaignRecord>> {
        Ok(Vec::new())
    }

    async fn fetch_audiences(&self) -> Result<Vec<AudienceRecord>> {
        Ok(Vec::new())
    }

    async fn fetch_messages(&self) -> Result<Vec<MessageRecord>> {
        if self.hang {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        Err(Error::Internal("warehouse unavailable".to_string()))
    }
}

/// Profile store that always errors
pub struct BrokenProfiles;

#[async_trait]
impl ProfileStore for BrokenProfiles {
    async fn get_profile(&self, _actor_id: &str) -> Result<Option<linka_historial::historial::model::ActorProfile>> {
        Err(Error::Internal("document store unavailable".to_string()))
    }
}

/// Test helper: Create GET request
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// `accion` of every row, in response order
pub fn actions(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .expect("data should be an array")
        .iter()
        .map(|row| row["accion"].as_str().unwrap_or_default().to_string())
        .collect()
}
