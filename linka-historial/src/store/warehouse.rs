//! Warehouse-backed record fetchers

use async_trait::async_trait;
use linka_common::config::{is_valid_identifier, WarehouseConfig};
use linka_common::{Error, RawTimestamp, Result};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::RecordSource;
use crate::historial::model::{AudienceRecord, CampaignRecord, MessageRecord};

/// Reads campaign/audience/message records from configured tables
#[derive(Debug, Clone)]
pub struct SqlRecordSource {
    pool: SqlitePool,
    campaigns_table: String,
    audiences_table: String,
    messages_table: String,
}

impl SqlRecordSource {
    /// Table names are interpolated into SQL and must pass identifier validation
    pub fn new(pool: SqlitePool, config: &WarehouseConfig) -> Result<Self> {
        let tables = [config.campaigns(), config.audiences(), config.messages()];
        if let Some(bad) = tables.iter().find(|t| !is_valid_identifier(t)) {
            return Err(Error::Config(format!("Invalid warehouse table name: '{}'", bad)));
        }
        let [campaigns_table, audiences_table, messages_table] = tables;

        Ok(Self {
            pool,
            campaigns_table,
            audiences_table,
            messages_table,
        })
    }

    async fn fetch_rows(&self, sql: &str) -> Result<Vec<SqliteRow>> {
        debug!("warehouse query: {}", sql);
        Ok(sqlx::query(sql).fetch_all(&self.pool).await?)
    }
}

#[async_trait]
impl RecordSource for SqlRecordSource {
    async fn fetch_campaigns(&self) -> Result<Vec<CampaignRecord>> {
        let sql = format!(
            "SELECT idCampana, nombre, fecha_creacion, idUsuario FROM {} ORDER BY idCampana",
            self.campaigns_table
        );
        self.fetch_rows(&sql)
            .await?
            .iter()
            .map(|row| -> Result<CampaignRecord> {
                Ok(CampaignRecord {
                    id: row.try_get("idCampana")?,
                    name: text_or_empty(row, "nombre")?,
                    created_at: read_timestamp(row, "fecha_creacion"),
                    owner_actor_id: text_or_empty(row, "idUsuario")?,
                })
            })
            .collect()
    }

    async fn fetch_audiences(&self) -> Result<Vec<AudienceRecord>> {
        let sql = format!(
            "SELECT idAudiencia, nombre, fecha_creacion, idUsuario FROM {} ORDER BY idAudiencia",
            self.audiences_table
        );
        self.fetch_rows(&sql)
            .await?
            .iter()
            .map(|row| -> Result<AudienceRecord> {
                Ok(AudienceRecord {
                    id: row.try_get("idAudiencia")?,
                    name: text_or_empty(row, "nombre")?,
                    created_at: read_timestamp(row, "fecha_creacion"),
                    owner_actor_id: text_or_empty(row, "idUsuario")?,
                })
            })
            .collect()
    }

    async fn fetch_messages(&self) -> Result<Vec<MessageRecord>> {
        let sql = format!(
            "SELECT idMensaje, contenido, tipo, fecha_envio, idUsuario FROM {} ORDER BY idMensaje",
            self.messages_table
        );
        self.fetch_rows(&sql)
            .await?
            .iter()
            .map(|row| -> Result<MessageRecord> {
                Ok(MessageRecord {
                    id: row.try_get("idMensaje")?,
                    body: text_or_empty(row, "contenido")?,
                    kind: text_or_empty(row, "tipo")?,
                    sent_at: read_timestamp(row, "fecha_envio"),
                    owner_actor_id: text_or_empty(row, "idUsuario")?,
                })
            })
            .collect()
    }

    fn tables(&self) -> Vec<String> {
        vec![
            self.campaigns_table.clone(),
            self.audiences_table.clone(),
            self.messages_table.clone(),
        ]
    }
}

fn text_or_empty(row: &SqliteRow, column: &str) -> Result<String> {
    Ok(row.try_get::<Option<String>, _>(column)?.unwrap_or_default())
}

/// Decode a timestamp column without failing the row
///
/// INTEGER is epoch milliseconds, TEXT is ISO text or a `{"value": ...}`
/// wrapper. REAL and BLOB values are kept as-is; only NULL becomes null.
fn read_timestamp(row: &SqliteRow, column: &str) -> RawTimestamp {
    if let Ok(Some(millis)) = row.try_get::<Option<i64>, _>(column) {
        return RawTimestamp::from_epoch_millis(millis);
    }
    if let Ok(Some(text)) = row.try_get::<Option<String>, _>(column) {
        return RawTimestamp::from_text(text);
    }
    if let Ok(Some(number)) = row.try_get::<Option<f64>, _>(column) {
        return RawTimestamp::Other(Value::from(number));
    }
    if let Ok(Some(bytes)) = row.try_get::<Option<Vec<u8>>, _>(column) {
        return match String::from_utf8(bytes) {
            Ok(text) => RawTimestamp::from_text(text),
            Err(e) => RawTimestamp::Other(Value::from(e.into_bytes())),
        };
    }
    RawTimestamp::Other(Value::Null)
}
