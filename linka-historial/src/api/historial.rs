//! General historial endpoint
//!
//! `GET /historial/general` merges campaign, audience and message activity
//! into one chronological log with filtering and pagination.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use linka_common::config::HistorialConfig;
use linka_common::time::parse_timestamp_str;
use linka_common::{EventCategory, RawTimestamp};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::historial::model::HistoryEvent;
use crate::historial::query::{HistoryQuery, SortOrder};
use crate::pagination::Pagination;
use crate::AppState;

/// Raw query parameters; all optional, empty values count as absent
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    /// Substring of the actor display name
    pub usuario: Option<String>,
    /// campaign | audience | message
    pub tipo: Option<String>,
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    /// asc | desc
    pub order: Option<String>,
}

/// One row of the historial log
#[derive(Debug, Serialize)]
pub struct HistoryEventResponse {
    pub usuario: String,
    pub accion: String,
    /// Timestamp in the shape the source surfaced it
    pub fecha: RawTimestamp,
    pub tipo: &'static str,
}

impl From<HistoryEvent> for HistoryEventResponse {
    fn from(event: HistoryEvent) -> Self {
        Self {
            usuario: event.actor_display_name,
            accion: event.action_phrase,
            fecha: event.timestamp,
            tipo: event.category.display_label(),
        }
    }
}

/// Historial page response
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub data: Vec<HistoryEventResponse>,
    pub pagination: Pagination,
}

impl HistoryParams {
    /// Validate and convert into a [`HistoryQuery`]
    pub fn into_query(self, settings: &HistorialConfig) -> Result<HistoryQuery, HistoryError> {
        let category = present(self.tipo)
            .map(|t| t.parse::<EventCategory>())
            .transpose()
            .map_err(invalid)?;

        let order = present(self.order)
            .map(|o| o.parse::<SortOrder>())
            .transpose()
            .map_err(invalid)?
            .unwrap_or_default();

        let page = parse_positive("page", present(self.page), 1)?;
        let limit = parse_positive("limit", present(self.limit), settings.default_page_size)?;
        if limit > settings.max_page_size {
            return Err(HistoryError::InvalidParameter(format!(
                "limit must not exceed {}",
                settings.max_page_size
            )));
        }

        Ok(HistoryQuery {
            actor: present(self.usuario),
            category,
            from: parse_bound("fechaInicio", present(self.fecha_inicio))?,
            to: parse_bound("fechaFin", present(self.fecha_fin))?,
            page,
            limit,
            order,
        })
    }
}

fn invalid(e: linka_common::Error) -> HistoryError {
    match e {
        linka_common::Error::InvalidInput(msg) => HistoryError::InvalidParameter(msg),
        other => HistoryError::InvalidParameter(other.to_string()),
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_positive(name: &str, value: Option<String>, default: u32) -> Result<u32, HistoryError> {
    match value {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(HistoryError::InvalidParameter(format!(
                "{} must be a positive integer, got '{}'",
                name, raw
            ))),
        },
    }
}

fn parse_bound(
    name: &str,
    value: Option<String>,
) -> Result<Option<chrono::DateTime<chrono::Utc>>, HistoryError> {
    value
        .map(|raw| {
            parse_timestamp_str(&raw).ok_or_else(|| {
                HistoryError::InvalidParameter(format!("{} is not a valid date: '{}'", name, raw))
            })
        })
        .transpose()
}

/// GET /historial/general
///
/// Query parameters: `usuario`, `tipo`, `fechaInicio`, `fechaFin`, `page`,
/// `limit`, `order`.
pub async fn get_historial_general(
    State(state): State<AppState>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<HistoryResponse>, HistoryError> {
    let Query(params) = params?;
    let query = params.into_query(state.history.settings())?;

    let page = state.history.general(&query).await.map_err(|e| {
        if e.is_invalid_input() {
            return invalid(e);
        }
        error!("Historial request failed: {}", e);
        HistoryError::Upstream(e.to_string())
    })?;

    Ok(Json(HistoryResponse {
        data: page.events.into_iter().map(HistoryEventResponse::from).collect(),
        pagination: page.pagination,
    }))
}

/// Historial API errors
#[derive(Debug)]
pub enum HistoryError {
    InvalidParameter(String),
    Upstream(String),
}

impl From<QueryRejection> for HistoryError {
    fn from(rejection: QueryRejection) -> Self {
        HistoryError::InvalidParameter(rejection.body_text())
    }
}

impl IntoResponse for HistoryError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HistoryError::InvalidParameter(msg) => {
                (StatusCode::BAD_REQUEST, format!("Invalid parameter: {}", msg))
            }
            HistoryError::Upstream(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Upstream query failed: {}", msg),
            ),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
