// src/models/metrics.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// Métrica (snapshot de analytics)
// ---
// Log append-only: cada invocação da sync adiciona uma linha nova, mesmo
// com payload idêntico. O dashboard lê a mais recente por tipo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: Uuid,
    pub tenant_id: Uuid,

    // Tag da origem, ex: "umami_visits" / "clarity_visits".
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub metric_type: String,

    // Corpo bruto retornado pelo provedor.
    #[schema(value_type = Object)]
    pub data: serde_json::Value,

    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
