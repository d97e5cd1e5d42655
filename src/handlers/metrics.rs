// src/handlers/metrics.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError, config::AppState, middleware::TenantContext, models::metrics::Metric,
};

const DEFAULT_LIMIT: i64 = 100;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MetricsQuery {
    // Filtro por tipo de métrica (ex: "umami_visits").
    pub metric_type: Option<String>,
    pub limit: Option<i64>,
}

// GET /api/metrics
#[utoipa::path(
    get,
    path = "/api/metrics",
    tag = "Metrics",
    responses(
        (status = 200, description = "Snapshots de métricas, mais recentes primeiro", body = [Metric])
    ),
    params(
        MetricsQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn list_metrics(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<MetricsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let metrics = app_state
        .metric_repo
        .list_by_tenant(
            tenant.0,
            query.metric_type.as_deref(),
            query.limit.unwrap_or(DEFAULT_LIMIT),
        )
        .await?;

    Ok(Json(metrics))
}
