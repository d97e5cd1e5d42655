// src/handlers/sync.rs
//
// Gatilhos manuais das rotinas de sync. Os mesmos locks do agendador
// valem aqui: disparar uma rotina já em voo devolve um report com
// `skipped = true` em vez de rodar em duplicidade.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{
    common::error::AppError, config::AppState, middleware::TenantContext,
    services::sync_service::SyncReport,
};

// POST /api/sync/products
#[utoipa::path(
    post,
    path = "/api/sync/products",
    tag = "Sync",
    responses(
        (status = 200, description = "Resultado da sincronização de produtos", body = SyncReport),
        (status = 500, description = "Credenciais Yampi ausentes"),
        (status = 502, description = "Falha no provedor externo")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn sync_products(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.sync_service.run_product_sync(tenant.0).await?;
    Ok(Json(report))
}

// POST /api/sync/orders
#[utoipa::path(
    post,
    path = "/api/sync/orders",
    tag = "Sync",
    responses(
        (status = 200, description = "Resultado da sincronização de vendas", body = SyncReport),
        (status = 500, description = "Credenciais Yampi ausentes"),
        (status = 502, description = "Falha no provedor externo")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn sync_orders(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.sync_service.run_order_sync(tenant.0).await?;
    Ok(Json(report))
}

// POST /api/sync/visits
#[utoipa::path(
    post,
    path = "/api/sync/visits",
    tag = "Sync",
    responses(
        (status = 202, description = "Snapshot de visitas disparado (best-effort)")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn sync_visits(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> impl IntoResponse {
    app_state.sync_service.run_visit_metrics_sync(tenant.0).await;
    (
        StatusCode::ACCEPTED,
        Json(json!({ "message": "Sincronização de visitas executada." })),
    )
}

// POST /api/sync/behavior
#[utoipa::path(
    post,
    path = "/api/sync/behavior",
    tag = "Sync",
    responses(
        (status = 202, description = "Snapshot de comportamento disparado (best-effort)")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn sync_behavior(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> impl IntoResponse {
    app_state
        .sync_service
        .run_behavior_metrics_sync(tenant.0)
        .await;
    (
        StatusCode::ACCEPTED,
        Json(json!({ "message": "Sincronização de comportamento executada." })),
    )
}
