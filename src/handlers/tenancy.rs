// src/handlers/tenancy.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, models::tenancy::Tenant};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Loja da Maria")]
    pub name: String,

    #[validate(email(message = "e-mail inválido"))]
    #[schema(example = "maria@loja.com")]
    pub email: String,

    #[serde(default = "default_plan")]
    #[schema(example = "basico")]
    pub plan: String,
}

fn default_plan() -> String {
    "basico".to_string()
}

// POST /api/tenants
#[utoipa::path(
    post,
    path = "/api/tenants",
    tag = "Tenants",
    request_body = CreateTenantPayload,
    responses(
        (status = 201, description = "Tenant criado", body = Tenant),
        (status = 409, description = "E-mail já em uso")
    )
)]
pub async fn create_tenant(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateTenantPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let tenant = app_state
        .tenant_repo
        .create_tenant(&payload.name, &payload.email, &payload.plan)
        .await?;

    Ok((StatusCode::CREATED, Json(tenant)))
}

// GET /api/tenants
#[utoipa::path(
    get,
    path = "/api/tenants",
    tag = "Tenants",
    responses(
        (status = 200, description = "Lista de tenants", body = [Tenant])
    )
)]
pub async fn list_tenants(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let tenants = app_state.tenant_repo.list_tenants().await?;
    Ok(Json(tenants))
}

// GET /api/tenants/{id}
#[utoipa::path(
    get,
    path = "/api/tenants/{id}",
    tag = "Tenants",
    responses(
        (status = 200, description = "Tenant encontrado", body = Tenant),
        (status = 404, description = "Tenant não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do tenant")
    )
)]
pub async fn get_tenant(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let tenant = app_state
        .tenant_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::TenantNotFound)?;

    Ok(Json(tenant))
}
