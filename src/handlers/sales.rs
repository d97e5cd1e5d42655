// src/handlers/sales.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::TenantContext,
    models::sales::SaleWithItems,
    services::sales_service::PosSaleItemInput,
};

// Serialize também: a validação aninhada serializa o item nos detalhes
// do erro.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PosSaleItemPayload {
    pub product_id: Uuid,

    #[validate(range(min = 1, message = "quantidade deve ser positiva"))]
    #[schema(example = 2)]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePosSalePayload {
    #[validate(length(min = 1, message = "venda precisa de pelo menos um item"), nested)]
    pub items: Vec<PosSaleItemPayload>,
}

// GET /api/sales
#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Sales",
    responses(
        (status = 200, description = "Vendas do tenant com itens", body = [SaleWithItems])
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let sales = app_state.sales_service.list_sales(tenant.0).await?;
    Ok(Json(sales))
}

// POST /api/sales
#[utoipa::path(
    post,
    path = "/api/sales",
    tag = "Sales",
    request_body = CreatePosSalePayload,
    responses(
        (status = 201, description = "Venda registrada", body = SaleWithItems),
        (status = 400, description = "Estoque insuficiente"),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreatePosSalePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let items: Vec<PosSaleItemInput> = payload
        .items
        .iter()
        .map(|item| PosSaleItemInput {
            product_id: item.product_id,
            quantity: item.quantity,
        })
        .collect();

    let sale = app_state
        .sales_service
        .create_pos_sale(tenant.0, &items)
        .await?;

    Ok((StatusCode::CREATED, Json(sale)))
}
