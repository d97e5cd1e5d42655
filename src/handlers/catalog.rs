// src/handlers/catalog.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::TenantContext,
    models::catalog::Product,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Camisa Polo")]
    pub name: String,

    #[schema(example = 40.0)]
    pub cost_price: Decimal,

    #[schema(example = 99.9)]
    pub sell_price: Decimal,

    #[validate(range(min = 0, message = "estoque não pode ser negativo"))]
    #[schema(example = 10)]
    pub stock: i32,

    #[schema(example = "M")]
    pub size: Option<String>,

    #[schema(example = "Azul")]
    pub color: Option<String>,
}

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    responses(
        (status = 200, description = "Lista de produtos do tenant", body = [Product])
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.product_repo.get_all(tenant.0).await?;
    Ok(Json(products))
}

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .product_repo
        .create(
            &app_state.db_pool,
            tenant.0,
            &payload.name,
            payload.cost_price,
            payload.sell_price,
            payload.stock,
            payload.size.as_deref(),
            payload.color.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    responses(
        (status = 200, description = "Produto encontrado", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do produto"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .product_repo
        .find_by_id(tenant.0, id)
        .await?
        .ok_or(AppError::ProductNotFound)?;

    Ok(Json(product))
}

// PUT /api/products/{id}
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Products",
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do produto"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .product_repo
        .update(
            &app_state.db_pool,
            tenant.0,
            id,
            &payload.name,
            payload.cost_price,
            payload.sell_price,
            payload.stock,
            payload.size.as_deref(),
            payload.color.as_deref(),
        )
        .await?;

    Ok(Json(product))
}

// DELETE /api/products/{id}
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    responses(
        (status = 204, description = "Produto removido"),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do produto"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.product_repo.delete(tenant.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/products/{id}/movements
#[utoipa::path(
    get,
    path = "/api/products/{id}/movements",
    tag = "Products",
    responses(
        (status = 200, description = "Trilha de movimentações de estoque do produto",
         body = [crate::models::inventory::StockMovement]),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do produto"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn list_stock_movements(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .product_repo
        .find_by_id(tenant.0, id)
        .await?
        .ok_or(AppError::ProductNotFound)?;

    let movements = app_state.movement_repo.list_by_product(tenant.0, id).await?;
    Ok(Json(movements))
}

// ---
// Relatório de lucro estimado
// ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductProfit {
    pub id: Uuid,
    pub name: String,
    pub cost_price: Decimal,
    pub sell_price: Decimal,
    pub stock: i32,
    pub profit_per_unit: Decimal,
    pub total_estimated_profit: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfitReport {
    pub products: Vec<ProductProfit>,
    pub total_estimated_profit: Decimal,
}

// Margem por unidade e projeção sobre o estoque atual.
fn build_profit_report(products: Vec<Product>) -> ProfitReport {
    let products: Vec<ProductProfit> = products
        .into_iter()
        .map(|p| {
            let profit_per_unit = p.sell_price - p.cost_price;
            let total_estimated_profit = profit_per_unit * Decimal::from(p.stock);
            ProductProfit {
                id: p.id,
                name: p.name,
                cost_price: p.cost_price,
                sell_price: p.sell_price,
                stock: p.stock,
                profit_per_unit,
                total_estimated_profit,
            }
        })
        .collect();

    let total_estimated_profit = products.iter().map(|p| p.total_estimated_profit).sum();

    ProfitReport {
        products,
        total_estimated_profit,
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProfitQuery {
    // Restringe o relatório a um único produto.
    pub product_id: Option<Uuid>,
}

// GET /api/products/report/profit
#[utoipa::path(
    get,
    path = "/api/products/report/profit",
    tag = "Products",
    responses(
        (status = 200, description = "Lucro estimado por produto", body = ProfitReport),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ProfitQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn profit_report(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ProfitQuery>,
) -> Result<impl IntoResponse, AppError> {
    let products = match query.product_id {
        Some(id) => {
            let product = app_state
                .product_repo
                .find_by_id(tenant.0, id)
                .await?
                .ok_or(AppError::ProductNotFound)?;
            vec![product]
        }
        None => app_state.product_repo.get_all(tenant.0).await?,
    };

    Ok(Json(build_profit_report(products)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn produto(name: &str, cost: i64, sell: i64, stock: i32) -> Product {
        Product {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            external_id: None,
            name: name.to_string(),
            slug: None,
            description: None,
            sell_price: Decimal::from(sell),
            cost_price: Decimal::from(cost),
            stock,
            external_sku: None,
            images: vec![],
            size: None,
            color: None,
            last_synced_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn lucro_projeta_margem_sobre_o_estoque() {
        let report = build_profit_report(vec![
            produto("Camisa", 40, 100, 5),
            produto("Boné", 10, 25, 0),
        ]);

        assert_eq!(report.products[0].profit_per_unit, Decimal::from(60));
        assert_eq!(report.products[0].total_estimated_profit, Decimal::from(300));
        // Estoque zerado projeta lucro zero, mas continua no relatório.
        assert_eq!(report.products[1].total_estimated_profit, Decimal::ZERO);
        assert_eq!(report.total_estimated_profit, Decimal::from(300));
    }

    #[test]
    fn relatorio_de_um_unico_produto_cobre_so_ele() {
        // Caminho do filtro por productId: o relatório recebe só o
        // produto pedido e o total agregado vira o total dele.
        let report = build_profit_report(vec![produto("Camisa", 40, 100, 5)]);

        assert_eq!(report.products.len(), 1);
        assert_eq!(report.total_estimated_profit, Decimal::from(300));
    }
}
