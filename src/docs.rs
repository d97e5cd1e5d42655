// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        handlers::health::health_check,

        // --- Tenants ---
        handlers::tenancy::create_tenant,
        handlers::tenancy::list_tenants,
        handlers::tenancy::get_tenant,

        // --- Products ---
        handlers::catalog::list_products,
        handlers::catalog::create_product,
        handlers::catalog::get_product,
        handlers::catalog::update_product,
        handlers::catalog::delete_product,
        handlers::catalog::list_stock_movements,
        handlers::catalog::profit_report,

        // --- Sales ---
        handlers::sales::list_sales,
        handlers::sales::create_sale,

        // --- Sync ---
        handlers::sync::sync_products,
        handlers::sync::sync_orders,
        handlers::sync::sync_visits,
        handlers::sync::sync_behavior,

        // --- Metrics ---
        handlers::metrics::list_metrics,
    ),
    components(
        schemas(
            // --- Tenancy ---
            models::tenancy::Tenant,
            handlers::tenancy::CreateTenantPayload,

            // --- Catalog ---
            models::catalog::Product,
            handlers::catalog::ProductPayload,
            handlers::catalog::ProductProfit,
            handlers::catalog::ProfitReport,

            // --- Sales ---
            models::sales::Sale,
            models::sales::SaleItem,
            models::sales::SaleWithItems,
            handlers::sales::PosSaleItemPayload,
            handlers::sales::CreatePosSalePayload,

            // --- Inventory ---
            models::inventory::MovementType,
            models::inventory::StockMovement,

            // --- Metrics ---
            models::metrics::Metric,

            // --- Sync ---
            services::sync_service::SyncReport,
            services::sync_service::SyncRecordError,
        )
    ),
    tags(
        (name = "Health", description = "Status do servidor"),
        (name = "Tenants", description = "Gestão de Lojas"),
        (name = "Products", description = "Catálogo, Estoque e Relatórios"),
        (name = "Sales", description = "Vendas Yampi e PDV local"),
        (name = "Sync", description = "Gatilhos manuais de sincronização"),
        (name = "Metrics", description = "Snapshots de métricas de visitas")
    )
)]
pub struct ApiDoc;
