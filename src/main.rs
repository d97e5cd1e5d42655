//src/main.rs

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod clients;
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod scheduler;
mod services;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Loops de sync em background (desligados sem SYNC_TENANT_ID).
    scheduler::spawn(app_state.sync_service.clone(), app_state.sync_config.clone());

    let tenant_routes = Router::new()
        .route(
            "/",
            post(handlers::tenancy::create_tenant).get(handlers::tenancy::list_tenants),
        )
        .route("/{id}", get(handlers::tenancy::get_tenant));

    let product_routes = Router::new()
        .route(
            "/",
            post(handlers::catalog::create_product).get(handlers::catalog::list_products),
        )
        .route(
            "/{id}",
            get(handlers::catalog::get_product)
                .put(handlers::catalog::update_product)
                .delete(handlers::catalog::delete_product),
        )
        .route("/{id}/movements", get(handlers::catalog::list_stock_movements))
        .route("/report/profit", get(handlers::catalog::profit_report));

    let sale_routes = Router::new().route(
        "/",
        post(handlers::sales::create_sale).get(handlers::sales::list_sales),
    );

    let sync_routes = Router::new()
        .route("/products", post(handlers::sync::sync_products))
        .route("/orders", post(handlers::sync::sync_orders))
        .route("/visits", post(handlers::sync::sync_visits))
        .route("/behavior", post(handlers::sync::sync_behavior));

    let metric_routes = Router::new().route("/", get(handlers::metrics::list_metrics));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .nest("/api/tenants", tenant_routes)
        .nest("/api/products", product_routes)
        .nest("/api/sales", sale_routes)
        .nest("/api/sync", sync_routes)
        .nest("/api/metrics", metric_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:5000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
