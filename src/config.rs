// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    clients::{CatalogSource, ClarityClient, UmamiClient, VisitSource, YampiClient},
    db::{
        MetricRepository, ProductRepository, SaleRepository, StockMovementRepository,
        TenantRepository,
    },
    services::{sync_service::PgSyncGateway, SalesService, SyncService},
};

const DEFAULT_PER_PAGE: u32 = 50;

// Intervalos padrão do agendador, em segundos.
const DEFAULT_CATALOG_INTERVAL: u64 = 86_400;
const DEFAULT_METRICS_INTERVAL: u64 = 300;

/// Configuração do agendador de sync, lida do ambiente.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    // Tenant dono dos dados sincronizados. Sem ele o agendador não roda.
    pub tenant_id: Option<Uuid>,
    pub products_interval: Duration,
    pub orders_interval: Duration,
    pub visits_interval: Duration,
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub tenant_repo: TenantRepository,
    pub product_repo: ProductRepository,
    pub movement_repo: StockMovementRepository,
    pub metric_repo: MetricRepository,
    pub sales_service: SalesService,
    pub sync_service: Arc<SyncService>,
    pub sync_config: SyncConfig,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let tenant_repo = TenantRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let sale_repo = SaleRepository::new(db_pool.clone());
        let movement_repo = StockMovementRepository::new(db_pool.clone());
        let metric_repo = MetricRepository::new(db_pool.clone());

        let sales_service = SalesService::new(
            db_pool.clone(),
            product_repo.clone(),
            sale_repo.clone(),
            movement_repo.clone(),
        );

        let gateway = Arc::new(PgSyncGateway::new(
            db_pool.clone(),
            product_repo.clone(),
            sale_repo.clone(),
            movement_repo.clone(),
            metric_repo.clone(),
        ));

        // Fontes externas são todas opcionais: credencial ausente desliga
        // a rotina correspondente, nunca derruba o servidor.
        let sync_service = Arc::new(SyncService::new(
            gateway,
            yampi_from_env(),
            umami_from_env(),
            clarity_from_env(),
        ));

        let sync_config = sync_config_from_env()?;

        Ok(Self {
            db_pool,
            tenant_repo,
            product_repo,
            movement_repo,
            metric_repo,
            sales_service,
            sync_service,
            sync_config,
        })
    }
}

// Variável presente e não vazia.
fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_secs(name: &str, default: u64) -> Duration {
    let secs = env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default);
    Duration::from_secs(secs)
}

fn sync_config_from_env() -> anyhow::Result<SyncConfig> {
    let tenant_id = match env_opt("SYNC_TENANT_ID") {
        Some(raw) => Some(
            Uuid::parse_str(&raw).context("SYNC_TENANT_ID não é um UUID válido")?,
        ),
        None => None,
    };

    Ok(SyncConfig {
        tenant_id,
        products_interval: env_secs("SYNC_PRODUCTS_INTERVAL_SECS", DEFAULT_CATALOG_INTERVAL),
        orders_interval: env_secs("SYNC_ORDERS_INTERVAL_SECS", DEFAULT_CATALOG_INTERVAL),
        visits_interval: env_secs("SYNC_VISITS_INTERVAL_SECS", DEFAULT_METRICS_INTERVAL),
    })
}

fn yampi_from_env() -> Option<Arc<dyn CatalogSource>> {
    let alias = env_opt("YAMPI_ALIAS")?;
    let user_token = env_opt("YAMPI_USER_TOKEN")?;
    let user_secret = env_opt("YAMPI_USER_SECRET")?;

    let per_page = env_opt("YAMPI_PER_PAGE")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PER_PAGE);

    Some(Arc::new(YampiClient::new(
        &alias,
        user_token,
        user_secret,
        per_page,
    )))
}

fn umami_from_env() -> Option<Arc<dyn VisitSource>> {
    let api_url = env_opt("UMAMI_API_URL")?;
    let website_id = env_opt("UMAMI_WEBSITE_ID")?;
    let auth_header = env_opt("UMAMI_AUTH")?;

    Some(Arc::new(UmamiClient::new(api_url, website_id, auth_header)))
}

fn clarity_from_env() -> Option<Arc<dyn VisitSource>> {
    let api_url = env_opt("CLARITY_API_URL")?;
    let token = env_opt("CLARITY_API_TOKEN")?;

    Some(Arc::new(ClarityClient::new(api_url, token)))
}
