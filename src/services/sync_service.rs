// src/services/sync_service.rs
//
// O motor de sincronização com dados externos: puxa páginas da Yampi,
// mapeia cada registro para o esquema interno e aplica no storage com
// idempotência e tolerância a falha parcial. As métricas de visitas
// (Umami/Clarity) entram aqui também, como snapshots append-only.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    clients::{
        yampi::{YampiOrder, YampiProduct},
        CatalogSource, VisitSource,
    },
    common::error::AppError,
    db::{MetricRepository, ProductRepository, SaleRepository, StockMovementRepository},
    models::{
        catalog::ProductImport,
        inventory::MovementType,
        sales::{OrderImport, OrderItemImport},
    },
};

// ---
// Resultado agregado de uma run
// ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncRecordError {
    // Id do registro remoto (produto ou pedido) que falhou.
    pub record_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub synced_count: u32,
    pub errors: Vec<SyncRecordError>,

    // true quando a rotina já estava em execução e esta invocação foi
    // descartada (no máximo uma execução em voo por rotina).
    pub skipped: bool,
}

impl SyncReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

// ---
// Contrato de storage consumido pelas rotinas de sync
// ---
// Mais estreito que os repositórios: só o que a sync precisa. A
// implementação Postgres delega aos repositórios; os testes usam uma
// implementação em memória.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Ingested,
    // O insert condicional não retornou linha: outra run (ou uma run
    // anterior) registrou o pedido primeiro. Nada foi aplicado.
    AlreadyExists,
}

#[async_trait]
pub trait SyncGateway: Send + Sync {
    async fn upsert_product(
        &self,
        tenant_id: Uuid,
        data: &ProductImport,
    ) -> Result<(), AppError>;

    async fn sale_exists(&self, tenant_id: Uuid, external_id: &str) -> Result<bool, AppError>;

    /// Aplica um pedido inteiro (venda + baixas de estoque + movimentações)
    /// de forma atômica: ou tudo, ou nada.
    async fn ingest_order(
        &self,
        tenant_id: Uuid,
        order: &OrderImport,
    ) -> Result<IngestOutcome, AppError>;

    async fn append_metric(
        &self,
        tenant_id: Uuid,
        metric_type: &str,
        data: serde_json::Value,
        date: DateTime<Utc>,
    ) -> Result<(), AppError>;
}

// Implementação Postgres do contrato, por cima dos repositórios.
pub struct PgSyncGateway {
    pool: PgPool,
    products: ProductRepository,
    sales: SaleRepository,
    movements: StockMovementRepository,
    metrics: MetricRepository,
}

impl PgSyncGateway {
    pub fn new(
        pool: PgPool,
        products: ProductRepository,
        sales: SaleRepository,
        movements: StockMovementRepository,
        metrics: MetricRepository,
    ) -> Self {
        Self {
            pool,
            products,
            sales,
            movements,
            metrics,
        }
    }
}

#[async_trait]
impl SyncGateway for PgSyncGateway {
    async fn upsert_product(
        &self,
        tenant_id: Uuid,
        data: &ProductImport,
    ) -> Result<(), AppError> {
        self.products
            .upsert_by_external_id(&self.pool, tenant_id, data)
            .await?;
        Ok(())
    }

    async fn sale_exists(&self, tenant_id: Uuid, external_id: &str) -> Result<bool, AppError> {
        self.sales
            .exists_by_external_id(&self.pool, tenant_id, external_id)
            .await
    }

    async fn ingest_order(
        &self,
        tenant_id: Uuid,
        order: &OrderImport,
    ) -> Result<IngestOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        // Insert condicional: se outra run chegou primeiro, não retorna
        // linha e nada mais é aplicado (sem dupla baixa de estoque).
        let Some(_sale) = self
            .sales
            .insert_external(&mut *tx, tenant_id, order)
            .await?
        else {
            tx.rollback().await?;
            return Ok(IngestOutcome::AlreadyExists);
        };

        for item in &order.items {
            // Baixa em lote pelo external_id, sem read-modify-write.
            // Item sem produto local correspondente não movimenta nada.
            let product_id = self
                .products
                .decrement_stock_by_external_id(
                    &mut *tx,
                    tenant_id,
                    &item.product_external_id,
                    item.quantity,
                )
                .await?;

            if let Some(product_id) = product_id {
                let reason = format!("Venda Yampi - Pedido {}", order.external_id);
                self.movements
                    .record_movement(
                        &mut *tx,
                        tenant_id,
                        product_id,
                        MovementType::Saida,
                        -item.quantity,
                        &reason,
                    )
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(IngestOutcome::Ingested)
    }

    async fn append_metric(
        &self,
        tenant_id: Uuid,
        metric_type: &str,
        data: serde_json::Value,
        date: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.metrics
            .append(&self.pool, tenant_id, metric_type, &data, date)
            .await?;
        Ok(())
    }
}

// ---
// Mapeamento (fronteira de validação dos payloads externos)
// ---

// Id do registro bruto, para chavear a lista de erros.
fn record_id(value: &serde_json::Value) -> String {
    value
        .get("id")
        .map(|v| v.to_string())
        .unwrap_or_else(|| "desconhecido".to_string())
}

// Reproduz o fallback do provedor: desconto se houver (e não for zero),
// senão preço de venda, senão 0.
fn first_nonzero_price(candidates: [Option<Decimal>; 2]) -> Decimal {
    candidates
        .into_iter()
        .flatten()
        .find(|p| !p.is_zero())
        .unwrap_or(Decimal::ZERO)
}

pub fn map_product(value: &serde_json::Value) -> Result<ProductImport, AppError> {
    let product: YampiProduct =
        serde_json::from_value(value.clone()).map_err(|e| AppError::Mapping(e.to_string()))?;

    // Primeira variante (skus[0]); ausência vira defaults zerados,
    // nunca pula o produto.
    let sku = product.skus.as_ref().and_then(|list| list.data.first());

    let sell_price = sku
        .map(|s| first_nonzero_price([s.price_discount, s.price_sale]))
        .unwrap_or(Decimal::ZERO);
    let cost_price = sku.and_then(|s| s.price_cost).unwrap_or(Decimal::ZERO);
    let stock = sku.and_then(|s| s.total_in_stock).unwrap_or(0);
    let external_sku = sku.and_then(|s| s.sku.clone());

    // URL "large" de cada imagem, na ordem, descartando as ausentes.
    let images = product
        .images
        .as_ref()
        .map(|list| {
            list.data
                .iter()
                .filter_map(|img| img.large.as_ref().and_then(|size| size.url.clone()))
                .collect()
        })
        .unwrap_or_default();

    Ok(ProductImport {
        external_id: product.id.to_string(),
        name: product.name,
        slug: product.slug,
        description: product.description,
        sell_price,
        cost_price,
        stock,
        external_sku,
        images,
    })
}

// A Yampi manda "2024-01-05 14:32:10.000000"; qualquer coisa fora disso
// cai para o horário atual, como o comportamento observado do sistema.
fn parse_order_date(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok())
        .map(|naive| naive.and_utc())
        .unwrap_or_else(Utc::now)
}

pub fn map_order(value: &serde_json::Value) -> Result<OrderImport, AppError> {
    let order: YampiOrder =
        serde_json::from_value(value.clone()).map_err(|e| AppError::Mapping(e.to_string()))?;

    let customer = order
        .customer
        .and_then(|c| c.data)
        .unwrap_or_default();

    let items: Vec<OrderItemImport> = order
        .items
        .as_ref()
        .map(|list| {
            list.data
                .iter()
                .filter_map(|item| {
                    item.product_id.map(|pid| OrderItemImport {
                        product_external_id: pid.to_string(),
                        quantity: item.quantity.unwrap_or(0),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    // Snapshot bruto dos itens, guardado verbatim para auditoria.
    let external_items = value
        .get("items")
        .and_then(|i| i.get("data"))
        .cloned()
        .unwrap_or_else(|| serde_json::Value::Array(vec![]));

    Ok(OrderImport {
        external_id: order.id.to_string(),
        total: order.total.unwrap_or(Decimal::ZERO),
        date: parse_order_date(order.created_at.as_ref().and_then(|d| d.date.as_deref())),
        customer_name: customer
            .name
            .unwrap_or_else(|| "Cliente não identificado".to_string()),
        customer_email: customer.email,
        status: order.status.unwrap_or_else(|| "unknown".to_string()),
        external_items,
        items,
    })
}

// ---
// O serviço de sincronização
// ---
// Páginas e registros são processados estritamente em sequência.
// Cada rotina tem um lock próprio: uma segunda invocação enquanto a
// primeira está em voo é descartada (no-op logado).

pub struct SyncService {
    gateway: Arc<dyn SyncGateway>,
    catalog: Option<Arc<dyn CatalogSource>>,
    visits: Option<Arc<dyn VisitSource>>,
    behavior: Option<Arc<dyn VisitSource>>,
    product_lock: Mutex<()>,
    order_lock: Mutex<()>,
    visits_lock: Mutex<()>,
    behavior_lock: Mutex<()>,
}

impl SyncService {
    pub fn new(
        gateway: Arc<dyn SyncGateway>,
        catalog: Option<Arc<dyn CatalogSource>>,
        visits: Option<Arc<dyn VisitSource>>,
        behavior: Option<Arc<dyn VisitSource>>,
    ) -> Self {
        Self {
            gateway,
            catalog,
            visits,
            behavior,
            product_lock: Mutex::new(()),
            order_lock: Mutex::new(()),
            visits_lock: Mutex::new(()),
            behavior_lock: Mutex::new(()),
        }
    }

    /// Sincroniza o catálogo de produtos da Yampi.
    ///
    /// Falha de um registro é isolada e coletada; falha de página aborta
    /// as páginas restantes desta run (a próxima run agendada é o retry).
    pub async fn run_product_sync(&self, tenant_id: Uuid) -> Result<SyncReport, AppError> {
        let Some(catalog) = &self.catalog else {
            return Err(AppError::MissingConfig("YAMPI_USER_TOKEN / YAMPI_USER_SECRET"));
        };

        let Ok(_guard) = self.product_lock.try_lock() else {
            warn!("Sync de produtos já em execução; invocação descartada");
            return Ok(SyncReport::skipped());
        };

        info!("Iniciando sync de produtos Yampi...");

        let mut report = SyncReport::default();
        let mut page: u32 = 1;
        let mut total_pages: u32 = 1;

        while page <= total_pages {
            let envelope = catalog.fetch_products_page(page).await?;
            if let Some(tp) = envelope.total_pages() {
                total_pages = tp.max(1);
            }

            for record in &envelope.data {
                let id = record_id(record);
                let result = match map_product(record) {
                    Ok(import) => self.gateway.upsert_product(tenant_id, &import).await,
                    Err(e) => Err(e),
                };

                match result {
                    Ok(()) => report.synced_count += 1,
                    Err(e) => {
                        error!("Erro no produto {}: {}", id, e);
                        report.errors.push(SyncRecordError {
                            record_id: id,
                            error: e.to_string(),
                        });
                    }
                }
            }

            page += 1;
        }

        info!(
            "Sync de produtos concluída: {} sincronizados, {} erros",
            report.synced_count,
            report.errors.len()
        );
        Ok(report)
    }

    /// Sincroniza os pedidos da Yampi e aplica as baixas de estoque.
    ///
    /// Pedido já registrado é pulado (ingestão idempotente). Um pedido é
    /// aplicado por inteiro ou não é aplicado; a falha fica registrada e
    /// a rotina segue para o próximo.
    pub async fn run_order_sync(&self, tenant_id: Uuid) -> Result<SyncReport, AppError> {
        let Some(catalog) = &self.catalog else {
            return Err(AppError::MissingConfig("YAMPI_USER_TOKEN / YAMPI_USER_SECRET"));
        };

        let Ok(_guard) = self.order_lock.try_lock() else {
            warn!("Sync de vendas já em execução; invocação descartada");
            return Ok(SyncReport::skipped());
        };

        info!("Iniciando sync de vendas Yampi...");

        let mut report = SyncReport::default();
        let mut page: u32 = 1;
        let mut total_pages: u32 = 1;

        while page <= total_pages {
            let envelope = catalog.fetch_orders_page(page).await?;
            if let Some(tp) = envelope.total_pages() {
                total_pages = tp.max(1);
            }

            for record in &envelope.data {
                let id = record_id(record);
                match self.ingest_one_order(tenant_id, record).await {
                    Ok(true) => report.synced_count += 1,
                    Ok(false) => {} // já existia: pulado, não é erro
                    Err(e) => {
                        error!("Erro ao sincronizar pedido {}: {}", id, e);
                        report.errors.push(SyncRecordError {
                            record_id: id,
                            error: e.to_string(),
                        });
                    }
                }
            }

            page += 1;
        }

        info!(
            "Sync de vendas concluída: {} sincronizadas, {} erros",
            report.synced_count,
            report.errors.len()
        );
        Ok(report)
    }

    async fn ingest_one_order(
        &self,
        tenant_id: Uuid,
        record: &serde_json::Value,
    ) -> Result<bool, AppError> {
        let order = map_order(record)?;

        // Pré-checagem barata; o insert condicional dentro do gateway
        // cobre a janela entre a checagem e a criação.
        if self.gateway.sale_exists(tenant_id, &order.external_id).await? {
            return Ok(false);
        }

        match self.gateway.ingest_order(tenant_id, &order).await? {
            IngestOutcome::Ingested => Ok(true),
            IngestOutcome::AlreadyExists => Ok(false),
        }
    }

    /// Snapshot de visitas do Umami (janela fixa de 7 dias).
    /// Best-effort: engole os próprios erros, só loga.
    pub async fn run_visit_metrics_sync(&self, tenant_id: Uuid) {
        info!("Iniciando sync de visitas do site via Umami...");
        if let Err(e) = self
            .metrics_sync_once(
                tenant_id,
                self.visits.as_ref(),
                &self.visits_lock,
                "umami_visits",
                "UMAMI_API_URL / UMAMI_WEBSITE_ID",
            )
            .await
        {
            error!("Erro na sync Umami: {}", e);
        }
    }

    /// Snapshot de comportamento do Clarity. Mesma política do Umami.
    pub async fn run_behavior_metrics_sync(&self, tenant_id: Uuid) {
        info!("Iniciando sync de comportamento via Clarity...");
        if let Err(e) = self
            .metrics_sync_once(
                tenant_id,
                self.behavior.as_ref(),
                &self.behavior_lock,
                "clarity_visits",
                "CLARITY_API_TOKEN",
            )
            .await
        {
            error!("Erro na sync Clarity: {}", e);
        }
    }

    async fn metrics_sync_once(
        &self,
        tenant_id: Uuid,
        source: Option<&Arc<dyn VisitSource>>,
        lock: &Mutex<()>,
        metric_type: &str,
        config_hint: &'static str,
    ) -> Result<(), AppError> {
        let Some(source) = source else {
            return Err(AppError::MissingConfig(config_hint));
        };

        let Ok(_guard) = lock.try_lock() else {
            warn!("Sync de métricas '{}' já em execução; descartada", metric_type);
            return Ok(());
        };

        let stats = source.fetch_stats().await?;

        // Sem dedup: cada invocação anexa uma linha nova, mesmo com
        // payload idêntico ao anterior.
        self.gateway
            .append_metric(tenant_id, metric_type, stats.clone(), Utc::now())
            .await?;

        info!(
            "Sync {} concluída: {} visitas",
            metric_type,
            stats.get("visits").cloned().unwrap_or_default()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::Paginated;
    use serde_json::json;
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicU32, Ordering},
        sync::Mutex as StdMutex,
    };

    const TENANT: Uuid = Uuid::from_u128(0x3ed33a32_9759_48fe_be2f_99dadb1dc7b0);

    // --- Gateway em memória ---

    #[derive(Default)]
    struct MemGateway {
        products: StdMutex<HashMap<String, ProductImport>>,
        sales: StdMutex<Vec<OrderImport>>,
        // (external_id do produto, quantidade com sinal, reason)
        movements: StdMutex<Vec<(String, i32, String)>>,
        stock: StdMutex<HashMap<String, i32>>,
        metrics: StdMutex<Vec<(String, serde_json::Value, DateTime<Utc>)>>,
    }

    impl MemGateway {
        fn with_stock(stock: &[(&str, i32)]) -> Self {
            let gw = Self::default();
            *gw.stock.lock().unwrap() = stock
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect();
            gw
        }
    }

    #[async_trait]
    impl SyncGateway for MemGateway {
        async fn upsert_product(
            &self,
            _tenant_id: Uuid,
            data: &ProductImport,
        ) -> Result<(), AppError> {
            self.products
                .lock()
                .unwrap()
                .insert(data.external_id.clone(), data.clone());
            Ok(())
        }

        async fn sale_exists(
            &self,
            _tenant_id: Uuid,
            external_id: &str,
        ) -> Result<bool, AppError> {
            Ok(self
                .sales
                .lock()
                .unwrap()
                .iter()
                .any(|s| s.external_id == external_id))
        }

        async fn ingest_order(
            &self,
            _tenant_id: Uuid,
            order: &OrderImport,
        ) -> Result<IngestOutcome, AppError> {
            {
                let sales = self.sales.lock().unwrap();
                if sales.iter().any(|s| s.external_id == order.external_id) {
                    return Ok(IngestOutcome::AlreadyExists);
                }
            }

            for item in &order.items {
                let mut stock = self.stock.lock().unwrap();
                if let Some(current) = stock.get_mut(&item.product_external_id) {
                    *current -= item.quantity;
                    self.movements.lock().unwrap().push((
                        item.product_external_id.clone(),
                        -item.quantity,
                        format!("Venda Yampi - Pedido {}", order.external_id),
                    ));
                }
            }

            self.sales.lock().unwrap().push(order.clone());
            Ok(IngestOutcome::Ingested)
        }

        async fn append_metric(
            &self,
            _tenant_id: Uuid,
            metric_type: &str,
            data: serde_json::Value,
            date: DateTime<Utc>,
        ) -> Result<(), AppError> {
            self.metrics
                .lock()
                .unwrap()
                .push((metric_type.to_string(), data, date));
            Ok(())
        }
    }

    // --- Fontes stub ---

    #[derive(Default)]
    struct StubCatalog {
        product_pages: Vec<Paginated>,
        order_pages: Vec<Paginated>,
        product_calls: AtomicU32,
        order_calls: AtomicU32,
        delay_ms: u64,
    }

    #[async_trait]
    impl CatalogSource for StubCatalog {
        async fn fetch_products_page(&self, page: u32) -> Result<Paginated, AppError> {
            self.product_calls.fetch_add(1, Ordering::SeqCst);
            if self.delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
            }
            self.product_pages
                .get((page - 1) as usize)
                .cloned()
                .ok_or(AppError::Fetch {
                    status: Some(404),
                    message: format!("página {page} inexistente"),
                })
        }

        async fn fetch_orders_page(&self, page: u32) -> Result<Paginated, AppError> {
            self.order_calls.fetch_add(1, Ordering::SeqCst);
            self.order_pages
                .get((page - 1) as usize)
                .cloned()
                .ok_or(AppError::Fetch {
                    status: Some(404),
                    message: format!("página {page} inexistente"),
                })
        }
    }

    struct StubVisits {
        stats: serde_json::Value,
    }

    #[async_trait]
    impl VisitSource for StubVisits {
        async fn fetch_stats(&self) -> Result<serde_json::Value, AppError> {
            Ok(self.stats.clone())
        }
    }

    fn page(data: Vec<serde_json::Value>, total_pages: Option<u32>) -> Paginated {
        let envelope = match total_pages {
            Some(tp) => json!({ "data": data, "meta": { "pagination": { "total_pages": tp } } }),
            None => json!({ "data": data }),
        };
        serde_json::from_value(envelope).unwrap()
    }

    fn service_with(
        gateway: Arc<MemGateway>,
        catalog: Option<Arc<StubCatalog>>,
        visits: Option<Arc<StubVisits>>,
    ) -> SyncService {
        SyncService::new(
            gateway,
            catalog.map(|c| c as Arc<dyn CatalogSource>),
            visits.clone().map(|v| v as Arc<dyn VisitSource>),
            visits.map(|v| v as Arc<dyn VisitSource>),
        )
    }

    fn produto(id: u64, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "slug": format!("produto-{id}"),
            "skus": { "data": [
                { "price_discount": 79.9, "price_sale": 99.9, "price_cost": 40.0,
                  "total_in_stock": 12, "sku": format!("SKU-{id}") }
            ]},
            "images": { "data": [ { "large": { "url": format!("https://cdn/img-{id}.jpg") } } ] }
        })
    }

    // --- Mapeamento ---

    #[test]
    fn produto_sem_variante_usa_defaults_zerados() {
        let import = map_product(&json!({ "id": 5, "name": "Sem Variante" })).unwrap();

        assert_eq!(import.external_id, "5");
        assert_eq!(import.sell_price, Decimal::ZERO);
        assert_eq!(import.cost_price, Decimal::ZERO);
        assert_eq!(import.stock, 0);
        assert_eq!(import.external_sku, None);
        assert!(import.images.is_empty());
    }

    #[test]
    fn preco_desconto_zero_cai_para_preco_de_venda() {
        let import = map_product(&json!({
            "id": 7, "name": "Promo",
            "skus": { "data": [ { "price_discount": 0.0, "price_sale": 50.0 } ] }
        }))
        .unwrap();

        assert_eq!(import.sell_price, Decimal::from(50));
    }

    #[test]
    fn imagens_sem_url_sao_descartadas_mantendo_a_ordem() {
        let import = map_product(&json!({
            "id": 9, "name": "Com Imagens",
            "images": { "data": [
                { "large": { "url": "https://cdn/a.jpg" } },
                { "large": {} },
                { "large": { "url": "https://cdn/c.jpg" } }
            ]}
        }))
        .unwrap();

        assert_eq!(import.images, vec!["https://cdn/a.jpg", "https://cdn/c.jpg"]);
    }

    #[test]
    fn pedido_sem_cliente_usa_defaults() {
        let order = map_order(&json!({ "id": 300 })).unwrap();

        assert_eq!(order.customer_name, "Cliente não identificado");
        assert_eq!(order.customer_email, None);
        assert_eq!(order.status, "unknown");
        assert_eq!(order.total, Decimal::ZERO);
        assert!(order.items.is_empty());
    }

    #[test]
    fn data_do_pedido_invalida_cai_para_agora() {
        let before = Utc::now();
        let parsed = parse_order_date(Some("não é uma data"));
        assert!(parsed >= before);

        let fixed = parse_order_date(Some("2024-01-05 14:32:10.000000"));
        assert_eq!(fixed.to_rfc3339(), "2024-01-05T14:32:10+00:00");
    }

    // --- Sync de produtos ---

    #[tokio::test]
    async fn upsert_de_produtos_e_idempotente() {
        let gateway = Arc::new(MemGateway::default());
        let catalog = Arc::new(StubCatalog {
            product_pages: vec![page(vec![produto(1, "Camisa"), produto(2, "Boné")], None)],
            ..Default::default()
        });
        let service = service_with(gateway.clone(), Some(catalog), None);

        let first = service.run_product_sync(TENANT).await.unwrap();
        let second = service.run_product_sync(TENANT).await.unwrap();

        assert_eq!(first.synced_count, 2);
        assert_eq!(second.synced_count, 2);
        // Sem duplicatas: re-sync com o mesmo external_id atualiza in place.
        assert_eq!(gateway.products.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn falha_de_um_registro_nao_derruba_os_irmaos() {
        // Registro 2 com preço malformado: erro de mapeamento isolado.
        let mut quebrado = produto(2, "Quebrado");
        quebrado["skus"]["data"][0]["price_discount"] = json!("não-é-número");

        let gateway = Arc::new(MemGateway::default());
        let catalog = Arc::new(StubCatalog {
            product_pages: vec![page(
                vec![produto(1, "Ok"), quebrado, produto(3, "Também Ok")],
                None,
            )],
            ..Default::default()
        });
        let service = service_with(gateway.clone(), Some(catalog), None);

        let report = service.run_product_sync(TENANT).await.unwrap();

        assert_eq!(report.synced_count, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].record_id, "2");
        assert_eq!(gateway.products.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn paginacao_respeita_total_pages() {
        let gateway = Arc::new(MemGateway::default());
        let catalog = Arc::new(StubCatalog {
            product_pages: vec![
                page(vec![produto(1, "A")], Some(3)),
                page(vec![produto(2, "B")], Some(3)),
                page(vec![produto(3, "C")], Some(3)),
            ],
            ..Default::default()
        });
        let service = service_with(gateway.clone(), Some(catalog.clone()), None);

        let report = service.run_product_sync(TENANT).await.unwrap();

        assert_eq!(catalog.product_calls.load(Ordering::SeqCst), 3);
        assert_eq!(report.synced_count, 3);
    }

    #[tokio::test]
    async fn falha_de_pagina_aborta_a_run_preservando_o_que_ja_entrou() {
        // Página 1 anuncia 3 páginas, mas a página 2 falha no fetch:
        // a run aborta sem buscar a página 3 e sem desfazer a página 1.
        let gateway = Arc::new(MemGateway::default());
        let catalog = Arc::new(StubCatalog {
            product_pages: vec![page(vec![produto(1, "Entrou")], Some(3))],
            ..Default::default()
        });
        let service = service_with(gateway.clone(), Some(catalog.clone()), None);

        let result = service.run_product_sync(TENANT).await;

        assert!(matches!(result, Err(AppError::Fetch { .. })));
        assert_eq!(catalog.product_calls.load(Ordering::SeqCst), 2);
        assert_eq!(gateway.products.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sem_metadados_de_paginacao_busca_uma_unica_pagina() {
        let gateway = Arc::new(MemGateway::default());
        let catalog = Arc::new(StubCatalog {
            product_pages: vec![page(vec![produto(1, "A")], None)],
            ..Default::default()
        });
        let service = service_with(gateway, Some(catalog.clone()), None);

        service.run_product_sync(TENANT).await.unwrap();

        assert_eq!(catalog.product_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn credencial_ausente_aborta_antes_de_qualquer_fetch() {
        let service = service_with(Arc::new(MemGateway::default()), None, None);

        let result = service.run_product_sync(TENANT).await;
        assert!(matches!(result, Err(AppError::MissingConfig(_))));
    }

    #[tokio::test]
    async fn invocacao_concorrente_da_mesma_rotina_e_descartada() {
        let gateway = Arc::new(MemGateway::default());
        let catalog = Arc::new(StubCatalog {
            product_pages: vec![page(vec![produto(1, "A")], None)],
            delay_ms: 100,
            ..Default::default()
        });
        let service = service_with(gateway, Some(catalog), None);

        let (first, second) =
            tokio::join!(service.run_product_sync(TENANT), service.run_product_sync(TENANT));

        let (first, second) = (first.unwrap(), second.unwrap());
        // Exatamente uma das duas rodou; a outra virou no-op.
        assert_eq!(u32::from(first.skipped) + u32::from(second.skipped), 1);
        assert_eq!(first.synced_count + second.synced_count, 1);
    }

    // --- Sync de pedidos ---

    fn pedido(id: u64, product_id: u64, quantity: i32) -> serde_json::Value {
        json!({
            "id": id,
            "total": 159.8,
            "status": "paid",
            "created_at": { "date": "2024-02-10 09:15:00.000000" },
            "customer": { "data": { "name": "João", "email": "joao@ex.com" } },
            "items": { "data": [ { "product_id": product_id, "quantity": quantity } ] }
        })
    }

    #[tokio::test]
    async fn ingestao_de_pedidos_e_idempotente() {
        let gateway = Arc::new(MemGateway::with_stock(&[("42", 10)]));
        let catalog = Arc::new(StubCatalog {
            order_pages: vec![page(vec![pedido(777, 42, 2)], None)],
            ..Default::default()
        });
        let service = service_with(gateway.clone(), Some(catalog), None);

        let first = service.run_order_sync(TENANT).await.unwrap();
        let second = service.run_order_sync(TENANT).await.unwrap();

        assert_eq!(first.synced_count, 1);
        // Na segunda run o pedido já existe: pulado, sem contar e sem erro.
        assert_eq!(second.synced_count, 0);
        assert!(second.errors.is_empty());
        assert_eq!(gateway.sales.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn estoque_e_conservado_com_uma_movimentacao_por_item() {
        let gateway = Arc::new(MemGateway::with_stock(&[("42", 10)]));
        let catalog = Arc::new(StubCatalog {
            order_pages: vec![page(vec![pedido(777, 42, 2)], None)],
            ..Default::default()
        });
        let service = service_with(gateway.clone(), Some(catalog), None);

        service.run_order_sync(TENANT).await.unwrap();

        assert_eq!(gateway.stock.lock().unwrap()["42"], 8);

        let movements = gateway.movements.lock().unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].0, "42");
        assert_eq!(movements[0].1, -2);
        assert_eq!(movements[0].2, "Venda Yampi - Pedido 777");
    }

    #[tokio::test]
    async fn item_sem_produto_local_nao_gera_movimentacao() {
        let gateway = Arc::new(MemGateway::with_stock(&[("42", 10)]));
        let catalog = Arc::new(StubCatalog {
            order_pages: vec![page(vec![pedido(778, 999, 3)], None)],
            ..Default::default()
        });
        let service = service_with(gateway.clone(), Some(catalog), None);

        let report = service.run_order_sync(TENANT).await.unwrap();

        // A venda entra (auditoria), mas nenhum estoque local é tocado.
        assert_eq!(report.synced_count, 1);
        assert_eq!(gateway.stock.lock().unwrap()["42"], 10);
        assert!(gateway.movements.lock().unwrap().is_empty());
    }

    // --- Métricas ---

    #[tokio::test]
    async fn metricas_sao_append_only_mesmo_com_payload_identico() {
        let gateway = Arc::new(MemGateway::default());
        let visits = Arc::new(StubVisits {
            stats: json!({ "visits": 120, "uniques": 80 }),
        });
        let service = service_with(gateway.clone(), None, Some(visits));

        service.run_visit_metrics_sync(TENANT).await;
        service.run_visit_metrics_sync(TENANT).await;

        let metrics = gateway.metrics.lock().unwrap();
        assert_eq!(metrics.len(), 2);
        assert!(metrics.iter().all(|(t, _, _)| t == "umami_visits"));
        assert_eq!(metrics[0].1, metrics[1].1);
    }

    #[tokio::test]
    async fn metricas_sem_configuracao_viram_noop_logado() {
        let gateway = Arc::new(MemGateway::default());
        let service = service_with(gateway.clone(), None, None);

        // Não entra em pânico e não grava nada.
        service.run_visit_metrics_sync(TENANT).await;
        service.run_behavior_metrics_sync(TENANT).await;

        assert!(gateway.metrics.lock().unwrap().is_empty());
    }
}
