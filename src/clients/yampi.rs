// src/clients/yampi.rs
//
// Cliente da API Yampi (catálogo e pedidos), com paginação.
// Autenticação via cabeçalhos User-Token / User-Secret-Key.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use super::source::{CatalogSource, Paginated};
use crate::common::error::AppError;

const YAMPI_API_BASE: &str = "https://api.dooki.com.br/v2";

#[derive(Clone)]
pub struct YampiClient {
    client: Client,
    base_url: String,
    user_token: String,
    user_secret: String,
    per_page: u32,
}

impl YampiClient {
    pub fn new(alias: &str, user_token: String, user_secret: String, per_page: u32) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("{YAMPI_API_BASE}/{alias}"),
            user_token,
            user_secret,
            per_page,
        }
    }

    async fn get_page(
        &self,
        resource: &str,
        include: &str,
        skip_cache: bool,
        page: u32,
    ) -> Result<Paginated, AppError> {
        let url = format!("{}/{}", self.base_url, resource);

        let mut params = vec![
            ("per_page", self.per_page.to_string()),
            ("include", include.to_string()),
            ("page", page.to_string()),
        ];
        if skip_cache {
            params.push(("skipCache", "true".to_string()));
        }

        debug!(resource = %resource, page = %page, "Buscando página na Yampi");

        let response = self
            .client
            .get(&url)
            .header("Content-Type", "application/json")
            .header("User-Token", &self.user_token)
            .header("User-Secret-Key", &self.user_secret)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::Fetch {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Fetch {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        response.json::<Paginated>().await.map_err(|e| AppError::Fetch {
            status: None,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl CatalogSource for YampiClient {
    async fn fetch_products_page(&self, page: u32) -> Result<Paginated, AppError> {
        self.get_page("catalog/products", "skus,images", true, page)
            .await
    }

    async fn fetch_orders_page(&self, page: u32) -> Result<Paginated, AppError> {
        self.get_page("orders", "items,customer", false, page).await
    }
}

// ---
// Schemas dos payloads da Yampi
// ---
// Campos opcionais declarados explicitamente com default, em vez de
// null-coalescing espalhado pela lógica. A ausência vira default no
// mapeamento, nunca falha do registro.

// Listas aninhadas no formato { data: [...] } da Yampi.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

// Objetos aninhados no formato { data: {...} }.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataObject<T> {
    #[serde(default)]
    pub data: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YampiProduct {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub skus: Option<DataList<YampiSku>>,
    #[serde(default)]
    pub images: Option<DataList<YampiImage>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct YampiSku {
    #[serde(default)]
    pub price_discount: Option<Decimal>,
    #[serde(default)]
    pub price_sale: Option<Decimal>,
    #[serde(default)]
    pub price_cost: Option<Decimal>,
    #[serde(default)]
    pub total_in_stock: Option<i32>,
    #[serde(default)]
    pub sku: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct YampiImage {
    #[serde(default)]
    pub large: Option<YampiImageSize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct YampiImageSize {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YampiOrder {
    pub id: i64,
    #[serde(default)]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<YampiDate>,
    #[serde(default)]
    pub customer: Option<DataObject<YampiCustomer>>,
    #[serde(default)]
    pub items: Option<DataList<YampiOrderItem>>,
}

// A Yampi manda datas como { date: "2024-01-05 14:32:10.000000", ... }.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YampiDate {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct YampiCustomer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct YampiOrderItem {
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub quantity: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn produto_sem_skus_nem_imagens_desserializa() {
        let prod: YampiProduct = serde_json::from_value(json!({
            "id": 42,
            "name": "Camisa Oficial"
        }))
        .unwrap();

        assert_eq!(prod.id, 42);
        assert!(prod.skus.is_none());
        assert!(prod.images.is_none());
    }

    #[test]
    fn sku_com_campos_parciais_usa_defaults() {
        let sku: YampiSku = serde_json::from_value(json!({
            "price_sale": 99.9
        }))
        .unwrap();

        assert!(sku.price_discount.is_none());
        assert!(sku.price_sale.is_some());
        assert!(sku.total_in_stock.is_none());
        assert!(sku.sku.is_none());
    }

    #[test]
    fn pedido_completo_desserializa() {
        let order: YampiOrder = serde_json::from_value(json!({
            "id": 777,
            "total": 150.5,
            "status": "paid",
            "created_at": { "date": "2024-01-05 14:32:10.000000" },
            "customer": { "data": { "name": "Maria", "email": "maria@ex.com" } },
            "items": { "data": [ { "product_id": 42, "quantity": 2 } ] }
        }))
        .unwrap();

        assert_eq!(order.id, 777);
        let items = order.items.unwrap().data;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, Some(42));
    }
}
