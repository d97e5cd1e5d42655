// src/clients/source.rs

use async_trait::async_trait;
use serde::Deserialize;

use crate::common::error::AppError;

// ---
// Envelope de paginação dos provedores
// ---
// Formato: { data: [...], meta: { pagination: { total_pages } } }.
// Os registros ficam como `Value` bruto de propósito: um registro malformado
// falha no mapeamento DELE, não na desserialização da página inteira.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Paginated {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total_pages: Option<u32>,
}

impl Paginated {
    // None quando o provedor não manda metadados de paginação
    // (nesse caso a rotina trata como página única).
    pub fn total_pages(&self) -> Option<u32> {
        self.meta.as_ref()?.pagination.as_ref()?.total_pages
    }
}

// ---
// Contratos dos clientes de origem
// ---
// Cada fetch de página é uma única ida à rede; falha de uma página aborta
// as restantes da run atual (sem retry — a próxima run agendada recomeça
// da página 1).

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_products_page(&self, page: u32) -> Result<Paginated, AppError>;
    async fn fetch_orders_page(&self, page: u32) -> Result<Paginated, AppError>;
}

#[async_trait]
pub trait VisitSource: Send + Sync {
    async fn fetch_stats(&self) -> Result<serde_json::Value, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn total_pages_presente_no_envelope() {
        let page: Paginated = serde_json::from_value(json!({
            "data": [{"id": 1}],
            "meta": { "pagination": { "total_pages": 3, "total": 120 } }
        }))
        .unwrap();

        assert_eq!(page.total_pages(), Some(3));
        assert_eq!(page.data.len(), 1);
    }

    #[test]
    fn total_pages_ausente_vira_none() {
        let page: Paginated = serde_json::from_value(json!({
            "data": [{"id": 1}, {"id": 2}]
        }))
        .unwrap();

        assert_eq!(page.total_pages(), None);
    }

    #[test]
    fn envelope_vazio_desserializa() {
        let page: Paginated = serde_json::from_value(json!({})).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total_pages(), None);
    }
}
