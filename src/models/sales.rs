// src/models/sales.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// Venda
// ---
// Vendas vindas da Yampi têm external_id (ingestão idempotente: no máximo
// uma venda por pedido externo). Vendas do PDV local não têm external_id e
// guardam os itens em sale_items.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub external_id: Option<String>,
    pub total: Decimal,
    pub date: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub status: String,

    // Snapshot bruto dos itens do pedido, guardado verbatim para auditoria.
    #[schema(value_type = Object)]
    pub external_items: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,
}

// --- Item de venda do PDV local ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_sale: Decimal,
}

// ---
// Pedido já mapeado do payload da Yampi, pronto para a ingestão.
// ---
#[derive(Debug, Clone)]
pub struct OrderImport {
    pub external_id: String,
    pub total: Decimal,
    pub date: DateTime<Utc>,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub status: String,

    // Snapshot verbatim de items.data, para auditoria.
    pub external_items: serde_json::Value,

    pub items: Vec<OrderItemImport>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemImport {
    pub product_external_id: String,
    pub quantity: i32,
}

// Venda com os itens carregados (resposta da listagem).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}
