// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// Produto
// ---
// Criado pela sync da Yampi (com external_id) ou manualmente pelo CRUD
// (external_id = NULL). A sync sobrescreve todos os campos mapeados;
// o estoque também é mutado pela ingestão de pedidos e pelo PDV.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub tenant_id: Uuid,

    // Chave estável do provedor. Re-sync com o mesmo external_id
    // atualiza a linha existente, nunca duplica.
    pub external_id: Option<String>,

    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub sell_price: Decimal,
    pub cost_price: Decimal,
    pub stock: i32,
    pub external_sku: Option<String>,

    // URLs das imagens, na ordem do provedor.
    pub images: Vec<String>,

    // Campos de produtos criados manualmente (sem sync).
    pub size: Option<String>,
    pub color: Option<String>,

    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// Produto já mapeado do payload da Yampi, pronto para o upsert.
// ---
// A ausência de variante (skus vazio) vira defaults de preço/estoque/SKU
// zerados, nunca falha do registro.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductImport {
    pub external_id: String,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub sell_price: Decimal,
    pub cost_price: Decimal,
    pub stock: i32,
    pub external_sku: Option<String>,
    pub images: Vec<String>,
}
