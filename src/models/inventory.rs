// src/models/inventory.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Tipo da movimentação, como o banco guarda ('entrada' / 'saida').
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "movement_type", rename_all = "lowercase")] // Banco
#[serde(rename_all = "lowercase")] // JSON
pub enum MovementType {
    Entrada,
    Saida,
}

// ---
// Movimentação de estoque (livro-razão)
// ---
// Registro imutável de auditoria: criado, nunca atualizado. Uma linha por
// item de pedido ingerido e por item de venda do PDV.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub movement_type: MovementType,

    // Com sinal: negativo para saída.
    pub quantity: i32,

    // Proveniência legível, ex: "Venda Yampi - Pedido 123".
    pub reason: String,
    pub created_at: DateTime<Utc>,
}
