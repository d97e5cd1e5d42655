// src/db/inventory_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{MovementType, StockMovement},
};

#[derive(Clone)]
pub struct StockMovementRepository {
    pool: PgPool,
}

impl StockMovementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registra uma movimentação no livro-razão (auditoria).
    /// Append-only: nunca existe update de movimentação.
    pub async fn record_movement<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Uuid,
        movement_type: MovementType,
        quantity: i32,
        reason: &str,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements (tenant_id, product_id, type, quantity, reason)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(product_id)
        .bind(movement_type)
        .bind(quantity)
        .bind(reason)
        .fetch_one(executor)
        .await?;

        Ok(movement)
    }

    pub async fn list_by_product(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
    ) -> Result<Vec<StockMovement>, AppError> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE tenant_id = $1 AND product_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }
}
