// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{Product, ProductImport},
};

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leituras
    // ---

    pub async fn get_all(&self, tenant_id: Uuid) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE tenant_id = $1 ORDER BY name ASC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn find_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    // ---
    // Escritas (aceitam um executor: pool ou transação)
    // ---

    /// Upsert idempotente da sync, chaveado por (tenant_id, external_id).
    /// Em conflito, sobrescreve todos os campos mapeados + last_synced_at.
    pub async fn upsert_by_external_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        data: &ProductImport,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products
                (tenant_id, external_id, name, slug, description,
                 sell_price, cost_price, stock, external_sku, images, last_synced_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now())
            ON CONFLICT (tenant_id, external_id) WHERE external_id IS NOT NULL
            DO UPDATE SET
                name = EXCLUDED.name,
                slug = EXCLUDED.slug,
                description = EXCLUDED.description,
                sell_price = EXCLUDED.sell_price,
                cost_price = EXCLUDED.cost_price,
                stock = EXCLUDED.stock,
                external_sku = EXCLUDED.external_sku,
                images = EXCLUDED.images,
                last_synced_at = EXCLUDED.last_synced_at,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(&data.external_id)
        .bind(&data.name)
        .bind(&data.slug)
        .bind(&data.description)
        .bind(data.sell_price)
        .bind(data.cost_price)
        .bind(data.stock)
        .bind(&data.external_sku)
        .bind(&data.images)
        .fetch_one(executor)
        .await?;

        Ok(product)
    }

    /// Cria um produto manual (sem external_id).
    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        name: &str,
        cost_price: Decimal,
        sell_price: Decimal,
        stock: i32,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (tenant_id, name, cost_price, sell_price, stock, size, color)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(cost_price)
        .bind(sell_price)
        .bind(stock)
        .bind(size)
        .bind(color)
        .fetch_one(executor)
        .await?;

        Ok(product)
    }

    /// Atualização manual via CRUD.
    #[allow(clippy::too_many_arguments)]
    pub async fn update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        name: &str,
        cost_price: Decimal,
        sell_price: Decimal,
        stock: i32,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = $3,
                cost_price = $4,
                sell_price = $5,
                stock = $6,
                size = $7,
                color = $8,
                updated_at = now()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(name)
        .bind(cost_price)
        .bind(sell_price)
        .bind(stock)
        .bind(size)
        .bind(color)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ProductNotFound)
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ProductNotFound);
        }
        Ok(())
    }

    /// Decremento em lote da ingestão de pedidos: atualiza a linha que
    /// casa com o external_id, sem read-modify-write. Retorna o id interno
    /// do produto atingido (None quando nenhum produto local casa).
    pub async fn decrement_stock_by_external_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        external_id: &str,
        quantity: i32,
    ) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE products
            SET stock = stock - $3, updated_at = now()
            WHERE tenant_id = $1 AND external_id = $2
            RETURNING id
            "#,
        )
        .bind(tenant_id)
        .bind(external_id)
        .bind(quantity)
        .fetch_optional(executor)
        .await?;

        Ok(id)
    }

    /// Decremento atômico do PDV, com guarda de saldo (stock >= qty).
    /// Retorna None quando o produto não existe ou o saldo é insuficiente —
    /// nunca lê-e-escreve em dois passos.
    pub async fn try_decrement_stock<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET stock = stock - $3, updated_at = now()
            WHERE id = $2 AND tenant_id = $1 AND stock >= $3
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(executor)
        .await?;

        Ok(product)
    }
}
