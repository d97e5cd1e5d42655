// src/db/sales_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sales::{OrderImport, Sale, SaleItem},
};

#[derive(Clone)]
pub struct SaleRepository {
    pool: PgPool,
}

impl SaleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pré-checagem barata da ingestão: pedido já registrado é pulado
    /// antes mesmo de abrir transação.
    pub async fn exists_by_external_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        external_id: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM sales
                WHERE tenant_id = $1 AND external_id = $2
            )
            "#,
        )
        .bind(tenant_id)
        .bind(external_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// Insert condicional da ingestão: no máximo UMA venda por pedido
    /// externo. Se outra run concorrente chegou primeiro, o ON CONFLICT
    /// não retorna linha e o chamador pula o pedido inteiro (sem baixa
    /// de estoque duplicada).
    pub async fn insert_external<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        order: &OrderImport,
    ) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales
                (tenant_id, external_id, total, date,
                 customer_name, customer_email, status, external_items)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (tenant_id, external_id) WHERE external_id IS NOT NULL
            DO NOTHING
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(&order.external_id)
        .bind(order.total)
        .bind(order.date)
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(&order.status)
        .bind(&order.external_items)
        .fetch_optional(executor)
        .await?;

        Ok(sale)
    }

    /// Venda do PDV local (sem external_id).
    pub async fn insert_pos_sale<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        total: Decimal,
        date: DateTime<Utc>,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (tenant_id, total, date, status)
            VALUES ($1, $2, $3, 'completed')
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(total)
        .bind(date)
        .fetch_one(executor)
        .await?;

        Ok(sale)
    }

    pub async fn insert_sale_item<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        price_at_sale: Decimal,
    ) -> Result<SaleItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, SaleItem>(
            r#"
            INSERT INTO sale_items (sale_id, product_id, quantity, price_at_sale)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(product_id)
        .bind(quantity)
        .bind(price_at_sale)
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    /// Lista as vendas do tenant, mais recentes primeiro.
    pub async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Sale>, AppError> {
        let sales = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales WHERE tenant_id = $1 ORDER BY date DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }

    pub async fn list_items_for_sales(
        &self,
        sale_ids: &[Uuid],
    ) -> Result<Vec<SaleItem>, AppError> {
        let items = sqlx::query_as::<_, SaleItem>(
            "SELECT * FROM sale_items WHERE sale_id = ANY($1)",
        )
        .bind(sale_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
