// src/db/metrics_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::metrics::Metric};

#[derive(Clone)]
pub struct MetricRepository {
    pool: PgPool,
}

impl MetricRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Anexa um snapshot novo. Sem upsert e sem dedup: cada invocação da
    /// sync adiciona uma linha, mesmo com payload idêntico.
    pub async fn append<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        metric_type: &str,
        data: &serde_json::Value,
        date: DateTime<Utc>,
    ) -> Result<Metric, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let metric = sqlx::query_as::<_, Metric>(
            r#"
            INSERT INTO metrics (tenant_id, type, data, date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(metric_type)
        .bind(data)
        .bind(date)
        .fetch_one(executor)
        .await?;

        Ok(metric)
    }

    /// Lista snapshots do tenant, mais recentes primeiro, com filtro
    /// opcional por tipo (o dashboard de visitas usa o mais recente).
    pub async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        metric_type: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Metric>, AppError> {
        let metrics = sqlx::query_as::<_, Metric>(
            r#"
            SELECT * FROM metrics
            WHERE tenant_id = $1 AND ($2::text IS NULL OR type = $2)
            ORDER BY date DESC
            LIMIT $3
            "#,
        )
        .bind(tenant_id)
        .bind(metric_type)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(metrics)
    }
}
