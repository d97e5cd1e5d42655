// src/db/tenancy_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::tenancy::Tenant};

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cria um novo tenant (Loja).
    pub async fn create_tenant(
        &self,
        name: &str,
        email: &str,
        plan: &str,
    ) -> Result<Tenant, AppError> {
        sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (name, email, plan)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(plan)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Converte violação de chave única em um erro mais amigável
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            AppError::DatabaseError(e)
        })
    }

    pub async fn list_tenants(&self) -> Result<Vec<Tenant>, AppError> {
        let tenants =
            sqlx::query_as::<_, Tenant>("SELECT * FROM tenants ORDER BY created_at ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(tenants)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }
}
