// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::common::error::AppError;

// Cabeçalho HTTP que identifica o tenant da requisição.
const TENANT_ID_HEADER: &str = "x-tenant-id";

/// Extrator do tenant da requisição. Todas as rotas de dados o exigem;
/// a ausência ou um valor malformado rejeitam a requisição com 400.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(TENANT_ID_HEADER)
            .ok_or(AppError::InvalidTenantHeader(
                "O cabeçalho X-Tenant-ID é obrigatório.",
            ))?;

        let value = value.to_str().map_err(|_| {
            AppError::InvalidTenantHeader("Cabeçalho X-Tenant-ID contém caracteres inválidos.")
        })?;

        let tenant_id = Uuid::parse_str(value).map_err(|_| {
            AppError::InvalidTenantHeader("Cabeçalho X-Tenant-ID inválido (não é um UUID).")
        })?;

        Ok(TenantContext(tenant_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> Result<TenantContext, AppError> {
        let (mut parts, _) = req.into_parts();
        TenantContext::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn cabecalho_valido_extrai_o_tenant() {
        let id = Uuid::new_v4();
        let req = Request::builder()
            .header("x-tenant-id", id.to_string())
            .body(())
            .unwrap();

        let ctx = extract(req).await.unwrap();
        assert_eq!(ctx.0, id);
    }

    #[tokio::test]
    async fn cabecalho_ausente_ou_invalido_rejeita() {
        let sem_header = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(sem_header).await,
            Err(AppError::InvalidTenantHeader(_))
        ));

        let invalido = Request::builder()
            .header("x-tenant-id", "não-é-uuid")
            .body(())
            .unwrap();
        assert!(matches!(
            extract(invalido).await,
            Err(AppError::InvalidTenantHeader(_))
        ));
    }
}
