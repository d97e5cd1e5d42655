// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
//
// As variantes cobrem as quatro famílias de falha da sync:
// - configuração ausente (aborta a rotina antes de qualquer chamada de rede)
// - falha de fetch (aborta as páginas restantes da run atual)
// - erro de mapeamento (isolado por registro)
// - erro de storage (violação de constraint ou conectividade)
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Credencial/variável de ambiente ausente. A rotina de sync vira no-op.
    #[error("Configuração ausente: {0}")]
    MissingConfig(&'static str),

    // Falha HTTP/rede ao buscar uma página do provedor externo.
    #[error("Falha ao buscar dados externos ({status:?}): {message}")]
    Fetch {
        status: Option<u16>,
        message: String,
    },

    // Registro externo com formato inesperado. Capturado por registro,
    // nunca aborta os irmãos da mesma página.
    #[error("Registro externo inválido: {0}")]
    Mapping(String),

    // Cabeçalho X-Tenant-ID ausente ou malformado.
    #[error("{0}")]
    InvalidTenantHeader(&'static str),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Tenant não encontrado")]
    TenantNotFound,

    #[error("Produto não encontrado")]
    ProductNotFound,

    #[error("Estoque insuficiente para '{0}'")]
    InsufficientStock(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::MissingConfig(var) => {
                tracing::error!("Credenciais não encontradas no .env: {}", var);
                let body = Json(json!({
                    "error": format!("Configuração ausente: {}", var),
                }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
            AppError::Fetch { status, ref message } => {
                tracing::error!("Erro grave na sync: {:?} {}", status, message);
                let body = Json(json!({
                    "error": "Falha na sincronização com o provedor externo.",
                    "details": message,
                }));
                return (StatusCode::BAD_GATEWAY, body).into_response();
            }
            AppError::InvalidTenantHeader(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "Este e-mail já está em uso."),
            AppError::TenantNotFound => (StatusCode::NOT_FOUND, "Tenant não encontrado."),
            AppError::ProductNotFound => (StatusCode::NOT_FOUND, "Produto não encontrado."),
            AppError::InsufficientStock(ref name) => {
                let body = Json(json!({
                    "error": format!("Estoque insuficiente para {}", name),
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Mapping(ref msg) => {
                let body = Json(json!({ "error": "Registro inválido.", "details": msg }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` vai logar a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
