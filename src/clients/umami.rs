// src/clients/umami.rs
//
// Cliente do Umami Analytics: um único GET de estatísticas agregadas
// para a janela fixa dos últimos 7 dias.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::debug;

use super::source::VisitSource;
use crate::common::error::AppError;

// Janela fixa de 7 dias, em milissegundos (a API recebe epoch ms).
const WINDOW_MS: i64 = 7 * 24 * 60 * 60 * 1000;

#[derive(Clone)]
pub struct UmamiClient {
    client: Client,
    api_url: String,
    website_id: String,
    // Valor completo do cabeçalho Authorization (ex: "Basic ...").
    auth_header: String,
}

impl UmamiClient {
    pub fn new(api_url: String, website_id: String, auth_header: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            website_id,
            auth_header,
        }
    }
}

#[async_trait]
impl VisitSource for UmamiClient {
    async fn fetch_stats(&self) -> Result<serde_json::Value, AppError> {
        let end_at = Utc::now().timestamp_millis();
        let start_at = end_at - WINDOW_MS;

        let url = format!("{}/websites/{}/stats", self.api_url, self.website_id);

        debug!(website_id = %self.website_id, "Buscando estatísticas no Umami");

        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.auth_header)
            .query(&[("startAt", start_at), ("endAt", end_at)])
            .send()
            .await
            .map_err(|e| AppError::Fetch {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Fetch {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AppError::Fetch {
                status: None,
                message: e.to_string(),
            })
    }
}
