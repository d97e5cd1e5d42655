// src/clients/clarity.rs
//
// Cliente do Microsoft Clarity (analytics de comportamento).
// A API de export aceita no máximo os últimos 3 dias por chamada.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::source::VisitSource;
use crate::common::error::AppError;

#[derive(Clone)]
pub struct ClarityClient {
    client: Client,
    api_url: String,
    token: String,
}

impl ClarityClient {
    pub fn new(api_url: String, token: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            token,
        }
    }
}

#[async_trait]
impl VisitSource for ClarityClient {
    async fn fetch_stats(&self) -> Result<serde_json::Value, AppError> {
        debug!("Buscando insights no Clarity");

        let response = self
            .client
            .get(&self.api_url)
            .bearer_auth(&self.token)
            .query(&[("numOfDays", "3")])
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
