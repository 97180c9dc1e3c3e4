use crate::domain::model::{Item, PackId};
use crate::domain::ports::ItemSource;
use crate::utils::error::{GameError, Result};
use crate::utils::validation;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// 透過 HTTP 取得隨機物件：`GET {endpoint}?pack_id=N`
///
/// 回應可以是單一物件，或 RPC 風格的一筆陣列。
#[derive(Debug, Clone)]
pub struct HttpItemSource {
    client: Client,
    endpoint: String,
}

impl HttpItemSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        validation::validate_url("source.endpoint", endpoint)?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GameError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn unavailable(e: impl std::fmt::Display) -> GameError {
    GameError::source_unavailable(e.to_string())
}

impl ItemSource for HttpItemSource {
    async fn fetch_random(&self, pack_id: PackId) -> Result<Item> {
        tracing::debug!("Fetching random item from {} (pack {})", self.endpoint, pack_id);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("pack_id", pack_id)])
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GameError::source_unavailable(format!(
                "No properties found in pack {}",
                pack_id
            )));
        }
        if !status.is_success() {
            return Err(GameError::source_unavailable(format!(
                "Item endpoint returned {}",
                status
            )));
        }

        let body: serde_json::Value = response.json().await.map_err(unavailable)?;
        let raw = match body {
            serde_json::Value::Array(mut rows) => {
                if rows.is_empty() {
                    return Err(GameError::source_unavailable(format!(
                        "No properties found in pack {}",
                        pack_id
                    )));
                }
                rows.swap_remove(0)
            }
            other => other,
        };

        serde_json::from_value(raw).map_err(unavailable)
    }
}
