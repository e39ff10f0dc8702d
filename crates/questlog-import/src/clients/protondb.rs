//! ProtonDB summary client

use async_trait::async_trait;
use serde::Deserialize;

use super::{decode_json, transport, trim_base};
use crate::{CompatibilityService, ServiceError};

const SERVICE: &str = "ProtonDB";

#[derive(Debug, Deserialize)]
struct Summary {
    tier: Option<String>,
}

pub struct ProtonDbClient {
    client: reqwest::Client,
    base_url: String,
}

impl ProtonDbClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
        }
    }
}

#[async_trait]
impl CompatibilityService for ProtonDbClient {
    async fn tier(&self, app_id: u32) -> Result<Option<String>, ServiceError> {
        let url = format!("{}/reports/summaries/{}.json", self.base_url, app_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(transport(SERVICE))?;

        // Unrated titles have no summary
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let summary: Summary = decode_json(SERVICE, response).await?;
        Ok(summary.tier)
    }
}
