//! IGDB multi-query client

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Write;

use super::{send_json, trim_base};
use crate::{MultiQueryCatalog, NamedResult, QueryFilter, ServiceError, SubQuery};

const SERVICE: &str = "IGDB";

#[derive(Debug, Deserialize)]
struct RawNamedResult {
    name: String,
    #[serde(default)]
    result: Vec<Value>,
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render sub-queries as one multiquery body
pub fn render_multiquery(queries: &[SubQuery]) -> String {
    let mut body = String::new();
    for query in queries {
        let _ = writeln!(body, "query {} \"{}\" {{", query.resource, escape(&query.name));
        let _ = writeln!(body, "  fields {};", query.fields.join(","));
        match &query.filter {
            QueryFilter::Search(term) => {
                let _ = writeln!(body, "  search \"{}\";", escape(term));
            }
            QueryFilter::FieldEquals { field, value } => {
                let _ = writeln!(body, "  where {} = {};", field, value);
            }
        }
        let _ = writeln!(body, "  limit {};", query.limit);
        body.push_str("};\n");
    }
    body
}

pub struct IgdbClient {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    access_token: String,
}

impl IgdbClient {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        client_id: &str,
        access_token: &str,
    ) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            client_id: client_id.to_string(),
            access_token: access_token.to_string(),
        }
    }
}

#[async_trait]
impl MultiQueryCatalog for IgdbClient {
    async fn multiquery(&self, queries: &[SubQuery]) -> Result<Vec<NamedResult>, ServiceError> {
        let url = format!("{}/multiquery", self.base_url);
        let request = self
            .client
            .post(&url)
            .header("Client-ID", &self.client_id)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(render_multiquery(queries));

        let raw: Vec<RawNamedResult> = send_json(SERVICE, request).await?;
        Ok(raw
            .into_iter()
            .map(|r| NamedResult {
                name: r.name,
                result: r.result,
            })
            .collect())
    }
}
