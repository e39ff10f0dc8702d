//! HTTP implementations of the collaborator traits

mod igdb;
mod protondb;
mod rawg;
mod steam;

pub use igdb::{IgdbClient, render_multiquery};
pub use protondb::ProtonDbClient;
pub use rawg::RawgClient;
pub use steam::SteamClient;

use questlog_config::HttpConfig;
use serde::de::DeserializeOwned;

use crate::ServiceError;

/// Shared client carrying the configured timeout and user agent
pub fn build_http_client(config: &HttpConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .user_agent(config.user_agent.clone())
        .build()
}

fn transport(service: &'static str) -> impl FnOnce(reqwest::Error) -> ServiceError {
    move |source| ServiceError::Transport { service, source }
}

/// Send a request, require a 2xx and decode the JSON body
async fn send_json<T: DeserializeOwned>(
    service: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<T, ServiceError> {
    let response = request.send().await.map_err(transport(service))?;
    decode_json(service, response).await
}

async fn decode_json<T: DeserializeOwned>(
    service: &'static str,
    response: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ServiceError::Status {
            service,
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(transport(service))?;
    serde_json::from_slice(&body).map_err(|e| ServiceError::Decode {
        service,
        message: e.to_string(),
    })
}

fn trim_base(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}
