//! Steam Web API client

use async_trait::async_trait;
use serde::Deserialize;

use super::{send_json, trim_base};
use crate::{OwnedTitle, PlatformAccounts, ServiceError};

const SERVICE: &str = "Steam";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: T,
}

#[derive(Debug, Deserialize)]
struct VanityResponse {
    success: u8,
    steamid: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwnedGamesResponse {
    /// Absent when the profile's game details are private
    game_count: Option<u32>,
    #[serde(default)]
    games: Vec<OwnedGame>,
}

#[derive(Debug, Deserialize)]
struct OwnedGame {
    appid: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    playtime_forever: u32,
}

/// Nameless entries are kept so they surface as unmatched
fn titles_from(games: Vec<OwnedGame>) -> Vec<OwnedTitle> {
    games
        .into_iter()
        .map(|game| OwnedTitle::new(game.appid, game.name, game.playtime_forever))
        .collect()
}

pub struct SteamClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SteamClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl PlatformAccounts for SteamClient {
    async fn resolve_vanity(&self, vanity: &str) -> Result<String, ServiceError> {
        let url = format!("{}/ISteamUser/ResolveVanityURL/v1/", self.base_url);
        tracing::debug!("Resolving vanity name {}", vanity);

        let request = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("vanityurl", vanity)]);
        let body: Envelope<VanityResponse> = send_json(SERVICE, request).await?;

        match body.response {
            VanityResponse {
                success: 1,
                steamid: Some(id),
                ..
            } => Ok(id),
            VanityResponse { message, .. } => Err(ServiceError::Rejected {
                service: SERVICE,
                message: message.unwrap_or_else(|| format!("no profile named '{}'", vanity)),
            }),
        }
    }

    async fn owned_titles(&self, account_id: &str) -> Result<Vec<OwnedTitle>, ServiceError> {
        let url = format!("{}/IPlayerService/GetOwnedGames/v1/", self.base_url);
        tracing::debug!("Fetching owned games for {}", account_id);

        let request = self.client.get(&url).query(&[
            ("key", self.api_key.as_str()),
            ("steamid", account_id),
            ("include_appinfo", "1"),
            ("include_played_free_games", "1"),
            ("format", "json"),
        ]);
        let body: Envelope<OwnedGamesResponse> = send_json(SERVICE, request).await?;

        if body.response.game_count.is_none() {
            return Err(ServiceError::Rejected {
                service: SERVICE,
                message: format!("game details for {} are private", account_id),
            });
        }

        Ok(titles_from(body.response.games))
    }
}
