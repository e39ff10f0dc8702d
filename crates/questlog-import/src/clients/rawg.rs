//! RAWG search client

use async_trait::async_trait;
use serde::Deserialize;

use super::{send_json, trim_base};
use crate::{CatalogMatch, MetadataCatalog, ServiceError};

const SERVICE: &str = "RAWG";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawgGame>,
}

#[derive(Debug, Deserialize)]
struct RawgGame {
    name: String,
    background_image: Option<String>,
    #[serde(default)]
    genres: Vec<RawgGenre>,
    released: Option<String>,
    #[serde(default)]
    playtime: u32,
}

#[derive(Debug, Deserialize)]
struct RawgGenre {
    name: String,
}

impl From<RawgGame> for CatalogMatch {
    fn from(game: RawgGame) -> Self {
        Self {
            canonical_name: game.name,
            cover_image_url: game.background_image,
            genres: game.genres.into_iter().map(|g| g.name).collect(),
            release_date: game.released,
            // RAWG reports 0 when it has no data
            playtime_hours_hint: (game.playtime > 0).then_some(game.playtime),
        }
    }
}

pub struct RawgClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RawgClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl MetadataCatalog for RawgClient {
    async fn search(&self, title: &str) -> Result<Option<CatalogMatch>, ServiceError> {
        let url = format!("{}/games", self.base_url);
        let request = self.client.get(&url).query(&[
            ("key", self.api_key.as_str()),
            ("search", title),
            ("page_size", "1"),
        ]);

        let body: SearchResponse = send_json(SERVICE, request).await?;
        Ok(body.results.into_iter().next().map(CatalogMatch::from))
    }
}
