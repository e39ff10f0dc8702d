//! Upstream API credentials

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ConfigError;

/// API keys for every upstream the importer talks to
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// Steam Web API key (identity lookup and owned games)
    #[serde(default)]
    pub steam_api_key: String,

    /// RAWG API key (metadata catalog)
    #[serde(default)]
    pub rawg_api_key: String,

    /// Twitch client ID used by IGDB
    #[serde(default)]
    pub igdb_client_id: String,

    /// Twitch app access token used by IGDB
    #[serde(default)]
    pub igdb_access_token: String,
}

impl Credentials {
    /// Every credential must be present; ProtonDB needs none
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("steam_api_key", &self.steam_api_key),
            ("rawg_api_key", &self.rawg_api_key),
            ("igdb_client_id", &self.igdb_client_id),
            ("igdb_access_token", &self.igdb_access_token),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingCredential(name));
            }
        }

        Ok(())
    }
}

// Keys never reach the logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(value: &str) -> &'static str {
            if value.is_empty() { "<unset>" } else { "<redacted>" }
        }

        f.debug_struct("Credentials")
            .field("steam_api_key", &mask(&self.steam_api_key))
            .field("rawg_api_key", &mask(&self.rawg_api_key))
            .field("igdb_client_id", &mask(&self.igdb_client_id))
            .field("igdb_access_token", &mask(&self.igdb_access_token))
            .finish()
    }
}
