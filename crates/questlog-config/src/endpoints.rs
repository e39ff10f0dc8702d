//! Upstream base URLs

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Base URLs for the upstream services, overridable for self-hosted mirrors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_steam_api")]
    pub steam_api: String,

    #[serde(default = "default_rawg_api")]
    pub rawg_api: String,

    #[serde(default = "default_igdb_api")]
    pub igdb_api: String,

    #[serde(default = "default_protondb_api")]
    pub protondb_api: String,
}

fn default_steam_api() -> String {
    "https://api.steampowered.com".to_string()
}

fn default_rawg_api() -> String {
    "https://api.rawg.io/api".to_string()
}

fn default_igdb_api() -> String {
    "https://api.igdb.com/v4".to_string()
}

fn default_protondb_api() -> String {
    "https://www.protondb.com/api/v1".to_string()
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            steam_api: default_steam_api(),
            rawg_api: default_rawg_api(),
            igdb_api: default_igdb_api(),
            protondb_api: default_protondb_api(),
        }
    }
}

impl Endpoints {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, url) in [
            ("steam_api", &self.steam_api),
            ("rawg_api", &self.rawg_api),
            ("igdb_api", &self.igdb_api),
            ("protondb_api", &self.protondb_api),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "endpoint {} is not an http(s) URL: {}",
                    name, url
                )));
            }
        }
        Ok(())
    }
}
