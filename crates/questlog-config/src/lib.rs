//! Configuration management for Questlog
//!
//! Holds upstream credentials, endpoint base URLs, batching limits and HTTP
//! settings for the library import pipeline. Configuration is layered:
//! built-in defaults, then a TOML file, then `QUESTLOG__SECTION__KEY`
//! environment variables.

mod batching;
mod credentials;
mod endpoints;

pub use batching::{BatchConfig, HttpConfig};
pub use credentials::Credentials;
pub use endpoints::Endpoints;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration source error: {0}")]
    Source(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Standard configuration paths
pub const CONFIG_DIR: &str = "/etc/questlog";
pub const USER_CONFIG_DIR: &str = ".config/questlog";

/// Prefix for environment overrides (`QUESTLOG__CREDENTIALS__STEAM_API_KEY`)
pub const ENV_PREFIX: &str = "QUESTLOG";

/// Import pipeline configuration, injected into the pipeline entry point
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub credentials: Credentials,

    #[serde(default)]
    pub endpoints: Endpoints,

    #[serde(default)]
    pub batching: BatchConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

impl ImportConfig {
    /// Load configuration from a TOML file only
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load defaults, an optional TOML file and environment overrides.
    ///
    /// `env` replaces the process environment when given, which keeps tests
    /// hermetic.
    pub fn load_layered(
        file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            builder = builder
                .add_source(config::File::from(path).format(config::FileFormat::Toml));
        }

        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .source(env);

        let settings = builder.add_source(environment).build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Load configuration from default locations plus the process environment
    pub fn load_default() -> Result<Self, ConfigError> {
        // Try user config first, then system config
        if let Some(home) = std::env::var_os("HOME") {
            let user_config = Path::new(&home).join(USER_CONFIG_DIR).join("config.toml");
            if user_config.exists() {
                return Self::load_layered(Some(&user_config), None);
            }
        }

        let system_config = Path::new(CONFIG_DIR).join("config.toml");
        if system_config.exists() {
            return Self::load_layered(Some(&system_config), None);
        }

        tracing::warn!("No configuration file found, using defaults and environment");
        Self::load_layered(None, None)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Check that every upstream is usable before any request goes out
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.credentials.validate()?;
        self.endpoints.validate()?;
        self.batching.validate()?;
        self.http.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn full_credentials() -> Credentials {
        Credentials {
            steam_api_key: "steam".into(),
            rawg_api_key: "rawg".into(),
            igdb_client_id: "client".into(),
            igdb_access_token: "token".into(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = ImportConfig::default();
        assert_eq!(config.batching.cross_reference_chunk_size, 10);
        assert_eq!(config.batching.completion_time_chunk_size, 10);
        assert_eq!(config.batching.pacing_ms, 1000);
        assert!(config.http.import_deadline_secs.is_none());
    }

    #[test]
    fn test_default_config_fails_validation() {
        let err = ImportConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential("steam_api_key")));
    }

    #[test]
    fn test_validate_with_credentials() {
        let config = ImportConfig {
            credentials: full_credentials(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_chunk_size_is_invalid() {
        let mut config = ImportConfig {
            credentials: full_credentials(),
            ..Default::default()
        };
        config.batching.cross_reference_chunk_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let config_content = r#"
[credentials]
steam_api_key = "abc"

[batching]
pacing_ms = 250
metadata_concurrency = 4
"#;
        write!(temp_file, "{}", config_content).unwrap();

        let config = ImportConfig::load(temp_file.path()).unwrap();
        assert_eq!(config.credentials.steam_api_key, "abc");
        assert_eq!(config.batching.pacing_ms, 250);
        assert_eq!(config.batching.metadata_concurrency, 4);
        // Untouched values keep their defaults
        assert_eq!(config.batching.cross_reference_chunk_size, 10);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ImportConfig::load(Path::new("/nonexistent/questlog.toml")).unwrap_err();
        assert!(format!("{}", err).contains("not found"));
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(
            temp_file,
            "[credentials]\nsteam_api_key = \"from-file\"\nrawg_api_key = \"rawg\"\n"
        )
        .unwrap();

        let mut env = HashMap::new();
        env.insert(
            "QUESTLOG__CREDENTIALS__STEAM_API_KEY".to_string(),
            "from-env".to_string(),
        );
        env.insert("QUESTLOG__BATCHING__PACING_MS".to_string(), "50".to_string());

        let config = ImportConfig::load_layered(Some(temp_file.path()), Some(env)).unwrap();
        assert_eq!(config.credentials.steam_api_key, "from-env");
        assert_eq!(config.credentials.rawg_api_key, "rawg");
        assert_eq!(config.batching.pacing_ms, 50);
    }

    #[test]
    fn test_save_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let config = ImportConfig {
            credentials: full_credentials(),
            ..Default::default()
        };

        config.save(temp_file.path()).unwrap();

        let loaded = ImportConfig::load(temp_file.path()).unwrap();
        assert_eq!(loaded.credentials.igdb_client_id, "client");
        assert_eq!(loaded.batching.pacing_ms, config.batching.pacing_ms);
    }

    #[test]
    fn test_constants() {
        assert_eq!(CONFIG_DIR, "/etc/questlog");
        assert_eq!(ENV_PREFIX, "QUESTLOG");
    }
}
