//! Batching, pacing and HTTP settings

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ConfigError;

/// Fan-out and chunking limits for the enrichment stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Concurrent metadata searches
    #[serde(default = "default_metadata_concurrency")]
    pub metadata_concurrency: usize,

    /// Concurrent compatibility lookups
    #[serde(default = "default_compatibility_concurrency")]
    pub compatibility_concurrency: usize,

    /// Titles per cross-reference multi-query request
    #[serde(default = "default_chunk_size")]
    pub cross_reference_chunk_size: usize,

    /// IDs per completion-time multi-query request
    #[serde(default = "default_chunk_size")]
    pub completion_time_chunk_size: usize,

    /// Delay between consecutive multi-query requests, in milliseconds
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

fn default_metadata_concurrency() -> usize {
    12
}

fn default_compatibility_concurrency() -> usize {
    8
}

fn default_chunk_size() -> usize {
    10
}

fn default_pacing_ms() -> u64 {
    1000
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            metadata_concurrency: default_metadata_concurrency(),
            compatibility_concurrency: default_compatibility_concurrency(),
            cross_reference_chunk_size: default_chunk_size(),
            completion_time_chunk_size: default_chunk_size(),
            pacing_ms: default_pacing_ms(),
        }
    }
}

impl BatchConfig {
    /// Pause between multi-query chunks
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("metadata_concurrency", self.metadata_concurrency),
            ("compatibility_concurrency", self.compatibility_concurrency),
            ("cross_reference_chunk_size", self.cross_reference_chunk_size),
            ("completion_time_chunk_size", self.completion_time_chunk_size),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be at least 1", name)));
            }
        }
        Ok(())
    }
}

/// HTTP client settings shared by all upstream clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// User agent sent to every upstream
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Upper bound for a whole import run; unbounded when unset
    #[serde(default)]
    pub import_deadline_secs: Option<u64>,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("Questlog/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
            import_deadline_secs: None,
        }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn import_deadline(&self) -> Option<Duration> {
        self.import_deadline_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
