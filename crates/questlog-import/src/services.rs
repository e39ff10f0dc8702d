//! Upstream collaborator seams
//!
//! Each third-party service is a trait so the pipeline can run against the
//! HTTP clients in `clients` or against in-memory fakes.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::{CatalogMatch, OwnedTitle};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} sent an unexpected response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("{service} rejected the request: {message}")]
    Rejected {
        service: &'static str,
        message: String,
    },
}

/// Steam identity lookup and owned games
#[async_trait]
pub trait PlatformAccounts: Send + Sync {
    /// Resolve a vanity name to a SteamID64
    async fn resolve_vanity(&self, vanity: &str) -> Result<String, ServiceError>;

    /// Every game the account owns, with app info
    async fn owned_titles(&self, account_id: &str) -> Result<Vec<OwnedTitle>, ServiceError>;
}

/// Search-by-title metadata catalog
#[async_trait]
pub trait MetadataCatalog: Send + Sync {
    /// Top search result, if any
    async fn search(&self, title: &str) -> Result<Option<CatalogMatch>, ServiceError>;
}

/// How a sub-query selects rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryFilter {
    /// Full-text search on the resource
    Search(String),
    /// `field = value`
    FieldEquals { field: &'static str, value: u64 },
}

/// One named query inside a multi-query request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubQuery {
    /// Caller-assigned name, echoed back in the response
    pub name: String,
    pub resource: &'static str,
    pub fields: &'static [&'static str],
    pub filter: QueryFilter,
    pub limit: usize,
}

/// Rows returned for one sub-query
#[derive(Debug, Clone, PartialEq)]
pub struct NamedResult {
    pub name: String,
    pub result: Vec<Value>,
}

/// Catalog accepting several independent queries in one request
#[async_trait]
pub trait MultiQueryCatalog: Send + Sync {
    async fn multiquery(&self, queries: &[SubQuery]) -> Result<Vec<NamedResult>, ServiceError>;
}

/// Per-title handheld compatibility lookup
#[async_trait]
pub trait CompatibilityService: Send + Sync {
    /// Vendor tier string, or `None` when the title has no rating
    async fn tier(&self, app_id: u32) -> Result<Option<String>, ServiceError>;
}
