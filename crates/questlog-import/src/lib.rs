//! Steam library import and enrichment for Questlog
//!
//! Takes a user's Steam library, reconciles it against their stored library
//! and enriches every title before committing it in one write:
//!
//! 1. Resolve the account identifier to a SteamID64
//! 2. Fetch the owned games
//! 3. Reconcile against storage (NEW skips known titles, FULL replaces)
//! 4. Match metadata on RAWG, with bounded concurrency
//! 5. Resolve IGDB IDs in paced multi-query chunks
//! 6. Fetch IGDB time-to-beat in paced multi-query chunks
//! 7. Look up handheld compatibility on ProtonDB, when the user wants it
//! 8. Commit all records atomically
//!
//! Stages 1, 2, 5 and 6 fail the whole run. Everything else degrades per
//! title and shows up in the report.

pub mod clients;
mod commit;
mod compatibility;
mod completion;
mod crossref;
mod identity;
mod metadata;
mod model;
mod multiquery;
mod outcome;
mod owned;
mod pipeline;
mod reconcile;
mod services;

pub use commit::{CommitStage, EnrichmentSet, estimate_playtime_hours, minutes_to_hours};
pub use compatibility::{CompatibilityEnricher, map_vendor_tier};
pub use completion::{CompletionTimeFetcher, seconds_to_hours};
pub use crossref::CrossReferenceResolver;
pub use identity::{AccountIdentifier, IdentityResolver, parse_identifier};
pub use metadata::MetadataMatcher;
pub use model::{CatalogMatch, CompletionTime, ImportMode, ImportReport, ImportRequest, OwnedTitle};
pub use multiquery::{QueryKeys, sanitize_query_name};
pub use outcome::{Gap, GapReason, StageOutcome};
pub use owned::OwnedLibraryFetcher;
pub use pipeline::{ImportPipeline, ImportServices};
pub use reconcile::{ReconcilePlan, reconcile};
pub use services::{
    CompatibilityService, MetadataCatalog, MultiQueryCatalog, NamedResult, PlatformAccounts,
    QueryFilter, ServiceError, SubQuery,
};

use questlog_config::ConfigError;
use questlog_library::LibraryError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Identity resolution failed: {0}")]
    IdentityResolution(String),

    #[error("Library fetch failed: {0}")]
    LibraryFetch(String),

    #[error("Cross-reference resolution failed: {0}")]
    CrossReference(String),

    #[error("Completion time fetch failed: {0}")]
    CompletionTime(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] LibraryError),

    #[error("Import timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ImportError {
    /// Stable error kind surfaced to callers
    pub fn kind(&self) -> &'static str {
        match self {
            ImportError::IdentityResolution(_) => "IdentityResolutionError",
            ImportError::LibraryFetch(_) => "LibraryFetchError",
            ImportError::CrossReference(_) => "CrossReferenceError",
            ImportError::CompletionTime(_) => "CompletionTimeError",
            ImportError::Config(_) => "ConfigurationError",
            ImportError::Storage(_) => "StorageError",
            ImportError::Timeout(_) => "TimeoutError",
            ImportError::Http(_) => "HttpClientError",
        }
    }
}
