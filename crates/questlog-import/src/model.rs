//! Import data model

use questlog_library::ImportPreferences;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reconciliation policy for an import run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Add titles not yet in the library
    #[default]
    New,
    /// Replace every PC record with a fresh import
    Full,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::New => "new",
            ImportMode::Full => "full",
        }
    }

    /// Mode implied by the account's stored preferences
    pub fn from_preferences(prefs: &ImportPreferences) -> Self {
        if prefs.replace_on_import {
            ImportMode::Full
        } else {
            ImportMode::New
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "new" => Ok(ImportMode::New),
            "full" => Ok(ImportMode::Full),
            other => Err(format!("unknown import mode: {}", other)),
        }
    }
}

/// One user-initiated import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    /// Vanity name, profile URL or SteamID64
    pub account_identifier: String,
    pub mode: ImportMode,
}

impl ImportRequest {
    pub fn new(account_identifier: impl Into<String>, mode: ImportMode) -> Self {
        Self {
            account_identifier: account_identifier.into(),
            mode,
        }
    }
}

/// A game the Steam account owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedTitle {
    pub app_id: u32,
    pub name: String,
    pub playtime_minutes: u32,
}

impl OwnedTitle {
    pub fn new(app_id: u32, name: impl Into<String>, playtime_minutes: u32) -> Self {
        Self {
            app_id,
            name: name.into(),
            playtime_minutes,
        }
    }
}

/// Top metadata catalog result for a title
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogMatch {
    pub canonical_name: String,
    pub cover_image_url: Option<String>,
    pub genres: Vec<String>,
    pub release_date: Option<String>,
    /// Catalog's own average playtime, in hours
    pub playtime_hours_hint: Option<u32>,
}

/// Time-to-beat estimates, in whole hours
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionTime {
    pub normally_hours: Option<u32>,
    pub completely_hours: Option<u32>,
}

impl CompletionTime {
    /// Main-story estimate, falling back to the completionist one
    pub fn best_estimate(&self) -> Option<u32> {
        self.normally_hours.or(self.completely_hours)
    }
}

/// Outcome of a finished import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub account_id: String,
    pub imported: usize,
    pub failed: usize,
    /// Stored records replaced by a FULL import
    pub removed: usize,
    /// Titles with no metadata match
    pub unmatched: Vec<String>,
    /// Canonical names with no IGDB match
    pub unresolved_cross_references: Vec<String>,
    /// IGDB IDs without time-to-beat data
    pub missing_completion_times: Vec<u64>,
    /// App IDs whose compatibility lookup failed
    pub degraded_compatibility: Vec<u32>,
}
