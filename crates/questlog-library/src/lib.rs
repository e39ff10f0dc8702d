//! Game library storage for Questlog
//!
//! Each user owns one partition of library records. The partition supports
//! full reads, filtering by platform, batched deletes and batched creates,
//! all backed by SQLite.

mod database;
mod preferences;
mod record;
mod store;

pub use database::LibraryDatabase;
pub use preferences::ImportPreferences;
pub use record::{CompatibilityTier, GameList, LibraryRecord, NewLibraryRecord, Platform};
pub use store::{LibraryStore, PreferencesStore, SqliteLibraryStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Unknown {kind} value: {value}")]
    UnknownValue { kind: &'static str, value: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_value_display() {
        let err = LibraryError::UnknownValue {
            kind: "platform",
            value: "dreamcast".into(),
        };
        assert_eq!(format!("{}", err), "Unknown platform value: dreamcast");
    }
}
