//! Async storage partition seams
//!
//! The import pipeline only sees these traits. `SqliteLibraryStore` backs
//! them with `LibraryDatabase`, running every call on the blocking pool.

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::{
    ImportPreferences, LibraryDatabase, LibraryError, LibraryRecord, NewLibraryRecord, Platform,
};

/// Per-user library partition
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Current full record set for the owner
    async fn records(&self, owner: &str) -> Result<Vec<LibraryRecord>, LibraryError>;

    /// Records filtered by platform
    async fn records_on_platform(
        &self,
        owner: &str,
        platform: Platform,
    ) -> Result<Vec<LibraryRecord>, LibraryError>;

    /// Batched delete
    async fn delete_records(&self, owner: &str, ids: &[i64]) -> Result<usize, LibraryError>;

    /// Batched create; all or nothing
    async fn insert_records(
        &self,
        owner: &str,
        records: &[NewLibraryRecord],
    ) -> Result<Vec<i64>, LibraryError>;

    /// Batched delete followed by batched create, committed atomically
    async fn replace_records(
        &self,
        owner: &str,
        delete_ids: &[i64],
        records: &[NewLibraryRecord],
    ) -> Result<(usize, Vec<i64>), LibraryError>;
}

/// Read-only account preferences
#[async_trait]
pub trait PreferencesStore: Send + Sync {
    async fn import_preferences(&self, owner: &str) -> Result<ImportPreferences, LibraryError>;
}

/// SQLite-backed store, cheap to clone
#[derive(Clone)]
pub struct SqliteLibraryStore {
    db: Arc<Mutex<LibraryDatabase>>,
}

impl SqliteLibraryStore {
    pub fn new(db: LibraryDatabase) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Open or create a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        Ok(Self::new(LibraryDatabase::open(path)?))
    }

    /// In-memory store (for testing)
    pub fn in_memory() -> Result<Self, LibraryError> {
        Ok(Self::new(LibraryDatabase::in_memory()?))
    }

    /// Store preferences; used by account settings and tests
    pub async fn set_preferences(
        &self,
        owner: &str,
        prefs: ImportPreferences,
    ) -> Result<(), LibraryError> {
        let owner = owner.to_string();
        self.with_db(move |db| db.set_preferences(&owner, &prefs))
            .await
    }

    async fn with_db<T, F>(&self, op: F) -> Result<T, LibraryError>
    where
        T: Send + 'static,
        F: FnOnce(&mut LibraryDatabase) -> Result<T, LibraryError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut guard = db
                .lock()
                .map_err(|_| LibraryError::Database("database lock poisoned".into()))?;
            op(&mut *guard)
        })
        .await?
    }
}

#[async_trait]
impl LibraryStore for SqliteLibraryStore {
    async fn records(&self, owner: &str) -> Result<Vec<LibraryRecord>, LibraryError> {
        let owner = owner.to_string();
        self.with_db(move |db| db.get_records(&owner)).await
    }

    async fn records_on_platform(
        &self,
        owner: &str,
        platform: Platform,
    ) -> Result<Vec<LibraryRecord>, LibraryError> {
        let owner = owner.to_string();
        self.with_db(move |db| db.get_records_by_platform(&owner, platform))
            .await
    }

    async fn delete_records(&self, owner: &str, ids: &[i64]) -> Result<usize, LibraryError> {
        let owner = owner.to_string();
        let ids = ids.to_vec();
        self.with_db(move |db| db.delete_records(&owner, &ids)).await
    }

    async fn insert_records(
        &self,
        owner: &str,
        records: &[NewLibraryRecord],
    ) -> Result<Vec<i64>, LibraryError> {
        let owner = owner.to_string();
        let records = records.to_vec();
        self.with_db(move |db| db.insert_records(&owner, &records))
            .await
    }

    async fn replace_records(
        &self,
        owner: &str,
        delete_ids: &[i64],
        records: &[NewLibraryRecord],
    ) -> Result<(usize, Vec<i64>), LibraryError> {
        let owner = owner.to_string();
        let delete_ids = delete_ids.to_vec();
        let records = records.to_vec();
        self.with_db(move |db| db.replace_records(&owner, &delete_ids, &records))
            .await
    }
}

#[async_trait]
impl PreferencesStore for SqliteLibraryStore {
    async fn import_preferences(&self, owner: &str) -> Result<ImportPreferences, LibraryError> {
        let owner = owner.to_string();
        self.with_db(move |db| db.get_preferences(&owner)).await
    }
}
