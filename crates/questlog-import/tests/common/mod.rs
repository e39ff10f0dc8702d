//! In-memory collaborators for pipeline tests

#![allow(dead_code)]

use async_trait::async_trait;
use questlog_config::ImportConfig;
use questlog_import::{
    CatalogMatch, CompatibilityService, ImportServices, MetadataCatalog, MultiQueryCatalog,
    NamedResult, OwnedTitle, PlatformAccounts, QueryFilter, ServiceError, SubQuery,
};
use questlog_library::{
    ImportPreferences, LibraryError, LibraryRecord, LibraryStore, NewLibraryRecord, Platform,
    PreferencesStore, SqliteLibraryStore,
};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

pub const OWNER: &str = "alice";
pub const STEAM_ID: &str = "76561197960287930";

/// Config with every credential filled and no pacing
pub fn test_config() -> ImportConfig {
    let mut config = ImportConfig::default();
    config.credentials.steam_api_key = "steam-key".into();
    config.credentials.rawg_api_key = "rawg-key".into();
    config.credentials.igdb_client_id = "igdb-id".into();
    config.credentials.igdb_access_token = "igdb-token".into();
    config.batching.pacing_ms = 0;
    config
}

pub fn pc(title: &str, app_id: u32) -> NewLibraryRecord {
    NewLibraryRecord::new(title, Platform::Pc).with_app_id(app_id)
}

/// Steam account owning a fixed library
#[derive(Default)]
pub struct FakeSteam {
    pub vanity: HashMap<String, String>,
    pub owned: Vec<OwnedTitle>,
    pub hang_on_owned: bool,
    pub fail_owned: bool,
    pub calls: AtomicUsize,
}

impl FakeSteam {
    pub fn owning(owned: Vec<OwnedTitle>) -> Self {
        Self {
            owned,
            ..Default::default()
        }
    }
}

#[async_trait]
impl PlatformAccounts for FakeSteam {
    async fn resolve_vanity(&self, vanity: &str) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.vanity
            .get(vanity)
            .cloned()
            .ok_or_else(|| ServiceError::Rejected {
                service: "Steam",
                message: "No match".into(),
            })
    }

    async fn owned_titles(&self, _account_id: &str) -> Result<Vec<OwnedTitle>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_on_owned {
            std::future::pending::<()>().await;
        }
        if self.fail_owned {
            return Err(ServiceError::Status {
                service: "Steam",
                status: 500,
            });
        }
        Ok(self.owned.clone())
    }
}

/// Catalog that knows every title except the listed ones
#[derive(Default)]
pub struct FakeCatalog {
    pub unknown: HashSet<String>,
    pub renamed: HashMap<String, String>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl MetadataCatalog for FakeCatalog {
    async fn search(&self, title: &str) -> Result<Option<CatalogMatch>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unknown.contains(title) {
            return Ok(None);
        }
        let canonical = self.renamed.get(title).cloned().unwrap_or_else(|| title.to_string());
        Ok(Some(CatalogMatch {
            canonical_name: canonical,
            genres: vec!["Indie".into()],
            ..Default::default()
        }))
    }
}

/// One recorded multi-query request
#[derive(Debug, Clone)]
pub struct MultiQueryCall {
    pub at: Instant,
    pub queries: Vec<SubQuery>,
}

/// IGDB stand-in answering from fixed tables
#[derive(Default)]
pub struct FakeIgdb {
    /// Search term to game ID
    pub ids: HashMap<String, u64>,
    /// Game ID to (normally, completely) in seconds
    pub times: HashMap<u64, (Option<u64>, Option<u64>)>,
    /// Resource that answers HTTP 500
    pub failing_resource: Option<&'static str>,
    pub calls: Mutex<Vec<MultiQueryCall>>,
}

impl FakeIgdb {
    pub fn calls(&self) -> Vec<MultiQueryCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, resource: &str) -> Vec<MultiQueryCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.queries.iter().any(|q| q.resource == resource))
            .collect()
    }
}

#[async_trait]
impl MultiQueryCatalog for FakeIgdb {
    async fn multiquery(&self, queries: &[SubQuery]) -> Result<Vec<NamedResult>, ServiceError> {
        self.calls.lock().unwrap().push(MultiQueryCall {
            at: Instant::now(),
            queries: queries.to_vec(),
        });

        if let Some(resource) = self.failing_resource {
            if queries.iter().any(|q| q.resource == resource) {
                return Err(ServiceError::Status {
                    service: "IGDB",
                    status: 500,
                });
            }
        }

        Ok(queries
            .iter()
            .map(|query| {
                let result = match &query.filter {
                    QueryFilter::Search(term) => self
                        .ids
                        .get(term)
                        .map(|id| vec![json!({"id": id, "name": term})])
                        .unwrap_or_default(),
                    QueryFilter::FieldEquals { value, .. } => self
                        .times
                        .get(value)
                        .map(|(normally, completely)| {
                            vec![json!({
                                "game_id": value,
                                "normally": normally,
                                "completely": completely,
                            })]
                        })
                        .unwrap_or_default(),
                };
                NamedResult {
                    name: query.name.clone(),
                    result,
                }
            })
            .collect())
    }
}

/// ProtonDB stand-in; every title rates gold unless listed as failing
#[derive(Default)]
pub struct FakeProton {
    pub failing: HashSet<u32>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl CompatibilityService for FakeProton {
    async fn tier(&self, app_id: u32) -> Result<Option<String>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&app_id) {
            return Err(ServiceError::Status {
                service: "ProtonDB",
                status: 502,
            });
        }
        Ok(Some("gold".into()))
    }
}

/// SQLite store counting every write
pub struct CountingStore {
    pub inner: SqliteLibraryStore,
    pub writes: AtomicUsize,
    /// Blocking delay inside the commit, before the transaction runs
    pub commit_delay: Duration,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::with_commit_delay(Duration::ZERO)
    }

    pub fn with_commit_delay(commit_delay: Duration) -> Self {
        Self {
            inner: SqliteLibraryStore::in_memory().unwrap(),
            writes: AtomicUsize::new(0),
            commit_delay,
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LibraryStore for CountingStore {
    async fn records(&self, owner: &str) -> Result<Vec<LibraryRecord>, LibraryError> {
        self.inner.records(owner).await
    }

    async fn records_on_platform(
        &self,
        owner: &str,
        platform: Platform,
    ) -> Result<Vec<LibraryRecord>, LibraryError> {
        self.inner.records_on_platform(owner, platform).await
    }

    async fn delete_records(&self, owner: &str, ids: &[i64]) -> Result<usize, LibraryError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_records(owner, ids).await
    }

    async fn insert_records(
        &self,
        owner: &str,
        records: &[NewLibraryRecord],
    ) -> Result<Vec<i64>, LibraryError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_records(owner, records).await
    }

    async fn replace_records(
        &self,
        owner: &str,
        delete_ids: &[i64],
        records: &[NewLibraryRecord],
    ) -> Result<(usize, Vec<i64>), LibraryError> {
        self.writes.fetch_add(1, Ordering::SeqCst);

        // Like the SQLite store, the write is detached from the caller and
        // finishes even if the caller stops waiting
        let inner = self.inner.clone();
        let delay = self.commit_delay;
        let owner = owner.to_string();
        let delete_ids = delete_ids.to_vec();
        let records = records.to_vec();
        let write = tokio::spawn(async move {
            let _ = tokio::task::spawn_blocking(move || std::thread::sleep(delay)).await;
            inner.replace_records(&owner, &delete_ids, &records).await
        });
        write.await?
    }
}

#[async_trait]
impl PreferencesStore for CountingStore {
    async fn import_preferences(&self, owner: &str) -> Result<ImportPreferences, LibraryError> {
        self.inner.import_preferences(owner).await
    }
}

/// Every fake behind one handle, so tests can inspect calls afterwards
pub struct Harness {
    pub steam: Arc<FakeSteam>,
    pub catalog: Arc<FakeCatalog>,
    pub igdb: Arc<FakeIgdb>,
    pub proton: Arc<FakeProton>,
    pub store: Arc<CountingStore>,
}

impl Harness {
    pub fn new(steam: FakeSteam) -> Self {
        Self {
            steam: Arc::new(steam),
            catalog: Arc::new(FakeCatalog::default()),
            igdb: Arc::new(FakeIgdb::default()),
            proton: Arc::new(FakeProton::default()),
            store: Arc::new(CountingStore::new()),
        }
    }

    pub fn with_catalog(mut self, catalog: FakeCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    pub fn with_igdb(mut self, igdb: FakeIgdb) -> Self {
        self.igdb = Arc::new(igdb);
        self
    }

    pub fn with_store(mut self, store: CountingStore) -> Self {
        self.store = Arc::new(store);
        self
    }

    pub fn with_proton(mut self, proton: FakeProton) -> Self {
        self.proton = Arc::new(proton);
        self
    }

    pub fn services(&self) -> ImportServices {
        ImportServices {
            accounts: self.steam.clone(),
            catalog: self.catalog.clone(),
            cross_reference: self.igdb.clone(),
            compatibility: self.proton.clone(),
            store: self.store.clone(),
            preferences: self.store.clone(),
        }
    }

    pub async fn set_preferences(&self, prefs: ImportPreferences) {
        self.store.inner.set_preferences(OWNER, prefs).await.unwrap();
    }
}
