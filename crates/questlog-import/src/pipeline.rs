//! Import orchestration

use questlog_config::ImportConfig;
use questlog_library::{LibraryStore, NewLibraryRecord, PreferencesStore};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clients::{IgdbClient, ProtonDbClient, RawgClient, SteamClient, build_http_client};
use crate::commit::EnrichmentSet;
use crate::reconcile::IMPORT_PLATFORM;
use crate::{
    CommitStage, CompatibilityEnricher, CompatibilityService, CompletionTimeFetcher,
    CrossReferenceResolver, IdentityResolver, ImportError, ImportMode, ImportReport,
    ImportRequest, MetadataCatalog, MetadataMatcher, MultiQueryCatalog, OwnedLibraryFetcher,
    PlatformAccounts, reconcile,
};

/// Collaborators the pipeline runs against
#[derive(Clone)]
pub struct ImportServices {
    pub accounts: Arc<dyn PlatformAccounts>,
    pub catalog: Arc<dyn MetadataCatalog>,
    pub cross_reference: Arc<dyn MultiQueryCatalog>,
    pub compatibility: Arc<dyn CompatibilityService>,
    pub store: Arc<dyn LibraryStore>,
    pub preferences: Arc<dyn PreferencesStore>,
}

/// The library import pipeline
pub struct ImportPipeline {
    config: ImportConfig,
    identity: IdentityResolver,
    owned: OwnedLibraryFetcher,
    metadata: MetadataMatcher,
    cross_reference: CrossReferenceResolver,
    completion: CompletionTimeFetcher,
    compatibility: CompatibilityEnricher,
    commit: CommitStage,
    store: Arc<dyn LibraryStore>,
    preferences: Arc<dyn PreferencesStore>,
}

impl ImportPipeline {
    /// Build a pipeline over the given collaborators.
    ///
    /// Fails on incomplete configuration, before anything touches the network.
    pub fn new(config: ImportConfig, services: ImportServices) -> Result<Self, ImportError> {
        config.validate()?;

        let batching = &config.batching;
        let call_timeout = config.http.request_timeout();

        Ok(Self {
            identity: IdentityResolver::new(Arc::clone(&services.accounts)),
            owned: OwnedLibraryFetcher::new(services.accounts),
            metadata: MetadataMatcher::new(
                services.catalog,
                batching.metadata_concurrency,
                call_timeout,
            ),
            cross_reference: CrossReferenceResolver::new(
                Arc::clone(&services.cross_reference),
                batching.cross_reference_chunk_size,
                batching.pacing(),
            ),
            completion: CompletionTimeFetcher::new(
                services.cross_reference,
                batching.completion_time_chunk_size,
                batching.pacing(),
            ),
            compatibility: CompatibilityEnricher::new(
                services.compatibility,
                batching.compatibility_concurrency,
                call_timeout,
            ),
            commit: CommitStage::new(Arc::clone(&services.store)),
            store: services.store,
            preferences: services.preferences,
            config,
        })
    }

    /// Build a pipeline talking to Steam, RAWG, IGDB and ProtonDB over HTTP
    pub fn with_http_clients(
        config: ImportConfig,
        store: Arc<dyn LibraryStore>,
        preferences: Arc<dyn PreferencesStore>,
    ) -> Result<Self, ImportError> {
        config.validate()?;

        let http = build_http_client(&config.http)?;
        let creds = &config.credentials;
        let endpoints = &config.endpoints;

        let services = ImportServices {
            accounts: Arc::new(SteamClient::new(
                http.clone(),
                &endpoints.steam_api,
                &creds.steam_api_key,
            )),
            catalog: Arc::new(RawgClient::new(
                http.clone(),
                &endpoints.rawg_api,
                &creds.rawg_api_key,
            )),
            cross_reference: Arc::new(IgdbClient::new(
                http.clone(),
                &endpoints.igdb_api,
                &creds.igdb_client_id,
                &creds.igdb_access_token,
            )),
            compatibility: Arc::new(ProtonDbClient::new(http, &endpoints.protondb_api)),
            store,
            preferences,
        };

        Self::new(config, services)
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Run one import, bounded by the configured deadline if any
    pub async fn import_library(
        &self,
        owner: &str,
        request: &ImportRequest,
    ) -> Result<ImportReport, ImportError> {
        match self.config.http.import_deadline() {
            Some(deadline) => self.import_library_within(owner, request, deadline).await,
            None => {
                let prepared = self.prepare(owner, request).await?;
                self.finish(owner, prepared).await
            }
        }
    }

    /// Run one import, abandoning outstanding calls once `deadline` passes.
    ///
    /// The deadline covers every stage before the commit. Once the write has
    /// started it always runs to completion and its result is returned.
    pub async fn import_library_within(
        &self,
        owner: &str,
        request: &ImportRequest,
        deadline: Duration,
    ) -> Result<ImportReport, ImportError> {
        let prepared = tokio::time::timeout(deadline, self.prepare(owner, request))
            .await
            .map_err(|_| ImportError::Timeout(deadline))??;
        self.finish(owner, prepared).await
    }

    /// Stages 1-7 and record assembly; nothing is written
    async fn prepare(
        &self,
        owner: &str,
        request: &ImportRequest,
    ) -> Result<PreparedImport, ImportError> {
        let started = Instant::now();
        tracing::info!(
            "Starting {} import for {} from {}",
            request.mode,
            owner,
            request.account_identifier
        );

        let prefs = self.preferences.import_preferences(owner).await?;

        // Stages 1-2
        let account_id = self.identity.resolve(&request.account_identifier).await?;
        let owned = self.owned.fetch(&account_id).await?;

        // Stage 3
        let existing = match request.mode {
            ImportMode::New => self.store.records(owner).await?,
            ImportMode::Full => self.store.records_on_platform(owner, IMPORT_PLATFORM).await?,
        };
        let plan = reconcile(owned, request.mode, &existing);

        // Stage 4
        let names = distinct(plan.titles.iter().map(|t| t.name.as_str()));
        let (matches, metadata_gaps) = self.metadata.match_titles(names).await.into_parts();

        // Stage 5
        let canonical = distinct(matches.values().map(|m| m.canonical_name.as_str()));
        let (cross_refs, cross_ref_gaps) = self
            .cross_reference
            .resolve(&canonical)
            .await?
            .into_parts();

        // Stage 6
        let ids: BTreeSet<u64> = cross_refs.values().flatten().copied().collect();
        let (completion, completion_gaps) = self.completion.fetch(&ids).await?.into_parts();

        // Stage 7
        let pc_app_ids: Vec<u32> = plan
            .titles
            .iter()
            .filter(|t| matches.contains_key(&t.name))
            .map(|t| t.app_id)
            .collect();
        let (compatibility, compatibility_gaps) = self
            .compatibility
            .enrich(&pc_app_ids, prefs.check_deck_compatibility)
            .await
            .into_parts();

        let enrichment = EnrichmentSet {
            matches,
            cross_refs,
            completion,
            compatibility,
        };
        let records = CommitStage::assemble(&plan.titles, &enrichment);

        let report = ImportReport {
            account_id,
            unmatched: metadata_gaps.into_iter().map(|g| g.key).collect(),
            unresolved_cross_references: cross_ref_gaps.into_iter().map(|g| g.key).collect(),
            missing_completion_times: completion_gaps
                .iter()
                .filter_map(|g| g.key.parse().ok())
                .collect(),
            degraded_compatibility: compatibility_gaps
                .iter()
                .filter_map(|g| g.key.parse().ok())
                .collect(),
            ..Default::default()
        };

        Ok(PreparedImport {
            started,
            candidates: plan.titles.len(),
            delete_ids: plan.delete_ids,
            records,
            report,
        })
    }

    /// Stage 8: the single write, then the final counts
    async fn finish(
        &self,
        owner: &str,
        prepared: PreparedImport,
    ) -> Result<ImportReport, ImportError> {
        let (removed, imported) = self
            .commit
            .commit(owner, &prepared.delete_ids, &prepared.records)
            .await?;

        let report = ImportReport {
            imported,
            failed: prepared.candidates - imported,
            removed,
            ..prepared.report
        };

        tracing::info!(
            "Import for {} finished in {:?}: {} imported, {} failed",
            owner,
            prepared.started.elapsed(),
            report.imported,
            report.failed
        );
        Ok(report)
    }
}

/// Everything the commit needs, computed before any write
struct PreparedImport {
    started: Instant,
    /// Titles left after reconciliation
    candidates: usize,
    delete_ids: Vec<i64>,
    records: Vec<NewLibraryRecord>,
    /// Diagnostics; counts are filled in after the commit
    report: ImportReport,
}

/// Distinct values in first-seen order
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}
