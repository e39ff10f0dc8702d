//! Record assembly and the single commit write

use questlog_library::{CompatibilityTier, GameList, LibraryStore, NewLibraryRecord};
use std::collections::HashMap;
use std::sync::Arc;

use crate::reconcile::IMPORT_PLATFORM;
use crate::{CatalogMatch, CompletionTime, ImportError, OwnedTitle};

/// Everything the enrichment stages produced
#[derive(Debug, Clone, Default)]
pub struct EnrichmentSet {
    /// Catalog matches keyed by owned title name
    pub matches: HashMap<String, CatalogMatch>,
    /// IGDB IDs keyed by canonical name
    pub cross_refs: HashMap<String, Option<u64>>,
    /// Time-to-beat keyed by IGDB ID
    pub completion: HashMap<u64, CompletionTime>,
    /// Tiers keyed by Steam app ID
    pub compatibility: HashMap<u32, CompatibilityTier>,
}

impl EnrichmentSet {
    fn completion_for(&self, canonical_name: &str) -> Option<&CompletionTime> {
        let id = self.cross_refs.get(canonical_name).copied().flatten()?;
        self.completion.get(&id)
    }
}

/// Steam playtime in hours; zero minutes means never played, not zero hours
pub fn minutes_to_hours(minutes: u32) -> Option<u32> {
    if minutes == 0 {
        return None;
    }
    Some((minutes.saturating_add(30) / 60).max(1))
}

/// Completion time, then catalog hint, then Steam playtime
pub fn estimate_playtime_hours(
    completion: Option<&CompletionTime>,
    catalog_hint: Option<u32>,
    owned_minutes: u32,
) -> Option<u32> {
    completion
        .and_then(CompletionTime::best_estimate)
        .or(catalog_hint)
        .or_else(|| minutes_to_hours(owned_minutes))
}

/// Builds records and writes them in one transaction
pub struct CommitStage {
    store: Arc<dyn LibraryStore>,
}

impl CommitStage {
    pub fn new(store: Arc<dyn LibraryStore>) -> Self {
        Self { store }
    }

    /// One record per owned title with a catalog match, in input order
    pub fn assemble(titles: &[OwnedTitle], enrichment: &EnrichmentSet) -> Vec<NewLibraryRecord> {
        titles
            .iter()
            .filter_map(|title| {
                let found = enrichment.matches.get(&title.name)?;
                let completion = enrichment.completion_for(&found.canonical_name);

                Some(NewLibraryRecord {
                    title: found.canonical_name.clone(),
                    platform: IMPORT_PLATFORM,
                    genres: found.genres.clone(),
                    list: GameList::Backlog,
                    cover_image_url: found.cover_image_url.clone(),
                    release_date: found.release_date.clone(),
                    estimated_playtime_hours: estimate_playtime_hours(
                        completion,
                        found.playtime_hours_hint,
                        title.playtime_minutes,
                    ),
                    external_app_id: Some(title.app_id),
                    compatibility: enrichment
                        .compatibility
                        .get(&title.app_id)
                        .copied()
                        .unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Delete `delete_ids` and create `records` atomically.
    ///
    /// Returns (removed, imported).
    pub async fn commit(
        &self,
        owner: &str,
        delete_ids: &[i64],
        records: &[NewLibraryRecord],
    ) -> Result<(usize, usize), ImportError> {
        let (removed, created) = self
            .store
            .replace_records(owner, delete_ids, records)
            .await?;

        tracing::info!(
            "Committed {} records for {} ({} replaced)",
            created.len(),
            owner,
            removed
        );
        Ok((removed, created.len()))
    }
}
