//! Reconciliation of owned titles against stored records

use questlog_library::{LibraryRecord, Platform};
use std::collections::HashSet;

use crate::{ImportMode, OwnedTitle};

/// Platform every Steam import lands on
pub const IMPORT_PLATFORM: Platform = Platform::Pc;

/// What survives reconciliation, and what the commit must remove first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub titles: Vec<OwnedTitle>,
    /// Stored records deleted in the same write as the new ones
    pub delete_ids: Vec<i64>,
}

/// Filter owned titles against the existing partition.
///
/// `existing` is the full partition for NEW and the import platform's
/// records for FULL; records on other platforms are never scheduled for
/// deletion either way.
pub fn reconcile(
    owned: Vec<OwnedTitle>,
    mode: ImportMode,
    existing: &[LibraryRecord],
) -> ReconcilePlan {
    match mode {
        ImportMode::New => {
            let known: HashSet<u32> = existing
                .iter()
                .filter_map(|record| record.external_app_id)
                .collect();

            let total = owned.len();
            let titles: Vec<OwnedTitle> = owned
                .into_iter()
                .filter(|title| !known.contains(&title.app_id))
                .collect();

            tracing::info!(
                "NEW import: {} of {} owned titles are not in the library yet",
                titles.len(),
                total
            );

            ReconcilePlan {
                titles,
                delete_ids: Vec::new(),
            }
        }
        ImportMode::Full => {
            let delete_ids: Vec<i64> = existing
                .iter()
                .filter(|record| record.platform == IMPORT_PLATFORM)
                .map(|record| record.id)
                .collect();

            tracing::info!(
                "FULL import: replacing {} stored {} records",
                delete_ids.len(),
                IMPORT_PLATFORM
            );

            ReconcilePlan {
                titles: owned,
                delete_ids,
            }
        }
    }
}
