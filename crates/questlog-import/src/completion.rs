//! IGDB time-to-beat fetching
//!
//! Same chunking and pacing discipline as the cross-reference stage: one
//! multi-query request per chunk of IDs, never two chunks in flight.

use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use crate::multiquery::{chunk_count, index_results};
use crate::{CompletionTime, Gap, ImportError, MultiQueryCatalog, QueryFilter, StageOutcome, SubQuery};

const TIME_TO_BEAT_FIELDS: &[&str] = &["game_id", "normally", "completely"];

/// Round seconds to the nearest whole hour
pub fn seconds_to_hours(seconds: u64) -> u32 {
    let hours = seconds.saturating_add(1800) / 3600;
    u32::try_from(hours).unwrap_or(u32::MAX)
}

fn query_name(id: u64) -> String {
    format!("ttb_{}", id)
}

fn hours_field(row: &Value, field: &str) -> Option<u32> {
    row.get(field).and_then(Value::as_u64).map(seconds_to_hours)
}

/// Fetches completion-time estimates for IGDB game IDs
pub struct CompletionTimeFetcher {
    catalog: Arc<dyn MultiQueryCatalog>,
    chunk_size: usize,
    pacing: Duration,
}

impl CompletionTimeFetcher {
    pub fn new(catalog: Arc<dyn MultiQueryCatalog>, chunk_size: usize, pacing: Duration) -> Self {
        Self {
            catalog,
            chunk_size: chunk_size.max(1),
            pacing,
        }
    }

    /// Completion times by ID; IDs without data become gaps.
    ///
    /// A non-success response for any chunk fails the whole stage.
    pub async fn fetch(
        &self,
        ids: &BTreeSet<u64>,
    ) -> Result<StageOutcome<HashMap<u64, CompletionTime>>, ImportError> {
        let ids: Vec<u64> = ids.iter().copied().collect();
        let total_chunks = chunk_count(ids.len(), self.chunk_size);
        let mut times = HashMap::with_capacity(ids.len());
        let mut gaps = Vec::new();

        for (index, chunk) in ids.chunks(self.chunk_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.pacing).await;
            }

            let queries: Vec<SubQuery> = chunk
                .iter()
                .map(|&id| SubQuery {
                    name: query_name(id),
                    resource: "game_time_to_beats",
                    fields: TIME_TO_BEAT_FIELDS,
                    filter: QueryFilter::FieldEquals {
                        field: "game_id",
                        value: id,
                    },
                    limit: 1,
                })
                .collect();

            tracing::debug!(
                "Completion-time chunk {}/{} ({} IDs)",
                index + 1,
                total_chunks,
                queries.len()
            );

            let results = self.catalog.multiquery(&queries).await.map_err(|e| {
                ImportError::CompletionTime(format!(
                    "chunk {}/{} failed: {}",
                    index + 1,
                    total_chunks,
                    e
                ))
            })?;
            let mut by_name = index_results(results);

            for &id in chunk {
                let time = by_name
                    .remove(&query_name(id))
                    .and_then(|rows| rows.into_iter().next())
                    .map(|row| CompletionTime {
                        normally_hours: hours_field(&row, "normally"),
                        completely_hours: hours_field(&row, "completely"),
                    })
                    .filter(|time| time.best_estimate().is_some());

                match time {
                    Some(time) => {
                        times.insert(id, time);
                    }
                    None => gaps.push(Gap::no_match(id.to_string())),
                }
            }
        }

        tracing::info!(
            "Completion time: {} of {} IDs have data ({} requests)",
            times.len(),
            ids.len(),
            total_chunks
        );
        Ok(StageOutcome::from_parts(times, gaps))
    }
}
