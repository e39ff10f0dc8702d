//! IGDB cross-reference ID resolution
//!
//! Canonical names are sent in fixed-size chunks, one multi-query request
//! per chunk. Chunks are strictly sequential with a pacing pause between
//! them; IGDB throttles anything faster.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::multiquery::{QueryKeys, chunk_count, index_results};
use crate::{Gap, ImportError, MultiQueryCatalog, QueryFilter, StageOutcome, SubQuery};

const GAME_FIELDS: &[&str] = &["id", "name"];

/// Resolves canonical names to IGDB game IDs
pub struct CrossReferenceResolver {
    catalog: Arc<dyn MultiQueryCatalog>,
    chunk_size: usize,
    pacing: Duration,
}

impl CrossReferenceResolver {
    pub fn new(catalog: Arc<dyn MultiQueryCatalog>, chunk_size: usize, pacing: Duration) -> Self {
        Self {
            catalog,
            chunk_size: chunk_size.max(1),
            pacing,
        }
    }

    /// Map every name to its top IGDB match, `None` when IGDB has none.
    ///
    /// A non-success response for any chunk fails the whole stage.
    pub async fn resolve(
        &self,
        names: &[String],
    ) -> Result<StageOutcome<HashMap<String, Option<u64>>>, ImportError> {
        let total_chunks = chunk_count(names.len(), self.chunk_size);
        let mut resolved = HashMap::with_capacity(names.len());
        let mut gaps = Vec::new();

        for (index, chunk) in names.chunks(self.chunk_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.pacing).await;
            }

            let mut keys = QueryKeys::new();
            let tagged: Vec<(String, &String)> = chunk
                .iter()
                .map(|name| (keys.allocate(name), name))
                .collect();

            let queries: Vec<SubQuery> = tagged
                .iter()
                .map(|(key, name)| SubQuery {
                    name: key.clone(),
                    resource: "games",
                    fields: GAME_FIELDS,
                    filter: QueryFilter::Search((*name).clone()),
                    limit: 1,
                })
                .collect();

            tracing::debug!(
                "Cross-reference chunk {}/{} ({} titles)",
                index + 1,
                total_chunks,
                queries.len()
            );

            let results = self.catalog.multiquery(&queries).await.map_err(|e| {
                ImportError::CrossReference(format!(
                    "chunk {}/{} failed: {}",
                    index + 1,
                    total_chunks,
                    e
                ))
            })?;
            let mut by_key = index_results(results);

            for (key, name) in tagged {
                let id = by_key.remove(&key).and_then(|rows| {
                    rows.first()
                        .and_then(|row| row.get("id"))
                        .and_then(|id| id.as_u64())
                });

                if id.is_none() {
                    gaps.push(Gap::no_match(name.clone()));
                }
                resolved.insert(name.clone(), id);
            }
        }

        tracing::info!(
            "Cross-reference: resolved {} of {} titles in {} requests",
            names.len() - gaps.len(),
            names.len(),
            total_chunks
        );
        Ok(StageOutcome::from_parts(resolved, gaps))
    }
}
