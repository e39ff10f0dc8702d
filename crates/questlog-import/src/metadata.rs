//! Bulk metadata matching against the catalog

use futures_util::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::{CatalogMatch, Gap, MetadataCatalog, StageOutcome};

/// Resolves raw titles to catalog metadata with bounded concurrency
pub struct MetadataMatcher {
    catalog: Arc<dyn MetadataCatalog>,
    concurrency: usize,
    call_timeout: Duration,
}

impl MetadataMatcher {
    pub fn new(catalog: Arc<dyn MetadataCatalog>, concurrency: usize, call_timeout: Duration) -> Self {
        Self {
            catalog,
            concurrency: concurrency.max(1),
            call_timeout,
        }
    }

    /// Match each distinct title; misses and failures become gaps.
    ///
    /// No title is retried, and one slow search only holds its own slot
    /// until `call_timeout`.
    pub async fn match_titles(&self, titles: Vec<String>) -> StageOutcome<HashMap<String, CatalogMatch>> {
        let requested = titles.len();
        let catalog = &self.catalog;
        let call_timeout = self.call_timeout;

        // Nameless titles have nothing to search for
        let (blank, titles): (Vec<String>, Vec<String>) =
            titles.into_iter().partition(|title| title.trim().is_empty());

        let results: Vec<_> = stream::iter(titles)
            .map(|title| async move {
                let result = tokio::time::timeout(call_timeout, catalog.search(&title)).await;
                (title, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut matches = HashMap::with_capacity(results.len());
        let mut gaps: Vec<Gap> = blank.into_iter().map(Gap::no_match).collect();

        for (title, result) in results {
            match result {
                Ok(Ok(Some(found))) => {
                    tracing::debug!("Matched {} -> {}", title, found.canonical_name);
                    matches.insert(title, found);
                }
                Ok(Ok(None)) => {
                    tracing::debug!("No catalog match for {}", title);
                    gaps.push(Gap::no_match(title));
                }
                Ok(Err(e)) => {
                    tracing::warn!("Catalog search for {} failed: {}", title, e);
                    gaps.push(Gap::failed(title, e.to_string()));
                }
                Err(_) => {
                    tracing::warn!("Catalog search for {} timed out after {:?}", title, call_timeout);
                    gaps.push(Gap::failed(title, format!("timed out after {:?}", call_timeout)));
                }
            }
        }

        tracing::info!("Metadata: matched {} of {} titles", matches.len(), requested);
        StageOutcome::from_parts(matches, gaps)
    }
}
