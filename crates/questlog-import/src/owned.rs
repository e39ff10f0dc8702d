//! Owned-library fetching

use std::collections::HashSet;
use std::sync::Arc;

use crate::{ImportError, OwnedTitle, PlatformAccounts};

/// Fetches the games a Steam account owns
pub struct OwnedLibraryFetcher {
    accounts: Arc<dyn PlatformAccounts>,
}

impl OwnedLibraryFetcher {
    pub fn new(accounts: Arc<dyn PlatformAccounts>) -> Self {
        Self { accounts }
    }

    /// Owned titles, one per app ID, in upstream order
    pub async fn fetch(&self, account_id: &str) -> Result<Vec<OwnedTitle>, ImportError> {
        let titles = self
            .accounts
            .owned_titles(account_id)
            .await
            .map_err(|e| ImportError::LibraryFetch(e.to_string()))?;

        let total = titles.len();
        let titles = dedupe_by_app_id(titles);
        if titles.len() < total {
            tracing::debug!(
                "Collapsed {} duplicate app IDs for {}",
                total - titles.len(),
                account_id
            );
        }

        tracing::info!("Account {} owns {} titles", account_id, titles.len());
        Ok(titles)
    }
}

fn dedupe_by_app_id(titles: Vec<OwnedTitle>) -> Vec<OwnedTitle> {
    let mut seen = HashSet::new();
    titles
        .into_iter()
        .filter(|title| seen.insert(title.app_id))
        .collect()
}
