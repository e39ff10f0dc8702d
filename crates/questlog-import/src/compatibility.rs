//! Handheld compatibility enrichment

use futures_util::stream::{self, StreamExt};
use questlog_library::CompatibilityTier;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::{CompatibilityService, Gap, StageOutcome};

/// Map a vendor tier onto the five stored tiers.
///
/// Accepts both the Steam Deck vocabulary and ProtonDB's medals.
pub fn map_vendor_tier(tier: Option<&str>) -> CompatibilityTier {
    let Some(tier) = tier else {
        return CompatibilityTier::Unknown;
    };

    match tier.trim().to_ascii_lowercase().as_str() {
        "verified" | "native" | "platinum" => CompatibilityTier::Verified,
        "playable" | "gold" | "silver" => CompatibilityTier::Playable,
        "unsupported" | "bronze" => CompatibilityTier::Unsupported,
        "borked" => CompatibilityTier::Borked,
        _ => CompatibilityTier::Unknown,
    }
}

/// Looks up compatibility per app ID, concurrently
pub struct CompatibilityEnricher {
    service: Arc<dyn CompatibilityService>,
    concurrency: usize,
    call_timeout: Duration,
}

impl CompatibilityEnricher {
    pub fn new(
        service: Arc<dyn CompatibilityService>,
        concurrency: usize,
        call_timeout: Duration,
    ) -> Self {
        Self {
            service,
            concurrency: concurrency.max(1),
            call_timeout,
        }
    }

    /// Tier per app ID.
    ///
    /// With `enabled` false no request is made and every title stays
    /// `Unknown`. Failed lookups degrade to `Unknown` and become gaps.
    pub async fn enrich(
        &self,
        app_ids: &[u32],
        enabled: bool,
    ) -> StageOutcome<HashMap<u32, CompatibilityTier>> {
        if !enabled {
            tracing::debug!("Compatibility checks disabled for this account");
            let tiers = app_ids
                .iter()
                .map(|&id| (id, CompatibilityTier::Unknown))
                .collect();
            return StageOutcome::Complete(tiers);
        }

        let service = &self.service;
        let call_timeout = self.call_timeout;

        let results: Vec<_> = stream::iter(app_ids.iter().copied())
            .map(|app_id| async move {
                let result = tokio::time::timeout(call_timeout, service.tier(app_id)).await;
                (app_id, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut tiers = HashMap::with_capacity(results.len());
        let mut gaps = Vec::new();

        for (app_id, result) in results {
            let tier = match result {
                Ok(Ok(vendor)) => map_vendor_tier(vendor.as_deref()),
                Ok(Err(e)) => {
                    tracing::warn!("Compatibility lookup for {} failed: {}", app_id, e);
                    gaps.push(Gap::failed(app_id.to_string(), e.to_string()));
                    CompatibilityTier::Unknown
                }
                Err(_) => {
                    tracing::warn!("Compatibility lookup for {} timed out", app_id);
                    gaps.push(Gap::failed(
                        app_id.to_string(),
                        format!("timed out after {:?}", call_timeout),
                    ));
                    CompatibilityTier::Unknown
                }
            };
            tiers.insert(app_id, tier);
        }

        tracing::info!(
            "Compatibility: rated {} titles, {} lookups degraded",
            tiers.len(),
            gaps.len()
        );
        StageOutcome::from_parts(tiers, gaps)
    }
}
