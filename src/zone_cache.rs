// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-run cache of provider zone lists.
//!
//! Each provider name gets its own one-shot cell, so concurrent readers of
//! different providers never wait on each other and concurrent readers of the
//! same provider share a single `list_zones` call. A failed call leaves the
//! cell empty and the next reader retries. Nothing is persisted.

use crate::errors::ProviderError;
use crate::models::canonical_zone;
use crate::providers::ProviderInstance;
use crate::reconcilers::retry::CallPolicy;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::debug;

type ZoneSet = Arc<BTreeSet<String>>;

/// Zone lists keyed by provider instance name.
#[derive(Debug, Default, Clone)]
pub struct ZoneCache {
    cells: Arc<Mutex<HashMap<String, Arc<OnceCell<ZoneSet>>>>>,
}

impl ZoneCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, provider: &str) -> Arc<OnceCell<ZoneSet>> {
        // The map lock is held only long enough to fetch or insert a cell.
        let mut cells = self
            .cells
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(cells.entry(provider.to_string()).or_default())
    }

    /// Zones at `provider`, canonicalized, fetched at most once per run.
    ///
    /// The fetch is retried under `policy` like any other provider read.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unsupported`] if the driver cannot list zones,
    /// or the driver's error. Errors are not cached.
    pub async fn zones(
        &self,
        provider: &ProviderInstance,
        policy: &CallPolicy,
    ) -> Result<ZoneSet, ProviderError> {
        let lister = provider
            .driver
            .as_zone_lister()
            .ok_or_else(|| ProviderError::Unsupported {
                provider: provider.name.clone(),
                operation: "list_zones".to_string(),
            })?;

        let cell = self.cell(&provider.name);
        let zones = cell
            .get_or_try_init(|| async {
                debug!(provider = %provider.name, "Listing zones");
                let zones = policy
                    .read(&provider.name, "list_zones", || lister.list_zones())
                    .await?;
                Ok::<_, ProviderError>(Arc::new(
                    zones.iter().map(|z| canonical_zone(z)).collect::<BTreeSet<_>>(),
                ))
            })
            .await?;
        Ok(Arc::clone(zones))
    }

    /// True if `zone` exists at `provider`.
    ///
    /// # Errors
    ///
    /// Same as [`ZoneCache::zones`].
    pub async fn has_zone(
        &self,
        provider: &ProviderInstance,
        zone: &str,
        policy: &CallPolicy,
    ) -> Result<bool, ProviderError> {
        Ok(self
            .zones(provider, policy)
            .await?
            .contains(&canonical_zone(zone)))
    }

    /// Drop the cached list for `provider`; the next reader re-queries.
    pub fn invalidate(&self, provider: &str) {
        let mut cells = self
            .cells
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if cells.remove(provider).is_some() {
            debug!(provider = %provider, "Invalidated cached zone list");
        }
    }
}

#[cfg(test)]
#[path = "zone_cache_tests.rs"]
mod zone_cache_tests;
