// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `INMEMORY` provider: zones held in process memory.
//!
//! Implements every optional operation (list, create and delete zones, plus a
//! registrar role), which makes it the reference driver for dry runs and for
//! the engine's own tests.
//!
//! # Configuration
//!
//! | key           | meaning                                          |
//! |---------------|--------------------------------------------------|
//! | `nameservers` | comma-separated names returned by nameserver calls |
//! | `zones`       | comma-separated zones that exist at startup      |
//! | `diff_mode`   | `record` (default) or `recordset`                |

use super::{
    Capability, CapabilitySet, DnsProvider, ProviderConfig, Registrar, ZoneCorrections,
    ZoneCreator, ZoneDeleter, ZoneLister,
};
use crate::diff::{self, DiffOptions};
use crate::errors::ProviderError;
use crate::models::{canonical_name, canonical_zone, Correction, DomainConfig, Record};
use anyhow::bail;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

const CONFIG_NAMESERVERS: &str = "nameservers";
const CONFIG_ZONES: &str = "zones";
const CONFIG_DIFF_MODE: &str = "diff_mode";

#[derive(Debug, Default)]
struct StoreState {
    zones: BTreeMap<String, Vec<Record>>,
    delegations: BTreeMap<String, Vec<String>>,
}

/// Shared zone storage. Cloning shares the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
    list_calls: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Create or replace a zone with the given records.
    pub async fn put_zone(&self, name: &str, records: Vec<Record>) {
        self.state
            .lock()
            .await
            .zones
            .insert(canonical_zone(name), records);
    }

    /// Records of a zone, `None` if the zone does not exist.
    pub async fn records(&self, name: &str) -> Option<Vec<Record>> {
        self.state
            .lock()
            .await
            .zones
            .get(&canonical_zone(name))
            .cloned()
    }

    /// Names of all zones, sorted.
    pub async fn zone_names(&self) -> Vec<String> {
        self.state.lock().await.zones.keys().cloned().collect()
    }

    /// Nameservers the registrar currently delegates `name` to.
    pub async fn delegation(&self, name: &str) -> Vec<String> {
        self.state
            .lock()
            .await
            .delegations
            .get(&canonical_zone(name))
            .cloned()
            .unwrap_or_default()
    }

    pub async fn set_delegation(&self, name: &str, nameservers: Vec<String>) {
        self.state
            .lock()
            .await
            .delegations
            .insert(canonical_zone(name), nameservers);
    }

    /// How many times the zone list was requested.
    #[must_use]
    pub fn list_zone_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    async fn apply(
        &self,
        provider: &str,
        zone: &str,
        old: &[Record],
        new: Vec<Record>,
    ) -> Result<(), ProviderError> {
        let mut state = self.state.lock().await;
        let records = state
            .zones
            .get_mut(&canonical_zone(zone))
            .ok_or_else(|| ProviderError::Permanent {
                provider: provider.to_string(),
                operation: "apply".to_string(),
                reason: format!("zone '{zone}' does not exist"),
            })?;
        for gone in old {
            if let Some(pos) = records.iter().position(|r| r == gone) {
                records.remove(pos);
            }
        }
        records.extend(new);
        Ok(())
    }
}

/// Capabilities of the in-memory driver: everything.
#[must_use]
pub fn capabilities() -> CapabilitySet {
    CapabilitySet::new([
        Capability::CanGetZones,
        Capability::CanConcur,
        Capability::CanUseAlias,
        Capability::CanUseCaa,
        Capability::CanUseDnskey,
        Capability::CanUseDs,
        Capability::CanUseHttps,
        Capability::CanUseLoc,
        Capability::CanUseNaptr,
        Capability::CanUsePtr,
        Capability::CanUseSrv,
        Capability::CanUseSshfp,
        Capability::CanUseSvcb,
        Capability::CanUseTlsa,
        Capability::CanUseTxtMulti,
        Capability::CanModifyApexNs,
        Capability::DocDualHost,
        Capability::DocCreateDomains,
    ])
}

/// # Errors
///
/// Returns an error if the configuration is invalid.
pub fn new_dns(name: &str, config: &ProviderConfig) -> anyhow::Result<Arc<dyn DnsProvider>> {
    Ok(Arc::new(MemoryProvider::from_config(name, config)?))
}

/// # Errors
///
/// Never fails.
pub fn new_registrar(_name: &str, _config: &ProviderConfig) -> anyhow::Result<Arc<dyn Registrar>> {
    Ok(Arc::new(MemoryRegistrar::new(MemoryStore::default())))
}

fn comma_list(value: Option<&String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Metadata projection: proxy, comment and tags take part in equality.
fn comparable_meta(record: &Record) -> String {
    let mut parts = Vec::new();
    if let Some(proxy) = record.meta.proxy {
        parts.push(format!("proxy={proxy}"));
    }
    if let Some(comment) = &record.meta.comment {
        parts.push(format!("comment={comment}"));
    }
    if !record.meta.tags.is_empty() {
        parts.push(format!("tags={}", record.meta.tags.join(",")));
    }
    parts.join(" ")
}

/// The in-memory DNS driver.
#[derive(Debug, Clone)]
pub struct MemoryProvider {
    name: String,
    store: MemoryStore,
    nameservers: Vec<String>,
    by_record_set: bool,
}

impl MemoryProvider {
    #[must_use]
    pub fn new(name: &str, store: MemoryStore, nameservers: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            store,
            nameservers: nameservers.iter().map(|n| canonical_name(n)).collect(),
            by_record_set: false,
        }
    }

    /// Diff by RRset instead of by record.
    #[must_use]
    pub fn with_record_sets(mut self) -> Self {
        self.by_record_set = true;
        self
    }

    /// Build from a credentials entry.
    ///
    /// # Errors
    ///
    /// Returns an error on an unknown `diff_mode`.
    pub fn from_config(name: &str, config: &ProviderConfig) -> anyhow::Result<Self> {
        let mut state = StoreState::default();
        for zone in comma_list(config.get(CONFIG_ZONES)) {
            state.zones.insert(canonical_zone(&zone), Vec::new());
        }
        let store = MemoryStore {
            state: Arc::new(Mutex::new(state)),
            list_calls: Arc::default(),
        };

        let provider = Self::new(name, store, comma_list(config.get(CONFIG_NAMESERVERS)));
        match config.get(CONFIG_DIFF_MODE).map(String::as_str) {
            None | Some("record") => Ok(provider),
            Some("recordset") => Ok(provider.with_record_sets()),
            Some(other) => bail!("Provider '{name}': unknown diff_mode '{other}'"),
        }
    }

    /// Handle on the backing store.
    #[must_use]
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

#[async_trait]
impl DnsProvider for MemoryProvider {
    async fn get_nameservers(&self, _domain: &str) -> Result<Vec<String>, ProviderError> {
        Ok(self.nameservers.clone())
    }

    async fn get_zone_records(
        &self,
        domain: &str,
        _meta: &BTreeMap<String, String>,
    ) -> Result<Vec<Record>, ProviderError> {
        Ok(self.store.records(domain).await.unwrap_or_default())
    }

    async fn get_zone_corrections(
        &self,
        zone: &mut DomainConfig,
        existing: Vec<Record>,
    ) -> anyhow::Result<ZoneCorrections> {
        let opts = DiffOptions {
            comparable: Some(Arc::new(comparable_meta)),
            ..Default::default()
        };
        let changes = if self.by_record_set {
            diff::by_record_set(&existing, zone, &opts)?
        } else {
            diff::by_record(&existing, zone, &opts)?
        };

        let mut corrections: Vec<Correction> =
            changes.reports.into_iter().map(Correction::report).collect();
        for instruction in changes.instructions {
            let store = self.store.clone();
            let provider = self.name.clone();
            let domain = zone.name.clone();
            let msg = instruction.msg();
            corrections.push(Correction::with_action(msg, async move {
                store
                    .apply(&provider, &domain, &instruction.old, instruction.new)
                    .await?;
                Ok(())
            }));
        }

        debug!(
            provider = %self.name,
            zone = %zone.name,
            corrections = corrections.len(),
            "Planned in-memory corrections"
        );

        Ok(ZoneCorrections {
            corrections,
            actual_change_count: changes.change_count,
        })
    }

    fn as_zone_lister(&self) -> Option<&dyn ZoneLister> {
        Some(self)
    }

    fn as_zone_creator(&self) -> Option<&dyn ZoneCreator> {
        Some(self)
    }

    fn as_zone_deleter(&self) -> Option<&dyn ZoneDeleter> {
        Some(self)
    }
}

#[async_trait]
impl ZoneLister for MemoryProvider {
    async fn list_zones(&self) -> Result<Vec<String>, ProviderError> {
        self.store.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.store.zone_names().await)
    }
}

#[async_trait]
impl ZoneCreator for MemoryProvider {
    async fn ensure_zone_exists(&self, domain: &str) -> Result<(), ProviderError> {
        let mut state = self.store.state.lock().await;
        let key = canonical_zone(domain);
        if !state.zones.contains_key(&key) {
            info!(provider = %self.name, zone = %key, "Created in-memory zone");
            state.zones.insert(key, Vec::new());
        }
        Ok(())
    }
}

#[async_trait]
impl ZoneDeleter for MemoryProvider {
    async fn delete_zone(&self, domain: &str) -> Result<(), ProviderError> {
        let removed = self
            .store
            .state
            .lock()
            .await
            .zones
            .remove(&canonical_zone(domain));
        if removed.is_none() {
            return Err(ProviderError::Permanent {
                provider: self.name.clone(),
                operation: "delete_zone".to_string(),
                reason: format!("zone '{domain}' does not exist"),
            });
        }
        info!(provider = %self.name, zone = %domain, "Deleted in-memory zone");
        Ok(())
    }
}

/// Registrar role backed by a [`MemoryStore`]'s delegation table.
#[derive(Debug, Clone)]
pub struct MemoryRegistrar {
    store: MemoryStore,
}

impl MemoryRegistrar {
    #[must_use]
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

fn display_names(names: &[String]) -> String {
    names
        .iter()
        .map(|n| n.trim_end_matches('.'))
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl Registrar for MemoryRegistrar {
    async fn get_registrar_corrections(
        &self,
        zone: &DomainConfig,
    ) -> anyhow::Result<Vec<Correction>> {
        let mut current: Vec<String> = self
            .store
            .delegation(&zone.name)
            .await
            .iter()
            .map(|n| canonical_name(n))
            .collect();
        current.sort();
        let mut desired: Vec<String> = zone.nameservers.iter().map(|n| canonical_name(n)).collect();
        desired.sort();
        desired.dedup();

        if current == desired {
            return Ok(Vec::new());
        }

        let msg = format!(
            "Update nameservers {} -> {}",
            display_names(&current),
            display_names(&desired)
        );
        let store = self.store.clone();
        let domain = zone.name.clone();
        Ok(vec![Correction::with_action(msg, async move {
            store.set_delegation(&domain, desired).await;
            Ok(())
        })])
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod memory_tests;
