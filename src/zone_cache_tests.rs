// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `zone_cache.rs`

use super::*;
use crate::models::{DomainConfig, Record};
use crate::providers::memory::{self, MemoryProvider, MemoryStore};
use crate::providers::none::{self, NoneProvider};
use crate::providers::{DnsProvider, ZoneCorrections, ZoneLister};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::task::JoinSet;

/// Policy without retries, so failures surface on the first call.
fn no_retry() -> CallPolicy {
    CallPolicy {
        retry_max_elapsed: Duration::ZERO,
        ..CallPolicy::default()
    }
}

fn instance(name: &str, driver: Arc<dyn DnsProvider>) -> ProviderInstance {
    ProviderInstance {
        name: name.to_string(),
        provider_type: "TEST".to_string(),
        driver,
        is_default: true,
        capabilities: memory::capabilities(),
        nameserver_count: -1,
    }
}

/// Lister that fails on its first call.
#[derive(Default)]
struct FlakyLister {
    calls: AtomicUsize,
}

#[async_trait]
impl DnsProvider for FlakyLister {
    async fn get_nameservers(&self, _domain: &str) -> Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }

    async fn get_zone_records(
        &self,
        _domain: &str,
        _meta: &BTreeMap<String, String>,
    ) -> Result<Vec<Record>, ProviderError> {
        Ok(Vec::new())
    }

    async fn get_zone_corrections(
        &self,
        _zone: &mut DomainConfig,
        _existing: Vec<Record>,
    ) -> anyhow::Result<ZoneCorrections> {
        Ok(ZoneCorrections::default())
    }

    fn as_zone_lister(&self) -> Option<&dyn ZoneLister> {
        Some(self)
    }
}

#[async_trait]
impl ZoneLister for FlakyLister {
    async fn list_zones(&self) -> Result<Vec<String>, ProviderError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(ProviderError::Transient {
                provider: "flaky".to_string(),
                operation: "list_zones".to_string(),
                reason: "connection reset".to_string(),
            });
        }
        Ok(vec!["Example.COM.".to_string()])
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_readers_list_once() {
    let store = MemoryStore::default();
    store.put_zone("example.com", Vec::new()).await;
    let provider = instance("mem", Arc::new(MemoryProvider::new("mem", store.clone(), vec![])));
    let cache = ZoneCache::new();

    let mut tasks = JoinSet::new();
    for _ in 0..32 {
        let cache = cache.clone();
        let provider = provider.clone();
        tasks.spawn(async move { cache.has_zone(&provider, "example.com", &no_retry()).await });
    }
    while let Some(joined) = tasks.join_next().await {
        assert!(joined.unwrap().unwrap());
    }

    assert_eq!(store.list_zone_calls(), 1);
}

#[tokio::test]
async fn test_errors_are_not_cached() {
    let flaky = Arc::new(FlakyLister::default());
    let provider = instance("flaky", flaky.clone());
    let cache = ZoneCache::new();

    assert!(cache.zones(&provider, &no_retry()).await.is_err());
    assert!(cache.has_zone(&provider, "example.com", &no_retry()).await.unwrap());
    assert!(cache.has_zone(&provider, "example.com.", &no_retry()).await.unwrap());
    assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalidate_requeries() {
    let store = MemoryStore::default();
    let provider = instance("mem", Arc::new(MemoryProvider::new("mem", store.clone(), vec![])));
    let cache = ZoneCache::new();

    assert!(!cache.has_zone(&provider, "example.com", &no_retry()).await.unwrap());
    store.put_zone("example.com", Vec::new()).await;
    assert!(!cache.has_zone(&provider, "example.com", &no_retry()).await.unwrap());

    cache.invalidate("mem");
    assert!(cache.has_zone(&provider, "example.com", &no_retry()).await.unwrap());
    assert_eq!(store.list_zone_calls(), 2);
}

#[tokio::test]
async fn test_unsupported_without_lister() {
    let provider = ProviderInstance {
        capabilities: none::capabilities(),
        ..instance("none", Arc::new(NoneProvider))
    };
    let err = ZoneCache::new().zones(&provider, &no_retry()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Unsupported { .. }));
}
