// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `populate.rs`

use super::*;
use crate::providers::memory::{self, MemoryProvider, MemoryStore};
use crate::providers::none::{self, NoneProvider};
use crate::providers::DnsProvider;

fn instance(name: &str, driver: Arc<dyn DnsProvider>) -> ProviderInstance {
    ProviderInstance {
        name: name.to_string(),
        provider_type: "INMEMORY".to_string(),
        driver,
        is_default: true,
        capabilities: memory::capabilities(),
        nameserver_count: -1,
    }
}

fn zone(name: &str) -> DomainConfig {
    DomainConfig {
        name: name.to_string(),
        unique_name: name.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_populate_creates_and_invalidates() {
    let store = MemoryStore::default();
    let provider = instance("mem", Arc::new(MemoryProvider::new("mem", store.clone(), vec![])));
    let cache = ZoneCache::new();
    let policy = CallPolicy::default();

    let mut corrections =
        populate_corrections(&provider, &zone("example.com"), &cache, &policy, false)
            .await
            .unwrap();
    assert_eq!(corrections.len(), 1);
    assert_eq!(
        corrections[0].msg,
        "Ensuring zone \"example.com\" exists at \"mem\""
    );

    corrections[0].execute().await.unwrap().unwrap();

    assert!(cache.has_zone(&provider, "example.com", &policy).await.unwrap());
    assert_eq!(store.list_zone_calls(), 2);
    assert!(populate_corrections(&provider, &zone("example.com"), &cache, &policy, false)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_populate_preview_only_reports() {
    let store = MemoryStore::default();
    let provider = instance("mem", Arc::new(MemoryProvider::new("mem", store.clone(), vec![])));

    let corrections = populate_corrections(
        &provider,
        &zone("example.com"),
        &ZoneCache::new(),
        &CallPolicy::default(),
        true,
    )
    .await
    .unwrap();

    assert_eq!(corrections.len(), 1);
    assert!(corrections[0].is_report());
    assert!(store.zone_names().await.is_empty());
}

#[tokio::test]
async fn test_populate_skipped_without_lister() {
    let provider = ProviderInstance {
        capabilities: none::capabilities(),
        ..instance("none", Arc::new(NoneProvider))
    };
    let corrections = populate_corrections(
        &provider,
        &zone("example.com"),
        &ZoneCache::new(),
        &CallPolicy::default(),
        false,
    )
    .await
    .unwrap();
    assert!(corrections.is_empty());
}

#[tokio::test]
async fn test_depopulate_deletes_unlisted_zones() {
    let store = MemoryStore::default();
    store.put_zone("example.com", vec![]).await;
    store.put_zone("stale.example", vec![]).await;
    let provider = instance("mem", Arc::new(MemoryProvider::new("mem", store.clone(), vec![])));
    let wanted = BTreeSet::from(["Example.com.".to_string()]);

    let mut corrections = depopulate_corrections(
        &provider,
        &wanted,
        &ZoneCache::new(),
        &CallPolicy::default(),
        false,
    )
    .await
    .unwrap();

    assert_eq!(corrections.len(), 1);
    assert_eq!(corrections[0].msg, "Deleting zone \"stale.example\" from \"mem\"");
    corrections[0].execute().await.unwrap().unwrap();
    assert_eq!(store.zone_names().await, vec!["example.com"]);
}

#[tokio::test]
async fn test_depopulate_preview_reports() {
    let store = MemoryStore::default();
    store.put_zone("stale.example", vec![]).await;
    let provider = instance("mem", Arc::new(MemoryProvider::new("mem", store.clone(), vec![])));

    let corrections = depopulate_corrections(
        &provider,
        &BTreeSet::new(),
        &ZoneCache::new(),
        &CallPolicy::default(),
        true,
    )
    .await
    .unwrap();

    assert_eq!(corrections.len(), 1);
    assert!(corrections[0].is_report());
    assert_eq!(store.zone_names().await, vec!["stale.example"]);
}
