// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `delegation.rs`

use super::*;
use crate::models::RecordType;
use crate::providers::memory::{self, MemoryProvider, MemoryRegistrar, MemoryStore};
use std::collections::BTreeMap;
use std::sync::Arc;

fn provider(name: &str, nameservers: &[&str], count: i32) -> ProviderInstance {
    let nameservers = nameservers.iter().map(|n| (*n).to_string()).collect();
    ProviderInstance {
        name: name.to_string(),
        provider_type: "INMEMORY".to_string(),
        driver: Arc::new(MemoryProvider::new(name, MemoryStore::default(), nameservers)),
        is_default: true,
        capabilities: memory::capabilities(),
        nameserver_count: count,
    }
}

fn zone() -> DomainConfig {
    DomainConfig {
        name: "example.com".to_string(),
        unique_name: "example.com".to_string(),
        ..Default::default()
    }
}

fn apex_ns(zone: &DomainConfig) -> Vec<(String, u32)> {
    zone.records
        .iter()
        .filter(|r| r.rtype() == RecordType::NS && r.name == "@")
        .map(|r| (r.target_combined(), r.ttl))
        .collect()
}

#[tokio::test]
async fn test_nameservers_merge_in_order() {
    let mut zone = zone();
    zone.nameservers = vec!["ns0.example.net.".to_string()];
    let providers = [
        provider("a", &["NS1.a.net", "ns2.a.net"], 1),
        provider("b", &["ns1.b.net.", "ns1.a.net."], -1),
        provider("c", &["ns1.c.net."], 0),
    ];

    determine_nameservers(&mut zone, &providers, &CallPolicy::default())
        .await
        .unwrap();

    assert_eq!(
        zone.nameservers,
        vec!["ns0.example.net.", "ns1.a.net.", "ns1.b.net."]
    );
    assert_eq!(apex_ns(&zone).len(), 3);
    assert!(apex_ns(&zone).iter().all(|(_, ttl)| *ttl == 300));
}

#[tokio::test]
async fn test_ns_ttl_and_existing_records() {
    let mut zone = zone();
    zone.metadata = BTreeMap::from([("ns_ttl".to_string(), "86400".to_string())]);
    zone.records
        .push(Record::parse("@", "example.com", 3600, "NS", "ns1.a.net.").unwrap());

    determine_nameservers(&mut zone, &[provider("a", &["ns1.a.net."], -1)], &CallPolicy::default())
        .await
        .unwrap();

    assert_eq!(apex_ns(&zone), vec![("ns1.a.net.".to_string(), 3600)]);
}

#[tokio::test]
async fn test_no_ns_skips_records() {
    let mut zone = zone();
    zone.metadata = BTreeMap::from([("no_ns".to_string(), "true".to_string())]);

    determine_nameservers(&mut zone, &[provider("a", &["ns1.a.net."], -1)], &CallPolicy::default())
        .await
        .unwrap();

    assert_eq!(zone.nameservers, vec!["ns1.a.net."]);
    assert!(apex_ns(&zone).is_empty());
}

#[tokio::test]
async fn test_registrar_without_nameservers_warns_once() {
    let store = MemoryStore::default();
    let registrar = RegistrarInstance {
        name: "reg".to_string(),
        provider_type: "INMEMORY".to_string(),
        driver: Arc::new(MemoryRegistrar::new(store)),
    };

    let corrections = registrar_corrections(&registrar, &zone(), &CallPolicy::default())
        .await
        .unwrap();
    assert_eq!(corrections.len(), 1);
    assert!(corrections[0].is_report());

    let mut quiet = zone();
    quiet.metadata = BTreeMap::from([("no_ns".to_string(), "true".to_string())]);
    assert!(registrar_corrections(&registrar, &quiet, &CallPolicy::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_registrar_delegation_correction() {
    let store = MemoryStore::default();
    let registrar = RegistrarInstance {
        name: "reg".to_string(),
        provider_type: "INMEMORY".to_string(),
        driver: Arc::new(MemoryRegistrar::new(store.clone())),
    };
    let mut zone = zone();
    zone.nameservers = vec!["ns1.a.net.".to_string()];

    let mut corrections = registrar_corrections(&registrar, &zone, &CallPolicy::default())
        .await
        .unwrap();
    assert_eq!(corrections.len(), 1);
    corrections[0].execute().await.unwrap().unwrap();

    assert_eq!(store.delegation("example.com").await, vec!["ns1.a.net."]);
}
