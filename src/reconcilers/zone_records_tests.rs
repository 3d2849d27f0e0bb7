// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `zone_records.rs`

use super::*;
use crate::providers::memory::{self, MemoryProvider, MemoryStore};
use crate::providers::CapabilitySet;
use std::sync::Arc;

fn rec(label: &str, rtype: &str, text: &str) -> Record {
    Record::parse(label, "example.com", 300, rtype, text).unwrap()
}

fn zone(records: Vec<Record>) -> DomainConfig {
    DomainConfig {
        name: "example.com".to_string(),
        unique_name: "example.com".to_string(),
        dns_provider_names: vec![("mem".to_string(), -1)],
        records,
        ..Default::default()
    }
}

fn provider(store: &MemoryStore, capabilities: CapabilitySet) -> ProviderInstance {
    ProviderInstance {
        name: "mem".to_string(),
        provider_type: "INMEMORY".to_string(),
        driver: Arc::new(MemoryProvider::new("mem", store.clone(), vec![])),
        is_default: true,
        capabilities,
        nameserver_count: -1,
    }
}

fn tracker() -> PairTracker {
    let mut tracker = PairTracker::new("example.com", "mem");
    tracker.advance(TaskState::Listing);
    tracker.advance(TaskState::Listed);
    tracker
}

#[tokio::test]
async fn test_reports_and_corrections_are_split() {
    let store = MemoryStore::default();
    store
        .put_zone(
            "example.com",
            vec![rec("old", "A", "192.0.2.9"), rec("www", "A", "192.0.2.1")],
        )
        .await;
    let mut desired = zone(vec![rec("www", "A", "192.0.2.2")]);
    desired.keep_unknown = true;
    let mut tracker = tracker();

    let planned = plan_zone_records(
        &provider(&store, memory::capabilities()),
        &desired,
        &CallPolicy::default(),
        &mut tracker,
    )
    .await
    .unwrap();

    assert_eq!(planned.reports.len(), 1);
    assert!(planned.reports[0].msg.starts_with("NO_PURGE"));
    assert_eq!(planned.corrections.len(), 1);
    assert!(planned.corrections[0].msg.starts_with("± MODIFY www A"));
    assert_eq!(planned.change_count, 1);
    assert_eq!(tracker.state(), TaskState::Diffing);
}

#[tokio::test]
async fn test_capability_error_is_fatal() {
    let store = MemoryStore::default();
    store.put_zone("example.com", vec![]).await;
    let desired = zone(vec![rec("@", "CAA", "0 issue \"letsencrypt.org\"")]);
    let caps = CapabilitySet::new([Capability::CanConcur]);

    let err = plan_zone_records(
        &provider(&store, caps),
        &desired,
        &CallPolicy::default(),
        &mut tracker(),
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("does not support CAA"));
}

#[tokio::test]
async fn test_apex_ns_stripped_without_capability() {
    let store = MemoryStore::default();
    store
        .put_zone("example.com", vec![rec("@", "NS", "ns.old.example.net.")])
        .await;
    let mut desired = zone(vec![
        rec("@", "NS", "ns1.provider.net."),
        rec("@", "NS", "ns.custom.example.net."),
    ]);
    desired.nameservers = vec!["ns1.provider.net.".to_string()];
    let caps: CapabilitySet = memory::capabilities()
        .iter()
        .filter(|c| *c != Capability::CanModifyApexNs)
        .collect();

    let planned = plan_zone_records(
        &provider(&store, caps),
        &desired,
        &CallPolicy::default(),
        &mut tracker(),
    )
    .await
    .unwrap();

    assert!(planned.corrections.is_empty());
    assert_eq!(planned.reports.len(), 1);
    assert!(planned.reports[0].msg.contains("ns.custom.example.net."));
    assert!(!planned.reports[0].msg.contains("ns1.provider.net."));
}

#[tokio::test]
async fn test_converged_zone_plans_nothing() {
    let store = MemoryStore::default();
    let records = vec![rec("@", "A", "192.0.2.1"), rec("www", "CNAME", "example.com.")];
    store.put_zone("example.com", records.clone()).await;

    let planned = plan_zone_records(
        &provider(&store, memory::capabilities()),
        &zone(records),
        &CallPolicy::default(),
        &mut tracker(),
    )
    .await
    .unwrap();

    assert!(planned.reports.is_empty());
    assert!(planned.corrections.is_empty());
    assert_eq!(planned.change_count, 0);
}
