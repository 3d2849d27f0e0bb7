// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use dnscontrol::models::Record;
use dnscontrol::providers::memory::{self, MemoryProvider, MemoryRegistrar, MemoryStore};
use dnscontrol::providers::{DnsProvider, ProviderConfig, ProviderRegistry, Registrar, Registration};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Nameserver the shared in-memory provider advertises
pub const MEM_NAMESERVER: &str = "ns1.mem.example.";

/// Registry whose `INMEMORY` type is backed by `store`, so tests can seed and
/// inspect provider state across runs.
pub fn shared_registry(store: &MemoryStore) -> ProviderRegistry {
    let mut registry = ProviderRegistry::with_builtin();
    let dns_store = store.clone();
    let registrar_store = store.clone();
    registry.register(Registration {
        type_name: "INMEMORY".to_string(),
        capabilities: memory::capabilities(),
        dns: Some(Arc::new(
            move |name: &str, _config: &ProviderConfig| -> anyhow::Result<Arc<dyn DnsProvider>> {
                Ok(Arc::new(MemoryProvider::new(
                    name,
                    dns_store.clone(),
                    vec![MEM_NAMESERVER.to_string()],
                )))
            },
        )),
        registrar: Some(Arc::new(
            move |_name: &str, _config: &ProviderConfig| -> anyhow::Result<Arc<dyn Registrar>> {
                Ok(Arc::new(MemoryRegistrar::new(registrar_store.clone())))
            },
        )),
    });
    registry
}

/// IR with one in-memory provider `mem` and the `none` registrar.
pub fn ir(domains: Value) -> Value {
    json!({
        "registrars": [{"name": "none", "type": "NONE"}],
        "dnsProviders": [{"name": "mem"}],
        "domains": domains,
    })
}

/// One IR domain on `mem` with apex NS management switched off.
pub fn domain(name: &str, records: Value) -> Value {
    json!({
        "name": name,
        "registrar": "none",
        "dnsProviderNames": {"mem": 0},
        "records": records,
        "metadata": {"no_ns": "true"},
    })
}

pub fn creds() -> Value {
    json!({"mem": {"TYPE": "INMEMORY"}})
}

/// Write the IR and credentials into `dir`.
pub fn write_inputs(dir: &Path, config: &Value, creds: &Value) -> (PathBuf, PathBuf) {
    let config_path = dir.join("dnsconfig.json");
    let creds_path = dir.join("creds.json");
    std::fs::write(&config_path, serde_json::to_string_pretty(config).unwrap()).unwrap();
    std::fs::write(&creds_path, serde_json::to_string_pretty(creds).unwrap()).unwrap();
    (config_path, creds_path)
}

pub fn record(label: &str, zone: &str, ttl: u32, rtype: &str, target: &str) -> Record {
    Record::parse(label, zone, ttl, rtype, target).unwrap()
}
