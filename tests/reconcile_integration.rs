// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! End-to-end runs through the command-line entry point against the
//! in-memory provider.

mod common;

use clap::Parser;
use common::{creds, domain, ir, record, shared_registry, write_inputs};
use dnscontrol::cli::{execute, Cli};
use dnscontrol::printer::BufferPrinter;
use dnscontrol::providers::memory::MemoryStore;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::TempDir;

/// Run `dnscontrol <verb> --config .. --creds .. <extra>` and return the
/// exit code with everything printed.
async fn run(
    store: &MemoryStore,
    dir: &Path,
    config: &Value,
    verb: &str,
    extra: &[&str],
) -> anyhow::Result<(u8, BufferPrinter)> {
    let (config_path, creds_path) = write_inputs(dir, config, &creds());
    let config_arg = config_path.display().to_string();
    let creds_arg = creds_path.display().to_string();
    let mut argv = vec![
        "dnscontrol",
        verb,
        "--config",
        config_arg.as_str(),
        "--creds",
        creds_arg.as_str(),
        "--timeout-secs",
        "5",
    ];
    argv.extend_from_slice(extra);
    let cli = Cli::try_parse_from(argv)?;

    let printer = BufferPrinter::new();
    let code = execute(
        &cli.command,
        &shared_registry(store),
        &printer,
        Arc::new(AtomicBool::new(false)),
    )
    .await?;
    Ok((code, printer))
}

fn s1_records() -> Value {
    json!([
        {"type": "A", "name": "@", "ttl": 300, "target": "1.2.3.4"},
        {"type": "A", "name": "www", "ttl": 300, "target": "5.6.7.8"},
    ])
}

#[tokio::test]
async fn test_create_records_preview_then_push() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::default();
    store.put_zone("example.com", Vec::new()).await;
    let config = ir(json!([domain("example.com", s1_records())]));

    let (code, printer) = run(&store, dir.path(), &config, "preview", &[]).await.unwrap();
    assert_eq!(code, 0);
    let lines = printer.lines();
    assert!(lines.contains(&"----- DNS Provider: mem...2 corrections".to_string()));
    assert!(lines.contains(&"#1: + CREATE @ A 1.2.3.4 ttl=300".to_string()));
    assert!(lines.contains(&"#2: + CREATE www A 5.6.7.8 ttl=300".to_string()));
    assert_eq!(store.records("example.com").await, Some(Vec::new()));

    let (code, printer) = run(&store, dir.path(), &config, "push", &[]).await.unwrap();
    assert_eq!(code, 0, "{}", printer.contents());
    let mut stored = store.records("example.com").await.unwrap();
    stored.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(
        stored,
        vec![
            record("@", "example.com", 300, "A", "1.2.3.4"),
            record("www", "example.com", 300, "A", "5.6.7.8"),
        ]
    );
}

#[tokio::test]
async fn test_converged_zone_with_expect_no_changes() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::default();
    store
        .put_zone(
            "example.com",
            vec![
                record("@", "example.com", 300, "A", "1.2.3.4"),
                record("www", "example.com", 300, "A", "5.6.7.8"),
            ],
        )
        .await;
    let config = ir(json!([domain("example.com", s1_records())]));

    let (code, printer) = run(&store, dir.path(), &config, "preview", &["--expect-no-changes"])
        .await
        .unwrap();

    assert_eq!(code, 0, "{}", printer.contents());
    assert!(!printer.contents().contains("CREATE"));
}

#[tokio::test]
async fn test_expect_no_changes_fails_when_changes_planned() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::default();
    store.put_zone("example.com", Vec::new()).await;
    let config = ir(json!([domain("example.com", s1_records())]));

    let (code, _) = run(&store, dir.path(), &config, "preview", &["--expect-no-changes"])
        .await
        .unwrap();

    assert_eq!(code, 1);
    assert_eq!(store.records("example.com").await, Some(Vec::new()));
}

#[tokio::test]
async fn test_ttl_only_change() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::default();
    store
        .put_zone(
            "example.com",
            vec![record("www", "example.com", 300, "A", "5.6.7.8")],
        )
        .await;
    let config = ir(json!([domain(
        "example.com",
        json!([{"type": "A", "name": "www", "ttl": 600, "target": "5.6.7.8"}]),
    )]));

    let (code, printer) = run(&store, dir.path(), &config, "push", &[]).await.unwrap();

    assert_eq!(code, 0, "{}", printer.contents());
    let contents = printer.contents();
    assert!(contents.contains("----- DNS Provider: mem...1 correction\n"));
    assert!(contents.contains("ttl 300 -> 600"));
    assert_eq!(
        store.records("example.com").await,
        Some(vec![record("www", "example.com", 600, "A", "5.6.7.8")])
    );
}

#[tokio::test]
async fn test_unmanaged_records_are_left_alone() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::default();
    let challenge = record("_acme-challenge", "example.com", 300, "TXT", "\"token\"");
    store
        .put_zone(
            "example.com",
            vec![record("www", "example.com", 300, "A", "5.6.7.8"), challenge.clone()],
        )
        .await;
    let mut zone = domain(
        "example.com",
        json!([{"type": "A", "name": "www", "ttl": 300, "target": "5.6.7.8"}]),
    );
    zone["unmanaged"] = json!([{"label": "_acme-challenge", "type": "*", "target": "*"}]);
    let config = ir(json!([zone]));

    let (code, printer) = run(&store, dir.path(), &config, "push", &["--expect-no-changes"])
        .await
        .unwrap();

    assert_eq!(code, 0, "{}", printer.contents());
    assert!(!printer.contents().contains("DELETE"));
    assert!(store
        .records("example.com")
        .await
        .unwrap()
        .contains(&challenge));
}

#[tokio::test]
async fn test_desired_record_colliding_with_unmanaged_pattern() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::default();
    let existing = vec![record("_acme-challenge", "example.com", 300, "TXT", "\"xyz\"")];
    store.put_zone("example.com", existing.clone()).await;
    let mut zone = domain(
        "example.com",
        json!([{"type": "TXT", "name": "_acme-challenge", "ttl": 300, "target": "other"}]),
    );
    zone["unmanaged"] = json!([{"label": "_acme-challenge", "type": "*", "target": "*"}]);
    let config = ir(json!([zone]));

    let (code, printer) = run(&store, dir.path(), &config, "push", &[]).await.unwrap();

    assert_eq!(code, 1);
    assert!(printer
        .contents()
        .contains("desired record collides with an ignored record"));
    assert_eq!(store.records("example.com").await, Some(existing));
}

#[tokio::test]
async fn test_delegation_change_orders_ds_around_ns() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::default();
    store
        .put_zone(
            "example.net",
            vec![
                record("sub", "example.net", 300, "NS", "ns.old.example.org."),
                record("sub", "example.net", 300, "DS", "1 1 1 abc"),
            ],
        )
        .await;
    let config = ir(json!([domain(
        "example.net",
        json!([
            {"type": "NS", "name": "sub", "ttl": 300, "target": "ns.new.example.org."},
            {"type": "DS", "name": "sub", "ttl": 300, "target": "2 2 2 def"},
        ]),
    )]));

    let (code, printer) = run(&store, dir.path(), &config, "preview", &[]).await.unwrap();
    assert_eq!(code, 0, "{}", printer.contents());

    let lines = printer.lines();
    let position = |needle: &str| {
        lines
            .iter()
            .position(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("no line containing {needle:?} in {lines:#?}"))
    };
    let ds_delete = position("- DELETE sub DS");
    let ns_delete = position("- DELETE sub NS");
    let ns_create = position("+ CREATE sub NS");
    let ds_create = position("+ CREATE sub DS");
    assert!(ds_delete < ns_delete);
    assert!(ns_delete < ns_create);
    assert!(ns_create < ds_create);
}

#[tokio::test]
async fn test_provider_type_mismatch_is_fatal() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::default();
    let config = json!({
        "registrars": [{"name": "none", "type": "NONE"}],
        "dnsProviders": [{"name": "mem", "type": "GANDI"}],
        "domains": [domain("example.com", json!([]))],
    });
    let (config_path, creds_path) = write_inputs(
        dir.path(),
        &config,
        &json!({"mem": {"TYPE": "ROUTE53"}}),
    );
    let cli = Cli::try_parse_from([
        "dnscontrol",
        "preview",
        "--config",
        config_path.to_str().unwrap(),
        "--creds",
        creds_path.to_str().unwrap(),
    ])
    .unwrap();

    let err = execute(
        &cli.command,
        &shared_registry(&store),
        &BufferPrinter::new(),
        Arc::new(AtomicBool::new(false)),
    )
    .await
    .unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("GANDI"), "{message}");
    assert!(message.contains("ROUTE53"), "{message}");
}

#[tokio::test]
async fn test_report_written_after_run() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::default();
    store.put_zone("example.com", Vec::new()).await;
    let config = ir(json!([domain("example.com", s1_records())]));
    let report = dir.path().join("report.json");
    let report_arg = report.display().to_string();

    let (code, _) = run(&store, dir.path(), &config, "preview", &["--report", report_arg.as_str()])
        .await
        .unwrap();
    assert_eq!(code, 0);

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(
        written,
        json!([
            {"domain": "example.com", "corrections": 2, "provider": "mem"},
            {"domain": "example.com", "corrections": 0, "registrar": "none"},
        ])
    );
}

#[tokio::test]
async fn test_missing_zone_created_then_filled() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::default();
    let config = ir(json!([domain("example.com", s1_records())]));

    let (code, printer) = run(&store, dir.path(), &config, "push", &[]).await.unwrap();

    assert_eq!(code, 0, "{}", printer.contents());
    assert_eq!(store.zone_names().await, vec!["example.com"]);
    assert_eq!(store.records("example.com").await.map(|r| r.len()), Some(2));
}
