// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `creds.rs`

use super::*;
use std::io::Write;

fn env(var: &str) -> Option<String> {
    match var {
        "R53_KEY" => Some("AKIA123".to_string()),
        _ => None,
    }
}

#[test]
fn test_parse_json_expands_env() {
    let text = r#"{
        "r53": { "TYPE": "ROUTE53", "KeyId": "$R53_KEY", "region": "us-east-1" },
        "mem": { "TYPE": "INMEMORY", "_exclude_from_defaults": true }
    }"#;
    let store = CredsStore::parse("creds.json", text, false, env).unwrap();

    let r53 = store.get("r53").unwrap();
    assert_eq!(r53["KeyId"], "AKIA123");
    assert_eq!(r53["region"], "us-east-1");
    assert_eq!(store.creds_type("r53"), Some("ROUTE53"));
    assert_eq!(store.get("mem").unwrap()["_exclude_from_defaults"], "true");
}

#[test]
fn test_missing_env_var_is_error() {
    let text = r#"{ "gandi": { "TYPE": "GANDI_V5", "token": "$GANDI_TOKEN" } }"#;
    let err = CredsStore::parse("creds.json", text, false, env).unwrap_err();

    match err {
        CredsError::MissingEnv { entry, key, var } => {
            assert_eq!(entry, "gandi");
            assert_eq!(key, "token");
            assert_eq!(var, "GANDI_TOKEN");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_lone_dollar_is_literal() {
    let text = r#"{ "x": { "TYPE": "NONE", "password": "$" } }"#;
    let store = CredsStore::parse("creds.json", text, false, env).unwrap();
    assert_eq!(store.get("x").unwrap()["password"], "$");
}

#[test]
fn test_synthesized_entries() {
    let store = CredsStore::parse("creds.json", "{}", false, env).unwrap();
    assert_eq!(store.creds_type("none"), Some("NONE"));
    assert_eq!(store.creds_type("bind"), Some("BIND"));
}

#[test]
fn test_explicit_entry_wins_over_synthesized() {
    let text = r#"{ "bind": { "TYPE": "BIND", "directory": "zones" } }"#;
    let store = CredsStore::parse("creds.json", text, false, env).unwrap();
    assert_eq!(store.get("bind").unwrap()["directory"], "zones");
}

#[test]
fn test_blank_type_reads_as_none() {
    let text = r#"{ "cf": { "TYPE": "  ", "apitoken": "abc" } }"#;
    let store = CredsStore::parse("creds.json", text, false, env).unwrap();
    assert!(store.contains("cf"));
    assert_eq!(store.creds_type("cf"), None);
    assert_eq!(store.creds_type("absent"), None);
}

#[test]
fn test_parse_error() {
    let err = CredsStore::parse("creds.json", "{ not json", false, env).unwrap_err();
    assert!(matches!(err, CredsError::Parse { .. }));
}

#[test]
fn test_inject_bind_serial() {
    let text = r#"{ "mem": { "TYPE": "INMEMORY" } }"#;
    let mut store = CredsStore::parse("creds.json", text, false, env).unwrap();
    store.inject_bind_serial(2_025_010_101);

    assert_eq!(store.get("bind").unwrap()[BIND_SERIAL_KEY], "2025010101");
    assert!(!store.get("mem").unwrap().contains_key(BIND_SERIAL_KEY));
}

#[tokio::test]
async fn test_load_yaml_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        "notifications:\n  webhook_url: https://hooks.example.com/dns\nmem:\n  TYPE: INMEMORY\n  zones: example.com"
    )
    .unwrap();

    let store = CredsStore::load(file.path()).await.unwrap();

    assert_eq!(store.creds_type("mem"), Some("INMEMORY"));
    assert_eq!(
        store.notifications().unwrap()["webhook_url"],
        "https://hooks.example.com/dns"
    );
}

#[tokio::test]
async fn test_load_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = CredsStore::load(&dir.path().join("creds.json")).await.unwrap();
    assert_eq!(store.creds_type("none"), Some("NONE"));
}

#[tokio::test]
async fn test_load_unreadable_path_names_it() {
    let dir = tempfile::tempdir().unwrap();

    let err = CredsStore::load(dir.path()).await.unwrap_err();

    assert!(matches!(err, CredsError::Io { .. }));
    assert!(err.to_string().contains(&dir.path().display().to_string()));
}
