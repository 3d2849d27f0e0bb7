// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `selection.rs`

use super::*;
use crate::models::split_tag;
use crate::providers::none::{self, NoneProvider};
use std::sync::Arc;

fn zone(raw: &str) -> DomainConfig {
    let (name, tag) = split_tag(raw);
    DomainConfig {
        unique_name: raw.to_string(),
        name,
        tag,
        ..Default::default()
    }
}

fn provider(name: &str, is_default: bool) -> ProviderInstance {
    ProviderInstance {
        name: name.to_string(),
        provider_type: "NONE".to_string(),
        driver: Arc::new(NoneProvider),
        is_default,
        capabilities: none::capabilities(),
        nameserver_count: -1,
    }
}

#[test]
fn test_empty_and_all_select_everything() {
    for raw in ["", "all", " ALL ", "example.com,all"] {
        let filter = DomainFilter::parse(raw);
        assert!(filter.selects_all(), "{raw:?}");
        assert!(filter.matches(&zone("example.com!internal")));
    }
}

#[test]
fn test_plain_name_selects_untagged_only() {
    for raw in ["example.com", "example.com!", "Example.COM."] {
        let filter = DomainFilter::parse(raw);
        assert!(filter.matches(&zone("example.com")), "{raw:?}");
        assert!(!filter.matches(&zone("example.com!internal")), "{raw:?}");
        assert!(!filter.matches(&zone("example.net")), "{raw:?}");
    }
}

#[test]
fn test_wildcard_tag_selects_tagged_variants() {
    let filter = DomainFilter::parse("example.com!*");
    assert!(filter.matches(&zone("example.com!internal")));
    assert!(filter.matches(&zone("example.com!external")));
    assert!(!filter.matches(&zone("example.com")));
}

#[test]
fn test_exact_tag() {
    let filter = DomainFilter::parse("example.com!internal, example.net");
    assert!(filter.matches(&zone("example.com!internal")));
    assert!(!filter.matches(&zone("example.com!external")));
    assert!(filter.matches(&zone("example.net")));
}

#[test]
fn test_provider_filter() {
    let loud = provider("loud", true);
    let quiet = provider("quiet", false);

    let defaults = ProviderFilter::parse("");
    assert_eq!(defaults, ProviderFilter::Defaults);
    assert!(defaults.selects(&loud));
    assert!(!defaults.selects(&quiet));

    let all = ProviderFilter::parse("all");
    assert!(all.selects(&quiet));

    let named = ProviderFilter::parse("quiet, other");
    assert!(named.selects(&quiet));
    assert!(!named.selects(&loud));
    assert!(named.selects_registrar("other"));
    assert!(!named.selects_registrar("reg"));
    assert!(defaults.selects_registrar("reg"));
}
