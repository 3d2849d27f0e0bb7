// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `domain.rs`

use super::*;

const IR: &str = r#"{
  "registrars": [{"name": "none", "type": "NONE"}],
  "dnsProviders": [{"name": "mem", "type": "INMEMORY"}, {"name": "second"}],
  "domains": [{
    "name": "Example.COM!internal",
    "registrar": "none",
    "dnsProviderNames": {"second": 0, "mem": -1},
    "records": [
      {"type": "A", "name": "@", "ttl": 300, "target": "1.2.3.4"},
      {"type": "MX", "name": "@", "target": "mx.example.com.", "mxpreference": 10},
      {"type": "TXT", "name": "_spf", "target": "", "txtstrings": ["v=spf1", "-all"]},
      {"type": "CAA", "name": "@", "target": "letsencrypt.org", "caaflag": 0, "caatag": "issue",
       "meta": {"comment": "ca"}}
    ],
    "nameservers": [{"name": "NS1.example.net"}],
    "unmanaged": [{"label": "_acme-challenge", "type": "TXT"}],
    "keepUnknown": true,
    "metadata": {"ns_ttl": "3600"}
  }]
}"#;

#[test]
fn test_parse_ir_document() {
    let config: DnsConfig = serde_json::from_str(IR).unwrap();

    assert_eq!(config.domains.len(), 1);
    assert_eq!(config.declared_type("mem"), "INMEMORY");
    assert_eq!(config.declared_type("second"), "");
    assert_eq!(config.declared_type("none"), "NONE");
    assert_eq!(config.declared_type("missing"), "");
}

#[test]
fn test_provider_names_keep_declaration_order() {
    let config: DnsConfig = serde_json::from_str(IR).unwrap();
    let names = &config.domains[0].dns_provider_names;
    assert_eq!(
        names,
        &vec![("second".to_string(), 0), ("mem".to_string(), -1)]
    );
}

#[test]
fn test_from_ir_builds_typed_zone() {
    let config: DnsConfig = serde_json::from_str(IR).unwrap();
    let zone = DomainConfig::from_ir(&config.domains[0]).unwrap();

    assert_eq!(zone.name, "example.com");
    assert_eq!(zone.tag.as_deref(), Some("internal"));
    assert_eq!(zone.unique_name, "example.com!internal");
    assert_eq!(zone.nameservers, vec!["ns1.example.net.".to_string()]);
    assert!(zone.keep_unknown);
    assert_eq!(zone.ns_ttl(), 3600);
    assert!(!zone.no_ns());

    let rendered: Vec<String> = zone.records.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "@ A 1.2.3.4 ttl=300",
            "@ MX 10 mx.example.com. ttl=300",
            "_spf TXT \"v=spf1\" \"-all\" ttl=300",
            "@ CAA 0 issue \"letsencrypt.org\" ttl=300",
        ]
    );
    assert_eq!(zone.records[3].meta.comment.as_deref(), Some("ca"));
}

#[test]
fn test_from_ir_rejects_bad_record() {
    let ir = IrDomain {
        name: "example.com".to_string(),
        records: vec![IrRecord {
            rtype: "A".to_string(),
            name: "www".to_string(),
            target: "not-an-ip".to_string(),
            ..Default::default()
        }],
        ..Default::default()
    };
    assert!(DomainConfig::from_ir(&ir).is_err());
}

#[test]
fn test_split_tag() {
    assert_eq!(split_tag("example.com"), ("example.com".to_string(), None));
    assert_eq!(split_tag("example.com!"), ("example.com".to_string(), None));
    assert_eq!(
        split_tag("Example.com!ext"),
        ("example.com".to_string(), Some("ext".to_string()))
    );
}

#[test]
fn test_no_ns_flag() {
    let zone = DomainConfig {
        metadata: BTreeMap::from([("no_ns".to_string(), "TRUE".to_string())]),
        ..Default::default()
    };
    assert!(zone.no_ns());
    assert_eq!(zone.ns_ttl(), DEFAULT_NS_TTL_SECS);
}
