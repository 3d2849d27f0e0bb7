// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `target.rs`

use super::*;

#[test]
fn test_canonical_name_adds_single_trailing_dot() {
    assert_eq!(canonical_name("NS1.Example.COM"), "ns1.example.com.");
    assert_eq!(canonical_name("ns1.example.com.."), "ns1.example.com.");
    assert_eq!(canonical_name("."), ".");
}

#[test]
fn test_canonical_name_is_idempotent() {
    let once = canonical_name("Mail.Example.Net");
    assert_eq!(canonical_name(&once), once);
}

#[test]
fn test_canonical_name_converts_idn() {
    assert_eq!(canonical_name("bücher.example"), "xn--bcher-kva.example.");
}

#[test]
fn test_resolve_name_relative_and_apex() {
    assert_eq!(resolve_name("mail", "example.com"), "mail.example.com.");
    assert_eq!(resolve_name("@", "example.com"), "example.com.");
    assert_eq!(resolve_name("other.net.", "example.com"), "other.net.");
}

#[test]
fn test_parse_ipv6_renders_shortest_form() {
    let data = RecordData::parse(&RecordType::AAAA, "2001:0db8:0000:0000:0000:0000:0000:0001", "")
        .unwrap();
    assert_eq!(data.target_combined(), "2001:db8::1");
}

#[test]
fn test_parse_mx() {
    let data = RecordData::parse(&RecordType::MX, "10 mx.example.com.", "example.com").unwrap();
    assert_eq!(
        data,
        RecordData::MX {
            preference: 10,
            exchange: "mx.example.com.".to_string()
        }
    );
}

#[test]
fn test_parse_mx_rejects_out_of_range_preference() {
    let result = RecordData::parse(&RecordType::MX, "70000 mx.example.com.", "example.com");
    assert!(result.is_err());
}

#[test]
fn test_txt_keeps_embedded_quotes() {
    let data = RecordData::parse(&RecordType::TXT, r#""say \"hi\"" "second""#, "").unwrap();
    assert_eq!(
        data,
        RecordData::TXT(vec!["say \"hi\"".to_string(), "second".to_string()])
    );
    assert_eq!(data.target_combined(), r#""say \"hi\"" "second""#);
}

#[test]
fn test_unquoted_txt_is_single_string() {
    let data = RecordData::parse(&RecordType::TXT, "v=spf1 -all", "").unwrap();
    assert_eq!(data, RecordData::TXT(vec!["v=spf1 -all".to_string()]));
}

#[test]
fn test_caa_tag_checked() {
    let good = RecordData::parse(&RecordType::CAA, "0 issue \"letsencrypt.org\"", "").unwrap();
    assert!(good.validate().is_ok());
    assert_eq!(good.target_combined(), "0 issue \"letsencrypt.org\"");

    let bad = RecordData::parse(&RecordType::CAA, "0 issuer \"letsencrypt.org\"", "").unwrap();
    assert!(bad.validate().is_err());
}

#[test]
fn test_tlsa_ranges_checked() {
    let bad = RecordData::parse(&RecordType::TLSA, "4 1 1 abcdef", "").unwrap();
    assert!(bad.validate().unwrap_err().contains("TLSA usage"));

    let good = RecordData::parse(&RecordType::TLSA, "3 1 1 ABCDEF", "").unwrap();
    assert!(good.validate().is_ok());
}

#[test]
fn test_ds_digest_lowercased_on_canonicalize() {
    let mut data = RecordData::parse(&RecordType::DS, "1 1 1 ABC", "").unwrap();
    data.canonicalize();
    assert_eq!(data.target_combined(), "1 1 1 abc");
}

#[test]
fn test_naptr_round_trip_rendering() {
    let text = r#"100 10 "U" "E2U+sip" "!^.*$!sip:info@example.com!" ."#;
    let data = RecordData::parse(&RecordType::NAPTR, text, "example.com").unwrap();
    assert_eq!(data.target_combined(), text);
}

#[test]
fn test_https_params() {
    let data = RecordData::parse(&RecordType::HTTPS, "1 . alpn=h2,h3", "example.com").unwrap();
    assert_eq!(data.target_combined(), "1 . alpn=h2,h3");
}

#[test]
fn test_loc_parse_and_render() {
    let data = RecordData::parse(
        &RecordType::LOC,
        "52 22 23.000 N 4 53 32.000 E -2.00m 0m 10000m 10m",
        "",
    )
    .unwrap();
    assert_eq!(
        data.target_combined(),
        "52 22 23.000 N 4 53 32.000 E -2.00m 0m 10000m 10m"
    );
}

#[test]
fn test_loc_defaults_precision() {
    let RecordData::LOC(loc) =
        RecordData::parse(&RecordType::LOC, "42 21 54 N 71 06 18 W -24m", "").unwrap()
    else {
        panic!("expected LOC");
    };
    assert_eq!(loc.size, 0x12);
    assert_eq!(loc.horiz_pre, 0x16);
    assert_eq!(loc.vert_pre, 0x13);
}

#[test]
fn test_tokenize_rejects_unterminated_quote() {
    assert!(tokenize("\"open").is_err());
}

#[test]
fn test_custom_type_keeps_content() {
    let rtype: RecordType = "cf_redirect".parse().unwrap();
    let data = RecordData::parse(&rtype, "example.com/* https://example.net/$1", "").unwrap();
    assert_eq!(data.rtype().as_str(), "CF_REDIRECT");
    assert_eq!(data.target_combined(), "example.com/* https://example.net/$1");
}
