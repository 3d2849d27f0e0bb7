// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for error types.

use crate::errors::*;

#[test]
fn test_unmanaged_collision_message() {
    let error = DiffError::UnmanagedCollision {
        zone: "example.com".to_string(),
        label: "_acme-challenge".to_string(),
        rtype: "TXT".to_string(),
        target: "\"other\"".to_string(),
    };

    assert!(error
        .to_string()
        .starts_with("desired record collides with an ignored record"));
}

#[test]
fn test_type_mismatch_names_both_types() {
    let error = TypeResolutionError::Mismatch {
        name: "dns".to_string(),
        declared_type: "GANDI".to_string(),
        creds_type: "ROUTE53".to_string(),
    };

    let text = error.to_string();
    assert!(text.contains("GANDI"));
    assert!(text.contains("ROUTE53"));
}

#[test]
fn test_provider_error_transient_classification() {
    let transient = ProviderError::Transient {
        provider: "r53".to_string(),
        operation: "get_zone_records".to_string(),
        reason: "503".to_string(),
    };
    let timeout = ProviderError::Timeout {
        provider: "r53".to_string(),
        operation: "list_zones".to_string(),
        timeout_secs: 5,
    };
    let permanent = ProviderError::Permanent {
        provider: "r53".to_string(),
        operation: "get_zone_records".to_string(),
        reason: "403 forbidden".to_string(),
    };

    assert!(transient.is_transient());
    assert!(timeout.is_transient());
    assert!(!permanent.is_transient());
    assert_eq!(permanent.kind(), "permanent");
}

#[test]
fn test_panicked_error_is_permanent() {
    let error = ProviderError::Panicked {
        provider: "buggy".to_string(),
        zone: "example.com".to_string(),
        reason: "index out of bounds".to_string(),
    };

    assert!(!error.is_transient());
    assert_eq!(
        error.to_string(),
        "Provider 'buggy' panicked on zone 'example.com': index out of bounds"
    );
}

#[test]
fn test_capability_error_message() {
    let error = CapabilityError::UnsupportedRecordType {
        provider: "cf".to_string(),
        provider_type: "CLOUDFLAREAPI".to_string(),
        rtype: "NAPTR".to_string(),
        zone: "example.com".to_string(),
    };

    assert_eq!(
        error.to_string(),
        "Provider 'cf' (CLOUDFLAREAPI) does not support NAPTR records (zone 'example.com')"
    );
}

#[test]
fn test_missing_creds_suggests_entry() {
    let error = TypeResolutionError::Missing {
        name: "gcloud".to_string(),
    };

    assert!(error.to_string().contains("FILL_IN_PROVIDER_TYPE"));
}
