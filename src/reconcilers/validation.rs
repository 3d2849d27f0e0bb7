// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Desired-state validation.
//!
//! Runs before any provider is contacted. A zone with validation errors is
//! skipped entirely; other zones are unaffected.

use crate::constants::APEX_LABEL;
use crate::errors::ValidationError;
use crate::models::{DomainConfig, RecordType};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Check CNAME exclusivity and duplicate records.
///
/// Returns every problem found, in label order.
#[must_use]
pub fn validate_records(zone: &DomainConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut by_label: BTreeMap<&str, Vec<RecordType>> = BTreeMap::new();
    let mut seen = HashSet::new();

    for record in &zone.records {
        let rtype = record.rtype();
        let target = record.target_combined();
        if !seen.insert((record.name.as_str(), rtype.clone(), target.clone())) {
            errors.push(ValidationError::DuplicateRecord {
                zone: zone.unique_name.clone(),
                label: record.name.clone(),
                rtype: rtype.to_string(),
                target,
            });
        }
        by_label.entry(record.name.as_str()).or_default().push(rtype);
    }

    for (label, types) in by_label {
        let cnames = types.iter().filter(|t| **t == RecordType::CNAME).count();
        if cnames == 0 {
            continue;
        }
        if label == APEX_LABEL {
            errors.push(ValidationError::ApexCname {
                zone: zone.unique_name.clone(),
            });
        }
        if cnames > 1 {
            errors.push(ValidationError::DuplicateCname {
                zone: zone.unique_name.clone(),
                label: label.to_string(),
            });
        }
        let others: BTreeSet<&str> = types
            .iter()
            .filter(|t| **t != RecordType::CNAME)
            .map(RecordType::as_str)
            .collect();
        if !others.is_empty() {
            errors.push(ValidationError::CnameConflict {
                zone: zone.unique_name.clone(),
                label: label.to_string(),
                others: others.into_iter().collect::<Vec<_>>().join(", "),
            });
        }
    }
    errors
}

/// Check that every provider and the registrar the zone names are declared.
#[must_use]
pub fn validate_references(
    zone: &DomainConfig,
    providers: &BTreeSet<String>,
    registrars: &BTreeSet<String>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if !zone.registrar_name.is_empty() && !registrars.contains(&zone.registrar_name) {
        errors.push(ValidationError::UnknownProvider {
            zone: zone.unique_name.clone(),
            role: "registrar",
            name: zone.registrar_name.clone(),
        });
    }
    for name in zone.provider_names() {
        if !providers.contains(name) {
            errors.push(ValidationError::UnknownProvider {
                zone: zone.unique_name.clone(),
                role: "DNS provider",
                name: name.to_string(),
            });
        }
    }
    errors
}
