// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Nameserver determination and registrar delegation.

use super::retry::CallPolicy;
use crate::constants::APEX_LABEL;
use crate::models::{canonical_name, Correction, DomainConfig, Record, RecordData};
use crate::providers::{ProviderInstance, RegistrarInstance};
use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Merge the nameservers of every attached provider into `zone`.
///
/// Providers are asked in IR order; a count of `0` skips the provider, a
/// positive count keeps that many of its nameservers and `-1` keeps all.
/// The result extends the IR-declared nameservers without duplicates. Unless
/// the zone sets `no_ns`, an apex NS record is added for each nameserver
/// that the zone does not already declare.
///
/// # Errors
///
/// Returns an error if a provider's nameservers cannot be fetched.
pub async fn determine_nameservers(
    zone: &mut DomainConfig,
    providers: &[ProviderInstance],
    policy: &CallPolicy,
) -> Result<()> {
    for provider in providers {
        if provider.nameserver_count == 0 {
            continue;
        }
        let driver = &provider.driver;
        let domain = zone.name.clone();
        let found = policy
            .read(&provider.name, "get_nameservers", || {
                driver.get_nameservers(&domain)
            })
            .await
            .with_context(|| {
                format!(
                    "Failed to get nameservers of '{}' from '{}'",
                    zone.unique_name, provider.name
                )
            })?;

        let keep = usize::try_from(provider.nameserver_count).unwrap_or(usize::MAX);
        for ns in found.iter().take(keep).map(|n| canonical_name(n)) {
            if !zone.nameservers.contains(&ns) {
                zone.nameservers.push(ns);
            }
        }
    }
    debug!(zone = %zone.unique_name, nameservers = ?zone.nameservers, "Determined nameservers");

    if zone.no_ns() {
        return Ok(());
    }

    let ttl = zone.ns_ttl();
    for ns in zone.nameservers.clone() {
        let record = Record::new(APEX_LABEL, &zone.name, ttl, RecordData::NS(ns))?;
        let declared = zone
            .records
            .iter()
            .any(|r| r.name == record.name && r.data == record.data);
        if !declared {
            zone.records.push(record);
        }
    }
    Ok(())
}

/// Corrections that align the registrar's delegation with `zone.nameservers`.
///
/// A zone without nameservers produces a single warning report instead,
/// unless it sets `no_ns`.
///
/// # Errors
///
/// Returns an error if the registrar fails or exceeds the deadline.
pub async fn registrar_corrections(
    registrar: &RegistrarInstance,
    zone: &DomainConfig,
    policy: &CallPolicy,
) -> Result<Vec<Correction>> {
    if zone.nameservers.is_empty() {
        if zone.no_ns() {
            return Ok(Vec::new());
        }
        warn!(zone = %zone.unique_name, "No nameservers declared, skipping registrar");
        return Ok(vec![Correction::report(format!(
            "WARNING: no nameservers declared for \"{}\"; skipping registrar. Set no_ns=true to silence this warning",
            zone.unique_name
        ))]);
    }

    match tokio::time::timeout(
        policy.timeout,
        registrar.driver.get_registrar_corrections(zone),
    )
    .await
    {
        Ok(result) => result.with_context(|| {
            format!(
                "Registrar '{}' failed for '{}'",
                registrar.name, zone.unique_name
            )
        }),
        Err(_) => anyhow::bail!(
            "Registrar '{}' timed out after {}s for '{}'",
            registrar.name,
            policy.timeout.as_secs(),
            zone.unique_name
        ),
    }
}

#[cfg(test)]
#[path = "delegation_tests.rs"]
mod delegation_tests;
