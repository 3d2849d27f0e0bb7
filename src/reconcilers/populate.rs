// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone existence at providers.
//!
//! Populate makes sure every zone exists at each provider it is attached to
//! before record corrections run. Depopulate is the reverse: zones a provider
//! serves that the configuration no longer assigns to it.
//!
//! Both read the provider's zone list through the shared [`ZoneCache`]; a
//! successful create invalidates that provider's entry so later readers see
//! the new zone.

use super::retry::CallPolicy;
use crate::models::{canonical_zone, Correction, DomainConfig};
use crate::providers::ProviderInstance;
use crate::zone_cache::ZoneCache;
use anyhow::{anyhow, Context, Result};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Corrections that create `zone` at `provider` when it is missing.
///
/// In preview the missing zone is only reported. Providers that cannot list
/// zones are assumed to have it; providers that cannot create zones produce
/// a warning report.
///
/// # Errors
///
/// Returns an error if the provider's zone list cannot be fetched.
pub async fn populate_corrections(
    provider: &ProviderInstance,
    zone: &DomainConfig,
    cache: &ZoneCache,
    policy: &CallPolicy,
    preview: bool,
) -> Result<Vec<Correction>> {
    if provider.driver.as_zone_lister().is_none() {
        debug!(provider = %provider.name, "Provider cannot list zones, skipping populate");
        return Ok(Vec::new());
    }

    let exists = cache
        .has_zone(provider, &zone.name, policy)
        .await
        .with_context(|| format!("Failed to list zones at '{}'", provider.name))?;
    if exists {
        return Ok(Vec::new());
    }

    if provider.driver.as_zone_creator().is_none() {
        warn!(zone = %zone.name, provider = %provider.name, "Zone missing and provider cannot create zones");
        return Ok(vec![Correction::report(format!(
            "WARNING: zone \"{}\" does not exist at \"{}\" and the provider cannot create zones; create it manually",
            zone.name, provider.name
        ))]);
    }

    if preview {
        return Ok(vec![Correction::report(format!(
            "Zone \"{}\" does not exist at \"{}\" and will be created",
            zone.name, provider.name
        ))]);
    }

    let driver = Arc::clone(&provider.driver);
    let cache = cache.clone();
    let provider_name = provider.name.clone();
    let domain = zone.name.clone();
    let policy = *policy;
    let msg = format!("Ensuring zone \"{}\" exists at \"{}\"", zone.name, provider.name);

    Ok(vec![Correction::with_action(msg, async move {
        let creator = driver
            .as_zone_creator()
            .ok_or_else(|| anyhow!("Provider '{provider_name}' cannot create zones"))?;
        policy
            .mutate(&provider_name, "ensure_zone_exists", creator.ensure_zone_exists(&domain))
            .await?;
        cache.invalidate(&provider_name);
        info!(zone = %domain, provider = %provider_name, "Zone created");
        Ok(())
    })])
}

/// Corrections that delete zones `provider` serves but `wanted` does not name.
///
/// Providers that cannot delete zones produce a report per zone instead.
/// In preview every deletion is only reported.
///
/// # Errors
///
/// Returns an error if the provider's zone list cannot be fetched.
pub async fn depopulate_corrections(
    provider: &ProviderInstance,
    wanted: &BTreeSet<String>,
    cache: &ZoneCache,
    policy: &CallPolicy,
    preview: bool,
) -> Result<Vec<Correction>> {
    let present = cache
        .zones(provider, policy)
        .await
        .with_context(|| format!("Failed to list zones at '{}'", provider.name))?;
    let wanted: BTreeSet<String> = wanted.iter().map(|z| canonical_zone(z)).collect();
    let can_delete = provider.driver.as_zone_deleter().is_some();

    let mut corrections = Vec::new();
    for zone in present.difference(&wanted) {
        if !can_delete {
            corrections.push(Correction::report(format!(
                "Zone \"{zone}\" at \"{}\" is not in the configuration, but the provider cannot delete zones",
                provider.name
            )));
            continue;
        }
        if preview {
            corrections.push(Correction::report(format!(
                "Zone \"{zone}\" at \"{}\" is not in the configuration and will be deleted",
                provider.name
            )));
            continue;
        }

        let driver = Arc::clone(&provider.driver);
        let cache = cache.clone();
        let provider_name = provider.name.clone();
        let domain = zone.clone();
        let policy = *policy;
        let msg = format!("Deleting zone \"{zone}\" from \"{}\"", provider.name);
        corrections.push(Correction::with_action(msg, async move {
            let deleter = driver
                .as_zone_deleter()
                .ok_or_else(|| anyhow!("Provider '{provider_name}' cannot delete zones"))?;
            policy
                .mutate(&provider_name, "delete_zone", deleter.delete_zone(&domain))
                .await?;
            cache.invalidate(&provider_name);
            info!(zone = %domain, provider = %provider_name, "Zone deleted");
            Ok(())
        }));
    }
    Ok(corrections)
}

#[cfg(test)]
#[path = "populate_tests.rs"]
mod populate_tests;
