// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone-records reconciler: plans the record changes for one (zone, provider).

use super::retry::CallPolicy;
use super::state::{PairTracker, TaskState};
use crate::constants::APEX_LABEL;
use crate::errors::ProviderError;
use crate::models::{post_process_records, split_reports, Correction, DomainConfig, Record, RecordType};
use crate::providers::{Capability, ProviderInstance};
use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Output of planning one (zone, provider).
#[derive(Debug, Default)]
pub struct PlannedCorrections {
    /// Report-only entries, printed before any correction
    pub reports: Vec<Correction>,
    /// Entries carrying an action
    pub corrections: Vec<Correction>,
    /// Actionable changes as counted by the driver
    pub change_count: usize,
}

fn is_apex_ns(record: &Record) -> bool {
    record.name == APEX_LABEL && record.rtype() == RecordType::NS
}

/// Plan the record corrections for `zone` at `provider`.
///
/// Fetches the provider's records, canonicalizes them, hands the driver a
/// private copy of the zone and splits what it returns into reports and
/// corrections. Apex NS records are removed from both sides when the driver
/// cannot modify them.
///
/// # Arguments
///
/// * `provider` - The provider instance, already bound to the zone
/// * `zone` - Desired state of the zone
/// * `policy` - Deadline and retry settings
/// * `tracker` - Lifecycle tracker for this pair
///
/// # Errors
///
/// Returns an error if the zone uses something the provider cannot handle,
/// if the records cannot be fetched, or if the driver fails to plan.
/// Partial results are never returned.
pub async fn plan_zone_records(
    provider: &ProviderInstance,
    zone: &DomainConfig,
    policy: &CallPolicy,
    tracker: &mut PairTracker,
) -> Result<PlannedCorrections> {
    provider
        .capabilities
        .check_zone(zone, &provider.name, &provider.provider_type)?;

    let driver = &provider.driver;
    let mut existing = policy
        .read(&provider.name, "get_zone_records", || {
            driver.get_zone_records(&zone.name, &zone.metadata)
        })
        .await
        .with_context(|| format!("Failed to fetch records of '{}'", zone.unique_name))?;
    post_process_records(&mut existing, &zone.name);
    tracker.advance(TaskState::Diffing);

    let mut desired = zone.clone();
    let mut reports = Vec::new();
    if !provider.has(Capability::CanModifyApexNs) {
        let declared: Vec<String> = desired
            .records
            .iter()
            .filter(|r| is_apex_ns(r))
            .map(Record::target_combined)
            .filter(|target| !zone.nameservers.contains(target))
            .collect();
        if !declared.is_empty() {
            warn!(
                zone = %zone.unique_name,
                provider = %provider.name,
                "Provider cannot modify apex NS records, skipping them"
            );
            reports.push(Correction::report(format!(
                "WARNING: {} cannot modify apex NS records; skipping {}",
                provider.name,
                declared.join(", ")
            )));
        }
        desired.records.retain(|r| !is_apex_ns(r));
        existing.retain(|r| !is_apex_ns(r));
    }

    let planned = match tokio::time::timeout(
        policy.timeout,
        driver.get_zone_corrections(&mut desired, existing),
    )
    .await
    {
        Ok(result) => result?,
        Err(_) => {
            return Err(ProviderError::Timeout {
                provider: provider.name.clone(),
                operation: "get_zone_corrections".to_string(),
                timeout_secs: policy.timeout.as_secs(),
            }
            .into())
        }
    };

    let (driver_reports, corrections) = split_reports(planned.corrections);
    reports.extend(driver_reports);
    debug!(
        zone = %zone.unique_name,
        provider = %provider.name,
        reports = reports.len(),
        corrections = corrections.len(),
        changes = planned.actual_change_count,
        "Planned zone records"
    );

    Ok(PlannedCorrections {
        reports,
        corrections,
        change_count: planned.actual_change_count,
    })
}

#[cfg(test)]
#[path = "zone_records_tests.rs"]
mod zone_records_tests;
