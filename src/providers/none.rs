// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `NONE` provider: serves nothing and changes nothing.
//!
//! Used as the registrar of zones whose delegation is managed elsewhere, and
//! as a placeholder DNS provider.

use super::{
    Capability, CapabilitySet, DnsProvider, ProviderConfig, Registrar, ZoneCorrections,
};
use crate::errors::ProviderError;
use crate::models::{Correction, DomainConfig, Record};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The no-op driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneProvider;

/// Everything is "supported" because nothing is ever sent anywhere.
#[must_use]
pub fn capabilities() -> CapabilitySet {
    CapabilitySet::new([
        Capability::CanConcur,
        Capability::CanUseAlias,
        Capability::CanUseCaa,
        Capability::CanUseDnskey,
        Capability::CanUseDs,
        Capability::CanUseHttps,
        Capability::CanUseLoc,
        Capability::CanUseNaptr,
        Capability::CanUsePtr,
        Capability::CanUseSrv,
        Capability::CanUseSshfp,
        Capability::CanUseSvcb,
        Capability::CanUseTlsa,
        Capability::CanUseTxtMulti,
        Capability::CanModifyApexNs,
        Capability::DocDualHost,
    ])
}

/// # Errors
///
/// Never fails.
pub fn new_dns(_name: &str, _config: &ProviderConfig) -> anyhow::Result<Arc<dyn DnsProvider>> {
    Ok(Arc::new(NoneProvider))
}

/// # Errors
///
/// Never fails.
pub fn new_registrar(_name: &str, _config: &ProviderConfig) -> anyhow::Result<Arc<dyn Registrar>> {
    Ok(Arc::new(NoneProvider))
}

#[async_trait]
impl DnsProvider for NoneProvider {
    async fn get_nameservers(&self, _domain: &str) -> Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }

    async fn get_zone_records(
        &self,
        _domain: &str,
        _meta: &BTreeMap<String, String>,
    ) -> Result<Vec<Record>, ProviderError> {
        Ok(Vec::new())
    }

    async fn get_zone_corrections(
        &self,
        _zone: &mut DomainConfig,
        _existing: Vec<Record>,
    ) -> anyhow::Result<ZoneCorrections> {
        Ok(ZoneCorrections::default())
    }
}

#[async_trait]
impl Registrar for NoneProvider {
    async fn get_registrar_corrections(
        &self,
        _zone: &DomainConfig,
    ) -> anyhow::Result<Vec<Correction>> {
        Ok(Vec::new())
    }
}
