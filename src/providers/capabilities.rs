// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider capability declarations.
//!
//! Drivers declare a [`CapabilitySet`] when they register. The core checks
//! set membership before handing a zone to a driver; it never queries a driver
//! to discover what it can do.

use crate::errors::CapabilityError;
use crate::models::{DomainConfig, RecordData, RecordType};
use std::collections::BTreeSet;
use std::fmt;

/// One optional feature a driver may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Can enumerate the zones it serves
    CanGetZones,
    /// Safe to plan concurrently with other zones
    CanConcur,
    CanUseAlias,
    CanUseCaa,
    CanUseDnskey,
    CanUseDs,
    CanUseHttps,
    CanUseLoc,
    CanUseNaptr,
    CanUsePtr,
    CanUseSrv,
    CanUseSshfp,
    CanUseSvcb,
    CanUseTlsa,
    /// TXT records with more than one string
    CanUseTxtMulti,
    /// Accepts edits to the apex NS RRset
    CanModifyApexNs,
    /// Refuses NO_PURGE zones
    CantUseNoPurge,
    /// Can act as one of several providers for a zone
    DocDualHost,
    /// Can create zones on demand
    DocCreateDomains,
}

impl Capability {
    /// Capability a record type requires, if any.
    #[must_use]
    pub fn required_for(rtype: &RecordType) -> Option<Self> {
        Some(match rtype {
            RecordType::ALIAS => Self::CanUseAlias,
            RecordType::CAA => Self::CanUseCaa,
            RecordType::DNSKEY => Self::CanUseDnskey,
            RecordType::DS => Self::CanUseDs,
            RecordType::HTTPS => Self::CanUseHttps,
            RecordType::LOC => Self::CanUseLoc,
            RecordType::NAPTR => Self::CanUseNaptr,
            RecordType::PTR => Self::CanUsePtr,
            RecordType::SRV => Self::CanUseSrv,
            RecordType::SSHFP => Self::CanUseSshfp,
            RecordType::SVCB => Self::CanUseSvcb,
            RecordType::TLSA => Self::CanUseTlsa,
            _ => return None,
        })
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Set of capabilities declared by one provider type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    #[must_use]
    pub fn new(caps: impl IntoIterator<Item = Capability>) -> Self {
        Self(caps.into_iter().collect())
    }

    #[must_use]
    pub fn has(&self, cap: Capability) -> bool {
        self.0.contains(&cap)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    /// Check that the zone only uses what this set declares.
    ///
    /// # Errors
    ///
    /// Returns the first unsupported record type or feature found.
    pub fn check_zone(
        &self,
        zone: &DomainConfig,
        provider: &str,
        provider_type: &str,
    ) -> Result<(), CapabilityError> {
        if zone.keep_unknown && self.has(Capability::CantUseNoPurge) {
            return Err(CapabilityError::UnsupportedFeature {
                provider: provider.to_string(),
                provider_type: provider_type.to_string(),
                feature: "NO_PURGE".to_string(),
                zone: zone.unique_name.clone(),
            });
        }

        for record in &zone.records {
            let rtype = record.rtype();
            if let Some(cap) = Capability::required_for(&rtype) {
                if !self.has(cap) {
                    return Err(CapabilityError::UnsupportedRecordType {
                        provider: provider.to_string(),
                        provider_type: provider_type.to_string(),
                        rtype: rtype.to_string(),
                        zone: zone.unique_name.clone(),
                    });
                }
            }
            if let RecordData::TXT(strings) = &record.data {
                if strings.len() > 1 && !self.has(Capability::CanUseTxtMulti) {
                    return Err(CapabilityError::UnsupportedFeature {
                        provider: provider.to_string(),
                        provider_type: provider_type.to_string(),
                        feature: format!("multi-string TXT at '{}'", record.name),
                        zone: zone.unique_name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        Self::new(iter)
    }
}
