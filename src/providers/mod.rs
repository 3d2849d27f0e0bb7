// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider abstraction.
//!
//! A provider driver is an implementation of [`DnsProvider`] (and, for
//! registrars, [`Registrar`]). Optional operations (listing, creating and
//! deleting zones) are separate traits a driver exposes through the `as_*`
//! accessors; the core asks for them and degrades gracefully when a driver
//! returns `None`.
//!
//! The core only ever sees [`Record`] and [`Correction`] values. Native
//! payloads stay inside the driver (see [`Record::original`]).

pub mod capabilities;
pub mod memory;
pub mod none;
pub mod registry;

pub use capabilities::{Capability, CapabilitySet};
pub use registry::{ProviderConfig, ProviderRegistry, Registration};

use crate::errors::ProviderError;
use crate::models::{Correction, DomainConfig, Record};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Corrections produced for one (zone, provider).
#[derive(Debug, Default)]
pub struct ZoneCorrections {
    pub corrections: Vec<Correction>,
    /// Actionable changes; excludes report-only entries
    pub actual_change_count: usize,
}

/// A DNS service provider driver.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Nameservers this provider wants advertised for `domain`.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] if the provider cannot be reached.
    async fn get_nameservers(&self, domain: &str) -> Result<Vec<String>, ProviderError>;

    /// Records currently served for `domain`.
    ///
    /// # Arguments
    ///
    /// * `domain` - Zone name without tag
    /// * `meta` - Zone metadata from the IR
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] if the records cannot be fetched.
    async fn get_zone_records(
        &self,
        domain: &str,
        meta: &BTreeMap<String, String>,
    ) -> Result<Vec<Record>, ProviderError>;

    /// Translate the difference between `existing` and `zone` into corrections.
    ///
    /// `zone` is a private copy; the driver may normalize it (TTL clamping,
    /// field adjustments) before diffing. Returns no corrections when the zone
    /// is already in the desired state.
    ///
    /// # Errors
    ///
    /// Errors are fatal for this (zone, provider) pair only.
    async fn get_zone_corrections(
        &self,
        zone: &mut DomainConfig,
        existing: Vec<Record>,
    ) -> anyhow::Result<ZoneCorrections>;

    fn as_zone_lister(&self) -> Option<&dyn ZoneLister> {
        None
    }

    fn as_zone_creator(&self) -> Option<&dyn ZoneCreator> {
        None
    }

    fn as_zone_deleter(&self) -> Option<&dyn ZoneDeleter> {
        None
    }
}

/// Drivers that can enumerate their zones.
#[async_trait]
pub trait ZoneLister: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`ProviderError`] if the zone list cannot be fetched.
    async fn list_zones(&self) -> Result<Vec<String>, ProviderError>;
}

/// Drivers that can create zones.
#[async_trait]
pub trait ZoneCreator: Send + Sync {
    /// Create `domain` if it does not exist. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] if creation fails.
    async fn ensure_zone_exists(&self, domain: &str) -> Result<(), ProviderError>;
}

/// Drivers that can delete zones.
#[async_trait]
pub trait ZoneDeleter: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`ProviderError`] if deletion fails.
    async fn delete_zone(&self, domain: &str) -> Result<(), ProviderError>;
}

/// A registrar driver.
#[async_trait]
pub trait Registrar: Send + Sync {
    /// Corrections that bring the zone's delegation in line with
    /// `zone.nameservers`.
    ///
    /// # Errors
    ///
    /// Returns an error if the current delegation cannot be read.
    async fn get_registrar_corrections(
        &self,
        zone: &DomainConfig,
    ) -> anyhow::Result<Vec<Correction>>;
}

/// A configured DNS provider, attached to a zone.
#[derive(Clone)]
pub struct ProviderInstance {
    /// Name used in the IR and the credentials store
    pub name: String,
    pub provider_type: String,
    pub driver: Arc<dyn DnsProvider>,
    /// Selected when `--providers` is empty
    pub is_default: bool,
    pub capabilities: CapabilitySet,
    /// Nameservers to advertise for the zone; `-1` means all
    pub nameserver_count: i32,
}

impl ProviderInstance {
    /// Copy of this instance with the zone's nameserver count.
    #[must_use]
    pub fn for_zone(&self, nameserver_count: i32) -> Self {
        Self {
            nameserver_count,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn has(&self, cap: Capability) -> bool {
        self.capabilities.has(cap)
    }
}

impl fmt::Debug for ProviderInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderInstance")
            .field("name", &self.name)
            .field("provider_type", &self.provider_type)
            .field("is_default", &self.is_default)
            .field("nameserver_count", &self.nameserver_count)
            .finish_non_exhaustive()
    }
}

/// A configured registrar.
#[derive(Clone)]
pub struct RegistrarInstance {
    pub name: String,
    pub provider_type: String,
    pub driver: Arc<dyn Registrar>,
}

impl fmt::Debug for RegistrarInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrarInstance")
            .field("name", &self.name)
            .field("provider_type", &self.provider_type)
            .finish_non_exhaustive()
    }
}
