// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for one run.
//!
//! Built once at startup from the IR, the credentials store and the provider
//! registry. Everything in it is immutable afterwards except the zone cache,
//! which has its own synchronization.
//!
//! The context provides:
//! - Provider and registrar instances, keyed by instance name
//! - Typed zones, in IR order
//! - The per-run zone cache

use crate::creds::CredsStore;
use crate::models::{DnsConfig, DomainConfig};
use crate::provider_types::{resolve_provider_types, TypeNotice};
use crate::providers::{ProviderConfig, ProviderInstance, ProviderRegistry, RegistrarInstance};
use crate::zone_cache::ZoneCache;
use anyhow::{anyhow, Context as _, Result};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Shared context passed to the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// DNS provider instances declared in the IR
    pub providers: BTreeMap<String, ProviderInstance>,

    /// Registrar instances declared in the IR
    pub registrars: BTreeMap<String, RegistrarInstance>,

    /// Desired zones, in IR order
    pub zones: Vec<DomainConfig>,

    /// Zone lists fetched from providers during this run
    pub cache: ZoneCache,

    /// Non-fatal provider type messages
    pub type_notices: Vec<TypeNotice>,
}

impl Context {
    /// Resolve provider types, construct every declared instance and convert
    /// the IR zones.
    ///
    /// # Errors
    ///
    /// Returns an error if any provider type cannot be resolved, a driver
    /// rejects its configuration, or a zone in the IR is ill-formed.
    pub fn build(
        config: &DnsConfig,
        creds: &CredsStore,
        registry: &ProviderRegistry,
    ) -> Result<Self> {
        let resolution = resolve_provider_types(config, creds).map_err(|errors| {
            let lines: Vec<String> = errors.iter().map(|e| format!("  - {e}")).collect();
            anyhow!("Provider type resolution failed:\n{}", lines.join("\n"))
        })?;
        let empty = ProviderConfig::new();

        let mut providers = BTreeMap::new();
        for decl in &config.dns_providers {
            let provider_type = resolution
                .types
                .get(&decl.name)
                .ok_or_else(|| anyhow!("No type resolved for DNS provider '{}'", decl.name))?;
            let instance = registry
                .create_dns_provider(
                    provider_type,
                    &decl.name,
                    creds.get(&decl.name).unwrap_or(&empty),
                )
                .with_context(|| format!("Failed to initialize DNS provider '{}'", decl.name))?;
            debug!(
                provider = %decl.name,
                provider_type = %provider_type,
                is_default = instance.is_default,
                "Initialized DNS provider"
            );
            providers.insert(decl.name.clone(), instance);
        }

        let mut registrars = BTreeMap::new();
        for decl in &config.registrars {
            let provider_type = resolution
                .types
                .get(&decl.name)
                .ok_or_else(|| anyhow!("No type resolved for registrar '{}'", decl.name))?;
            let instance = registry
                .create_registrar(
                    provider_type,
                    &decl.name,
                    creds.get(&decl.name).unwrap_or(&empty),
                )
                .with_context(|| format!("Failed to initialize registrar '{}'", decl.name))?;
            debug!(registrar = %decl.name, provider_type = %provider_type, "Initialized registrar");
            registrars.insert(decl.name.clone(), instance);
        }

        let zones = config
            .domains
            .iter()
            .map(|ir| {
                DomainConfig::from_ir(ir).with_context(|| format!("Invalid zone '{}'", ir.name))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            providers = providers.len(),
            registrars = registrars.len(),
            zones = zones.len(),
            "Loaded configuration"
        );

        Ok(Self {
            providers,
            registrars,
            zones,
            cache: ZoneCache::new(),
            type_notices: resolution.notices,
        })
    }

    /// Names of the declared DNS providers.
    #[must_use]
    pub fn provider_names(&self) -> BTreeSet<String> {
        self.providers.keys().cloned().collect()
    }

    /// Names of the declared registrars.
    #[must_use]
    pub fn registrar_names(&self) -> BTreeSet<String> {
        self.registrars.keys().cloned().collect()
    }

    /// Zone names (without tag) attached to `provider` in the IR.
    #[must_use]
    pub fn zones_of(&self, provider: &str) -> BTreeSet<String> {
        self.zones
            .iter()
            .filter(|z| z.provider_names().any(|p| p == provider))
            .map(|z| z.name.clone())
            .collect()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
