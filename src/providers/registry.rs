// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider type registry.
//!
//! The registry maps a provider type id (`"NONE"`, `"INMEMORY"`, ...) to its
//! capability set and constructors. It is built once at startup and passed
//! to the orchestrator explicitly; nothing registers into global state.

use super::{
    memory, none, CapabilitySet, DnsProvider, ProviderInstance, Registrar, RegistrarInstance,
};
use crate::constants::{CREDS_EXCLUDE_FROM_DEFAULTS_KEY, PROVIDER_TYPE_INMEMORY, PROVIDER_TYPE_NONE};
use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Credentials entry of one provider instance, after `$VAR` substitution.
pub type ProviderConfig = BTreeMap<String, String>;

/// Constructor for the DNS-provider role.
pub type DnsInitializer =
    Arc<dyn Fn(&str, &ProviderConfig) -> Result<Arc<dyn DnsProvider>> + Send + Sync>;

/// Constructor for the registrar role.
pub type RegistrarInitializer =
    Arc<dyn Fn(&str, &ProviderConfig) -> Result<Arc<dyn Registrar>> + Send + Sync>;

/// One registered provider type.
#[derive(Clone)]
pub struct Registration {
    pub type_name: String,
    pub capabilities: CapabilitySet,
    pub dns: Option<DnsInitializer>,
    pub registrar: Option<RegistrarInitializer>,
}

/// Table of provider types known to this run.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    entries: HashMap<String, Registration>,
}

impl ProviderRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in `NONE` and `INMEMORY` types.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Registration {
            type_name: PROVIDER_TYPE_NONE.to_string(),
            capabilities: none::capabilities(),
            dns: Some(Arc::new(none::new_dns)),
            registrar: Some(Arc::new(none::new_registrar)),
        });
        registry.register(Registration {
            type_name: PROVIDER_TYPE_INMEMORY.to_string(),
            capabilities: memory::capabilities(),
            dns: Some(Arc::new(memory::new_dns)),
            registrar: Some(Arc::new(memory::new_registrar)),
        });
        registry
    }

    /// Add or replace a provider type.
    pub fn register(&mut self, registration: Registration) {
        debug!(provider_type = %registration.type_name, "Registered provider type");
        self.entries
            .insert(registration.type_name.clone(), registration);
    }

    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&Registration> {
        self.entries.get(type_name)
    }

    /// Registered type ids, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Construct a DNS provider instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is unknown, has no DNS role, or its
    /// constructor rejects the configuration.
    pub fn create_dns_provider(
        &self,
        type_name: &str,
        name: &str,
        config: &ProviderConfig,
    ) -> Result<ProviderInstance> {
        let registration = self
            .get(type_name)
            .ok_or_else(|| anyhow!("Provider type '{type_name}' (used by '{name}') is not registered"))?;
        let init = registration
            .dns
            .as_ref()
            .ok_or_else(|| anyhow!("Provider type '{type_name}' cannot act as a DNS provider"))?;

        Ok(ProviderInstance {
            name: name.to_string(),
            provider_type: type_name.to_string(),
            driver: init(name, config)?,
            is_default: !config
                .get(CREDS_EXCLUDE_FROM_DEFAULTS_KEY)
                .is_some_and(|v| v.eq_ignore_ascii_case("true")),
            capabilities: registration.capabilities.clone(),
            nameserver_count: -1,
        })
    }

    /// Construct a registrar instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is unknown, has no registrar role, or its
    /// constructor rejects the configuration.
    pub fn create_registrar(
        &self,
        type_name: &str,
        name: &str,
        config: &ProviderConfig,
    ) -> Result<RegistrarInstance> {
        let registration = self
            .get(type_name)
            .ok_or_else(|| anyhow!("Registrar type '{type_name}' (used by '{name}') is not registered"))?;
        let init = registration
            .registrar
            .as_ref()
            .ok_or_else(|| anyhow!("Provider type '{type_name}' cannot act as a registrar"))?;

        Ok(RegistrarInstance {
            name: name.to_string(),
            provider_type: type_name.to_string(),
            driver: init(name, config)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::Capability;

    #[test]
    fn test_builtin_types() {
        let registry = ProviderRegistry::with_builtin();
        assert_eq!(registry.type_names(), vec!["INMEMORY", "NONE"]);
        assert!(registry
            .get("INMEMORY")
            .unwrap()
            .capabilities
            .has(Capability::CanGetZones));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let registry = ProviderRegistry::with_builtin();
        let err = registry
            .create_dns_provider("GANDI", "gandi", &ProviderConfig::new())
            .unwrap_err();
        assert!(err.to_string().contains("GANDI"));
    }

    #[test]
    fn test_exclude_from_defaults() {
        let registry = ProviderRegistry::with_builtin();
        let config = ProviderConfig::from([(
            CREDS_EXCLUDE_FROM_DEFAULTS_KEY.to_string(),
            "true".to_string(),
        )]);

        let excluded = registry
            .create_dns_provider("NONE", "quiet", &config)
            .unwrap();
        let included = registry
            .create_dns_provider("NONE", "loud", &ProviderConfig::new())
            .unwrap();

        assert!(!excluded.is_default);
        assert!(included.is_default);
    }

    #[test]
    fn test_registrar_role() {
        let registry = ProviderRegistry::with_builtin();
        let registrar = registry
            .create_registrar("NONE", "none", &ProviderConfig::new())
            .unwrap();
        assert_eq!(registrar.provider_type, "NONE");
    }
}
