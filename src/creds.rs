// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Credentials store.
//!
//! The credentials file maps a provider instance name to a flat string map.
//! The well-known key `TYPE` carries the provider type id; every other key is
//! provider-specific and handed to the driver untouched. Values that start
//! with `$` name an environment variable and are replaced at load time.
//!
//! JSON and YAML are both accepted; the format is picked from the file
//! extension (`.yaml` / `.yml` mean YAML, anything else JSON).

use crate::constants::{
    BIND_SERIAL_KEY, CREDS_NOTIFICATIONS_ENTRY, CREDS_TYPE_KEY, PROVIDER_TYPE_BIND,
    PROVIDER_TYPE_NONE,
};
use crate::errors::CredsError;
use crate::providers::ProviderConfig;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Entry names synthesized when the file does not define them.
const SYNTHESIZED: &[(&str, &str)] = &[("none", PROVIDER_TYPE_NONE), ("bind", PROVIDER_TYPE_BIND)];

/// Parsed and expanded credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredsStore {
    entries: BTreeMap<String, ProviderConfig>,
}

impl CredsStore {
    /// Read, parse and expand a credentials file.
    ///
    /// A missing file is not an error: the store then only holds the
    /// synthesized `none` and `bind` entries.
    ///
    /// # Errors
    ///
    /// Returns [`CredsError`] if the file cannot be read or parsed, or if a
    /// `$VAR` reference names an unset environment variable.
    pub async fn load(path: &Path) -> Result<Self, CredsError> {
        let shown = path.display().to_string();
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %shown, "Credentials file not found, using built-in entries only");
                return Ok(Self::with_defaults(BTreeMap::new()));
            }
            Err(source) => {
                return Err(CredsError::Io {
                    path: shown,
                    source,
                })
            }
        };

        let yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        let store = Self::parse(&shown, &text, yaml, |var| std::env::var(var).ok())?;
        debug!(path = %shown, entries = store.entries.len(), "Loaded credentials");
        Ok(store)
    }

    /// Parse credentials text and expand `$VAR` values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`CredsError::Parse`] on malformed input and
    /// [`CredsError::MissingEnv`] when `lookup` has no value for a reference.
    pub fn parse<F>(path: &str, text: &str, yaml: bool, lookup: F) -> Result<Self, CredsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw: BTreeMap<String, BTreeMap<String, ScalarValue>> = if yaml {
            serde_yaml::from_str(text).map_err(|e| CredsError::Parse {
                path: path.to_string(),
                reason: e.to_string(),
            })?
        } else {
            serde_json::from_str(text).map_err(|e| CredsError::Parse {
                path: path.to_string(),
                reason: e.to_string(),
            })?
        };

        let mut entries = BTreeMap::new();
        for (entry, fields) in raw {
            let mut config = ProviderConfig::new();
            for (key, value) in fields {
                let value = expand(&entry, &key, value.into_string(), &lookup)?;
                config.insert(key, value);
            }
            entries.insert(entry, config);
        }
        Ok(Self::with_defaults(entries))
    }

    fn with_defaults(mut entries: BTreeMap<String, ProviderConfig>) -> Self {
        for (name, provider_type) in SYNTHESIZED {
            entries.entry((*name).to_string()).or_insert_with(|| {
                ProviderConfig::from([(CREDS_TYPE_KEY.to_string(), (*provider_type).to_string())])
            });
        }
        Self { entries }
    }

    /// Configuration of one provider instance.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ProviderConfig> {
        self.entries.get(name)
    }

    /// `TYPE` recorded for `name`; `None` when the entry or the key is absent
    /// or the value is blank.
    #[must_use]
    pub fn creds_type(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|c| c.get(CREDS_TYPE_KEY))
            .map(String::as_str)
            .filter(|t| !t.trim().is_empty())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// The `notifications` entry, if any.
    #[must_use]
    pub fn notifications(&self) -> Option<&ProviderConfig> {
        self.get(CREDS_NOTIFICATIONS_ENTRY)
    }

    /// Forward `--bindserial` to every `BIND`-typed entry.
    pub fn inject_bind_serial(&mut self, serial: u32) {
        for (name, config) in &mut self.entries {
            let is_bind = config
                .get(CREDS_TYPE_KEY)
                .is_some_and(|t| t.eq_ignore_ascii_case(PROVIDER_TYPE_BIND));
            if is_bind {
                debug!(entry = %name, serial, "Injecting BIND serial");
                config.insert(BIND_SERIAL_KEY.to_string(), serial.to_string());
            }
        }
    }
}

fn expand<F>(entry: &str, key: &str, value: String, lookup: &F) -> Result<String, CredsError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(var) = value.strip_prefix('$') else {
        return Ok(value);
    };
    // A lone "$" is a literal value, not a reference.
    if var.is_empty() {
        return Ok(value);
    }
    lookup(var).ok_or_else(|| CredsError::MissingEnv {
        entry: entry.to_string(),
        key: key.to_string(),
        var: var.to_string(),
    })
}

/// Credentials files in the wild carry numbers and booleans next to strings;
/// everything is handed to drivers as text.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ScalarValue {
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl ScalarValue {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "creds_tests.rs"]
mod creds_tests;
