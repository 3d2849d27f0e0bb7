// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed per-record provider hints.
//!
//! The IR carries record metadata as a flat string map. Well-known keys are
//! lifted into typed fields here; anything else lands in [`RecordMeta::extra`]
//! for driver-private use.

use crate::constants::{
    META_COMMENT, META_ORIGINAL_IP, META_PROXY, META_REDIRECT_PATTERN, META_REDIRECT_REPLACEMENT,
    META_TAGS,
};
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

/// Proxy state for providers that front records with a CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyState {
    On,
    Off,
    Full,
}

impl ProxyState {
    fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "on" | "true" => Ok(Self::On),
            "off" | "false" => Ok(Self::Off),
            "full" => Ok(Self::Full),
            other => Err(format!("invalid proxy state '{other}' (expected on, off or full)")),
        }
    }
}

impl fmt::Display for ProxyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Full => "full",
        })
    }
}

/// Pattern/replacement pair for redirect pseudo-records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Redirect {
    pub pattern: String,
    pub replacement: String,
}

/// Provider hints attached to a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordMeta {
    pub proxy: Option<ProxyState>,
    pub comment: Option<String>,
    pub tags: Vec<String>,
    pub original_ip: Option<IpAddr>,
    pub redirect: Option<Redirect>,
    /// Driver-private keys
    pub extra: BTreeMap<String, String>,
}

impl RecordMeta {
    /// Lift well-known keys out of an IR metadata map.
    ///
    /// # Errors
    ///
    /// Returns the reason when a well-known key has an unparseable value.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, String> {
        let mut meta = Self::default();
        let mut pattern = None;
        let mut replacement = None;

        for (key, value) in map {
            match key.as_str() {
                META_PROXY => meta.proxy = Some(ProxyState::parse(value)?),
                META_COMMENT => meta.comment = Some(value.clone()),
                META_TAGS => {
                    meta.tags = value
                        .split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(String::from)
                        .collect();
                    meta.tags.sort();
                }
                META_ORIGINAL_IP => {
                    meta.original_ip = Some(
                        value
                            .parse()
                            .map_err(|_| format!("invalid {META_ORIGINAL_IP} '{value}'"))?,
                    );
                }
                META_REDIRECT_PATTERN => pattern = Some(value.clone()),
                META_REDIRECT_REPLACEMENT => replacement = Some(value.clone()),
                _ => {
                    meta.extra.insert(key.clone(), value.clone());
                }
            }
        }

        meta.redirect = match (pattern, replacement) {
            (Some(pattern), Some(replacement)) => Some(Redirect {
                pattern,
                replacement,
            }),
            (None, None) => None,
            _ => {
                return Err(format!(
                    "{META_REDIRECT_PATTERN} and {META_REDIRECT_REPLACEMENT} must be set together"
                ))
            }
        };

        Ok(meta)
    }

    /// Flatten back into the IR metadata map.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = self.extra.clone();
        if let Some(proxy) = self.proxy {
            map.insert(META_PROXY.to_string(), proxy.to_string());
        }
        if let Some(comment) = &self.comment {
            map.insert(META_COMMENT.to_string(), comment.clone());
        }
        if !self.tags.is_empty() {
            map.insert(META_TAGS.to_string(), self.tags.join(","));
        }
        if let Some(ip) = self.original_ip {
            map.insert(META_ORIGINAL_IP.to_string(), ip.to_string());
        }
        if let Some(redirect) = &self.redirect {
            map.insert(META_REDIRECT_PATTERN.to_string(), redirect.pattern.clone());
            map.insert(
                META_REDIRECT_REPLACEMENT.to_string(),
                redirect.replacement.clone(),
            );
        }
        map
    }

    /// True when no hint is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_map_lifts_known_keys() {
        let map = BTreeMap::from([
            ("cloudflare_proxy".to_string(), "ON".to_string()),
            ("tags".to_string(), "web, prod".to_string()),
            ("custom".to_string(), "x".to_string()),
        ]);

        let meta = RecordMeta::from_map(&map).unwrap();

        assert_eq!(meta.proxy, Some(ProxyState::On));
        assert_eq!(meta.tags, vec!["prod".to_string(), "web".to_string()]);
        assert_eq!(meta.extra.get("custom").map(String::as_str), Some("x"));
    }

    #[test]
    fn test_invalid_proxy_rejected() {
        let map = BTreeMap::from([("cloudflare_proxy".to_string(), "maybe".to_string())]);
        assert!(RecordMeta::from_map(&map).is_err());
    }

    #[test]
    fn test_redirect_requires_both_keys() {
        let map = BTreeMap::from([("redirect_pattern".to_string(), "a/*".to_string())]);
        assert!(RecordMeta::from_map(&map).is_err());
    }

    #[test]
    fn test_to_map_round_trips() {
        let map = BTreeMap::from([
            ("comment".to_string(), "managed".to_string()),
            ("original_ip".to_string(), "10.0.0.1".to_string()),
        ]);
        let meta = RecordMeta::from_map(&map).unwrap();
        assert_eq!(meta.to_map(), map);
    }
}
