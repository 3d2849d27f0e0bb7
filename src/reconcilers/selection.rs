// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `--domains` and `--providers` filters.
//!
//! # Domain filter
//!
//! A comma-separated list. Empty or `all` selects every zone. For split-horizon
//! zones (`name!tag`):
//!
//! | filter     | selects                          |
//! |------------|----------------------------------|
//! | `name`     | the untagged variant only        |
//! | `name!`    | the untagged variant only        |
//! | `name!*`   | every tagged variant             |
//! | `name!tag` | exactly that variant             |
//!
//! # Provider filter
//!
//! `all` selects every provider, empty selects providers marked as defaults,
//! anything else is a comma-separated list of instance names.

use crate::constants::{FILTER_ALL, TAG_SEPARATOR};
use crate::models::{canonical_zone, DomainConfig};
use crate::providers::ProviderInstance;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum DomainTerm {
    Untagged(String),
    AnyTag(String),
    Tag(String, String),
}

/// Parsed `--domains` value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainFilter {
    /// Empty means everything
    terms: Vec<DomainTerm>,
}

impl DomainFilter {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut terms = Vec::new();
        for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if item.eq_ignore_ascii_case(FILTER_ALL) {
                return Self::default();
            }
            let term = match item.split_once(TAG_SEPARATOR) {
                None | Some((_, "")) => DomainTerm::Untagged(canonical_zone(
                    item.trim_end_matches(TAG_SEPARATOR),
                )),
                Some((name, "*")) => DomainTerm::AnyTag(canonical_zone(name)),
                Some((name, tag)) => DomainTerm::Tag(canonical_zone(name), tag.to_string()),
            };
            terms.push(term);
        }
        Self { terms }
    }

    #[must_use]
    pub fn selects_all(&self) -> bool {
        self.terms.is_empty()
    }

    #[must_use]
    pub fn matches(&self, zone: &DomainConfig) -> bool {
        self.selects_all()
            || self.terms.iter().any(|term| match (term, &zone.tag) {
                (DomainTerm::Untagged(name), None) => *name == zone.name,
                (DomainTerm::AnyTag(name), Some(_)) => *name == zone.name,
                (DomainTerm::Tag(name, tag), Some(zone_tag)) => {
                    *name == zone.name && tag == zone_tag
                }
                _ => false,
            })
    }
}

/// Parsed `--providers` value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProviderFilter {
    All,
    #[default]
    Defaults,
    Named(Vec<String>),
}

impl ProviderFilter {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let names: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if names.is_empty() {
            Self::Defaults
        } else if names.iter().any(|n| n.eq_ignore_ascii_case(FILTER_ALL)) {
            Self::All
        } else {
            Self::Named(names)
        }
    }

    #[must_use]
    pub fn selects(&self, provider: &ProviderInstance) -> bool {
        match self {
            Self::All => true,
            Self::Defaults => provider.is_default,
            Self::Named(names) => names.iter().any(|n| *n == provider.name),
        }
    }

    /// Registrars are not marked as defaults; they are skipped only when an
    /// explicit list leaves them out.
    #[must_use]
    pub fn selects_registrar(&self, name: &str) -> bool {
        match self {
            Self::All | Self::Defaults => true,
            Self::Named(names) => names.iter().any(|n| n == name),
        }
    }
}

impl fmt::Display for ProviderFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(FILTER_ALL),
            Self::Defaults => f.write_str("(defaults)"),
            Self::Named(names) => f.write_str(&names.join(",")),
        }
    }
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod selection_tests;
