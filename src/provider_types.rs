// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider type resolution.
//!
//! Every provider instance the configuration references has two possible
//! sources for its type id: the declaration in the IR and the `TYPE` key of
//! its credentials entry. They are reconciled with this table:
//!
//! | declared | credentials  | outcome                                  |
//! |----------|--------------|------------------------------------------|
//! | empty    | present      | credentials type                         |
//! | present  | empty        | declared type, forward-compat warning    |
//! | present  | equal        | declared type, redundancy notice         |
//! | present  | different    | fatal mismatch                           |
//! | any      | `-`          | fatal invalid credentials                |
//! | empty    | empty/absent | fatal, with a suggested credentials line |
//!
//! Resolution is deterministic: names are visited in sorted order and
//! messages are deduplicated.

use crate::constants::CREDS_INVALID_TYPE;
use crate::creds::CredsStore;
use crate::errors::TypeResolutionError;
use crate::models::DnsConfig;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{info, warn};

/// Severity of a non-fatal resolution message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        })
    }
}

/// A non-fatal message produced while resolving types.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TypeNotice {
    pub severity: Severity,
    pub text: String,
}

impl fmt::Display for TypeNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.text)
    }
}

/// Resolved provider types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeResolution {
    /// Provider instance name to type id
    pub types: BTreeMap<String, String>,
    /// Deduplicated notices, sorted
    pub notices: Vec<TypeNotice>,
}

/// Resolve one provider instance.
///
/// # Errors
///
/// Returns a [`TypeResolutionError`] for the fatal rows of the table.
pub fn resolve_one(
    name: &str,
    declared: &str,
    creds: &CredsStore,
) -> Result<(String, Option<TypeNotice>), TypeResolutionError> {
    let declared = declared.trim();
    let creds_type = creds.creds_type(name).map(str::trim);

    if creds_type == Some(CREDS_INVALID_TYPE) {
        return Err(TypeResolutionError::InvalidCreds {
            name: name.to_string(),
        });
    }

    match (declared.is_empty(), creds_type) {
        (true, Some(found)) => Ok((found.to_string(), None)),
        (true, None) => Err(TypeResolutionError::Missing {
            name: name.to_string(),
        }),
        (false, None) => Ok((
            declared.to_string(),
            Some(TypeNotice {
                severity: Severity::Warning,
                text: format!(
                    "creds entry \"{name}\" has no \"TYPE\"; add \"TYPE\": \"{declared}\" to stay compatible with future releases"
                ),
            }),
        )),
        (false, Some(found)) if found == declared => Ok((
            declared.to_string(),
            Some(TypeNotice {
                severity: Severity::Info,
                text: format!(
                    "provider \"{name}\" declares type \"{declared}\" which is redundant with its creds entry; the declaration can be removed"
                ),
            }),
        )),
        (false, Some(found)) => Err(TypeResolutionError::Mismatch {
            name: name.to_string(),
            declared_type: declared.to_string(),
            creds_type: found.to_string(),
        }),
    }
}

/// Resolve the type of every provider and registrar the configuration names.
///
/// Names come from the provider and registrar declarations plus every
/// provider and registrar a zone references.
///
/// # Errors
///
/// Returns all fatal outcomes, deduplicated, when any name cannot be resolved.
pub fn resolve_provider_types(
    config: &DnsConfig,
    creds: &CredsStore,
) -> Result<TypeResolution, Vec<TypeResolutionError>> {
    let mut names: BTreeSet<&str> = config
        .dns_providers
        .iter()
        .chain(config.registrars.iter())
        .map(|p| p.name.as_str())
        .collect();
    for domain in &config.domains {
        if !domain.registrar.is_empty() {
            names.insert(domain.registrar.as_str());
        }
        names.extend(domain.dns_provider_names.iter().map(|(n, _)| n.as_str()));
    }

    let mut resolution = TypeResolution::default();
    let mut notices = BTreeSet::new();
    let mut errors = Vec::new();

    for name in names {
        match resolve_one(name, config.declared_type(name), creds) {
            Ok((provider_type, notice)) => {
                resolution.types.insert(name.to_string(), provider_type);
                notices.extend(notice);
            }
            Err(e) => {
                if !errors.contains(&e) {
                    errors.push(e);
                }
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    resolution.notices = notices.into_iter().collect();
    for notice in &resolution.notices {
        match notice.severity {
            Severity::Warning => warn!("{}", notice.text),
            Severity::Info => info!("{}", notice.text),
        }
    }
    Ok(resolution)
}

#[cfg(test)]
#[path = "provider_types_tests.rs"]
mod provider_types_tests;
