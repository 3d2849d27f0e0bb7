// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the reconciliation engine.
//!
//! This module provides specialized error types for:
//! - Record data validation (typed setters and IR loading)
//! - Desired-state validation (CNAME exclusivity, duplicates)
//! - Differ safety checks against unmanaged patterns
//! - Provider calls (transient, permanent, deadlines, panics)
//! - Provider capability negotiation
//! - Provider-type resolution against the credentials store
//!
//! Errors are collected per (zone, provider) pair; none of them abort sibling work.

use thiserror::Error;

/// Errors raised while building or normalizing a single record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Record data failed validation (malformed IP, bad numeric field, unknown CAA tag)
    #[error("Invalid {rtype} record data for '{label}': {reason}")]
    InvalidRecordData {
        /// The record label (e.g., "www", "@")
        label: String,
        /// The record type being set
        rtype: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// A label or target is not a valid DNS name
    #[error("Invalid DNS name '{name}': {reason}")]
    InvalidName {
        /// The offending name
        name: String,
        /// Parser diagnostic
        reason: String,
    },

    /// Record type string could not be parsed
    #[error("Unknown record type '{0}'")]
    UnknownType(String),
}

/// Errors found while validating a zone's desired state before any provider is contacted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A CNAME shares its label with another record
    #[error("Zone '{zone}': CNAME at '{label}' cannot coexist with other records ({others})")]
    CnameConflict {
        /// Zone name
        zone: String,
        /// Offending label
        label: String,
        /// Other record types at the label
        others: String,
    },

    /// Two CNAME records share a label
    #[error("Zone '{zone}': multiple CNAME records at '{label}'")]
    DuplicateCname {
        /// Zone name
        zone: String,
        /// Offending label
        label: String,
    },

    /// CNAME at the zone apex
    #[error("Zone '{zone}': CNAME is not allowed at the apex")]
    ApexCname {
        /// Zone name
        zone: String,
    },

    /// The same record appears twice in the desired state
    #[error("Zone '{zone}': duplicate record {label} {rtype} {target}")]
    DuplicateRecord {
        /// Zone name
        zone: String,
        /// Record label
        label: String,
        /// Record type
        rtype: String,
        /// Rendered target
        target: String,
    },

    /// Zone references a provider or registrar that the IR does not declare
    #[error("Zone '{zone}' references undeclared {role} '{name}'")]
    UnknownProvider {
        /// Zone name
        zone: String,
        /// "DNS provider" or "registrar"
        role: &'static str,
        /// Provider instance name
        name: String,
    },
}

/// Errors produced by the differ.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiffError {
    /// A desired record collides with an existing record that an unmanaged pattern hides
    #[error(
        "desired record collides with an ignored record: {label} {rtype} {target} (zone '{zone}')"
    )]
    UnmanagedCollision {
        /// Zone name
        zone: String,
        /// Record label
        label: String,
        /// Record type
        rtype: String,
        /// Rendered target of the desired record
        target: String,
    },

    /// An unmanaged pattern could not be compiled
    #[error("Invalid unmanaged pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The glob text
        pattern: String,
        /// Parser diagnostic
        reason: String,
    },
}

/// Errors returned by provider drivers.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Network failure, rate limit or 5xx response; safe to retry
    #[error("Provider '{provider}' transient failure during {operation}: {reason}")]
    Transient {
        /// Provider instance name
        provider: String,
        /// Operation being performed (e.g., "get_zone_records")
        operation: String,
        /// Reason for the failure
        reason: String,
    },

    /// Authentication, not-found or 4xx; never retried
    #[error("Provider '{provider}' failed during {operation}: {reason}")]
    Permanent {
        /// Provider instance name
        provider: String,
        /// Operation being performed
        operation: String,
        /// Reason for the failure
        reason: String,
    },

    /// The per-call deadline elapsed
    #[error("Provider '{provider}' timed out during {operation} after {timeout_secs}s")]
    Timeout {
        /// Provider instance name
        provider: String,
        /// Operation being performed
        operation: String,
        /// Deadline in seconds
        timeout_secs: u64,
    },

    /// The driver panicked; caught at the task boundary
    #[error("Provider '{provider}' panicked on zone '{zone}': {reason}")]
    Panicked {
        /// Provider instance name
        provider: String,
        /// Zone being planned or corrected
        zone: String,
        /// Panic payload, when it was a string
        reason: String,
    },

    /// The driver does not implement the requested optional operation
    #[error("Provider '{provider}' does not support {operation}")]
    Unsupported {
        /// Provider instance name
        provider: String,
        /// Operation requested
        operation: String,
    },
}

impl ProviderError {
    /// Returns true if this error is transient and the call should be retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transient { .. } | Self::Timeout { .. } => true,
            Self::Permanent { .. } | Self::Panicked { .. } | Self::Unsupported { .. } => false,
        }
    }

    /// Short category used as a metrics label.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transient { .. } => "transient",
            Self::Permanent { .. } => "permanent",
            Self::Timeout { .. } => "timeout",
            Self::Panicked { .. } => "panicked",
            Self::Unsupported { .. } => "unsupported",
        }
    }
}

/// Desired state uses a feature the provider does not declare.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// Record kind not supported
    #[error("Provider '{provider}' ({provider_type}) does not support {rtype} records (zone '{zone}')")]
    UnsupportedRecordType {
        /// Provider instance name
        provider: String,
        /// Provider type id
        provider_type: String,
        /// Record type
        rtype: String,
        /// Zone name
        zone: String,
    },

    /// Some other declared feature is missing
    #[error("Provider '{provider}' ({provider_type}) cannot handle {feature} (zone '{zone}')")]
    UnsupportedFeature {
        /// Provider instance name
        provider: String,
        /// Provider type id
        provider_type: String,
        /// Feature description
        feature: String,
        /// Zone name
        zone: String,
    },
}

/// Fatal outcomes of reconciling declared provider types with the credentials store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeResolutionError {
    /// IR and credentials disagree
    #[error(
        "Mismatch found! creds entry \"{name}\" has \"TYPE\" set to \"{creds_type}\" but the configuration declares \"{declared_type}\""
    )]
    Mismatch {
        /// Provider instance name
        name: String,
        /// Type declared in the IR
        declared_type: String,
        /// Type recorded in credentials
        creds_type: String,
    },

    /// Credentials entry explicitly marked invalid
    #[error("creds entry \"{name}\" has invalid \"TYPE\" value \"-\"")]
    InvalidCreds {
        /// Provider instance name
        name: String,
    },

    /// Neither source names a type, or the credentials entry is missing
    #[error(
        "creds entry \"{name}\" is missing or has no \"TYPE\"; add: \"{name}\": {{ \"TYPE\": \"FILL_IN_PROVIDER_TYPE\" }}"
    )]
    Missing {
        /// Provider instance name
        name: String,
    },
}

/// Errors loading or expanding the credentials store.
#[derive(Error, Debug)]
pub enum CredsError {
    /// The file could not be read
    #[error("Failed to read credentials file {path}: {source}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file could not be parsed
    #[error("Failed to parse credentials file {path}: {reason}")]
    Parse {
        /// Path that was parsed
        path: String,
        /// Parser diagnostic
        reason: String,
    },

    /// A `$VAR` reference names an unset environment variable
    #[error("creds entry \"{entry}\" key \"{key}\" references unset environment variable ${var}")]
    MissingEnv {
        /// Credentials entry name
        entry: String,
        /// Key within the entry
        key: String,
        /// Environment variable name
        var: String,
    },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
