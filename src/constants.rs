// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the reconciliation engine.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Record Constants
// ============================================================================

/// Label that denotes the zone apex
pub const APEX_LABEL: &str = "@";

/// TTL value meaning "use the provider default"
pub const PROVIDER_DEFAULT_TTL: u32 = 0;

/// TTL given to IR records that do not set one (5 minutes)
pub const DEFAULT_RECORD_TTL_SECS: u32 = 300;

/// Default TTL applied to apex NS records synthesized from nameservers (5 minutes)
pub const DEFAULT_NS_TTL_SECS: u32 = 300;

/// CAA tags accepted by the record model
pub const CAA_TAGS: &[&str] = &["issue", "issuewild", "iodef"];

// ============================================================================
// Zone Metadata Keys
// ============================================================================

/// Zone metadata key disabling nameserver management (`"true"` to disable)
pub const META_NO_NS: &str = "no_ns";

/// Zone metadata key overriding the TTL of synthesized apex NS records
pub const META_NS_TTL: &str = "ns_ttl";

// ============================================================================
// Record Metadata Keys
// ============================================================================

/// Proxy state hint (`on`, `off`, `full`)
pub const META_PROXY: &str = "cloudflare_proxy";

/// Free-form record comment
pub const META_COMMENT: &str = "comment";

/// Comma-separated record tags
pub const META_TAGS: &str = "tags";

/// Original IP address before any rewriting
pub const META_ORIGINAL_IP: &str = "original_ip";

/// Redirect match pattern for redirect pseudo-records
pub const META_REDIRECT_PATTERN: &str = "redirect_pattern";

/// Redirect replacement for redirect pseudo-records
pub const META_REDIRECT_REPLACEMENT: &str = "redirect_replacement";

// ============================================================================
// Credentials Constants
// ============================================================================

/// Credentials key carrying the provider type identifier
pub const CREDS_TYPE_KEY: &str = "TYPE";

/// Credentials key that excludes a provider from the default selection
pub const CREDS_EXCLUDE_FROM_DEFAULTS_KEY: &str = "_exclude_from_defaults";

/// Credentials value marking an entry as deliberately invalid
pub const CREDS_INVALID_TYPE: &str = "-";

/// Credentials entry holding notifier configuration
pub const CREDS_NOTIFICATIONS_ENTRY: &str = "notifications";

/// Provider configuration key receiving `--bindserial`
pub const BIND_SERIAL_KEY: &str = "bind_serial";

// ============================================================================
// Provider Type Identifiers
// ============================================================================

/// Provider that ignores every change
pub const PROVIDER_TYPE_NONE: &str = "NONE";

/// BIND zone-file provider type
pub const PROVIDER_TYPE_BIND: &str = "BIND";

/// Process-local provider used for dry runs and tests
pub const PROVIDER_TYPE_INMEMORY: &str = "INMEMORY";

// ============================================================================
// Differ Constants
// ============================================================================

/// Default cap on IGNORE / NO_PURGE report lines per zone
pub const DEFAULT_MAX_REPORT_LINES: usize = 10;

// ============================================================================
// Orchestrator Constants
// ============================================================================

/// Default number of zones planned in parallel
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default deadline for a single provider call (2 minutes)
pub const DEFAULT_PROVIDER_CALL_TIMEOUT_SECS: u64 = 120;

/// Domain/provider filter value selecting everything
pub const FILTER_ALL: &str = "all";

/// Separator between a zone name and its split-horizon tag
pub const TAG_SEPARATOR: char = '!';

/// Environment variable holding the SOCKS5 proxy address
pub const SOCKS5_ENV_VAR: &str = "DNSCONTROL_SOCKS5";

/// Timeout for outbound notifier HTTP requests
pub const NOTIFIER_HTTP_TIMEOUT_SECS: u64 = 10;
