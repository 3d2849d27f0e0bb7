// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Machine-readable run report (`--report`).
//!
//! A JSON array with one object per (zone, provider) or (zone, registrar)
//! pair that was processed:
//!
//! ```json
//! [{"domain": "example.com", "corrections": 2, "provider": "cloudflare"},
//!  {"domain": "example.com", "corrections": 0, "registrar": "gandi"}]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub domain: String,
    /// Actionable corrections planned for the pair
    pub corrections: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrar: Option<String>,
}

impl ReportEntry {
    #[must_use]
    pub fn for_provider(domain: &str, provider: &str, corrections: usize) -> Self {
        Self {
            domain: domain.to_string(),
            corrections,
            provider: Some(provider.to_string()),
            registrar: None,
        }
    }

    #[must_use]
    pub fn for_registrar(domain: &str, registrar: &str, corrections: usize) -> Self {
        Self {
            domain: domain.to_string(),
            corrections,
            provider: None,
            registrar: Some(registrar.to_string()),
        }
    }
}

/// Write `entries` as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub async fn write_report(path: &Path, entries: &[ReportEntry]) -> Result<()> {
    let json = serde_json::to_string_pretty(entries).context("Failed to serialize report")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
