// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared HTTP client construction.
//!
//! The SOCKS5 setting is read once at startup and installed on every client
//! built here. Provider drivers that talk HTTP start from
//! [`client_builder`] and add their own headers and timeouts.

use crate::constants::NOTIFIER_HTTP_TIMEOUT_SECS;
use anyhow::{Context, Result};
use reqwest::{Client as HttpClient, ClientBuilder, Proxy};
use std::time::Duration;
use tracing::info;

/// User agent sent on every outbound request
const USER_AGENT: &str = concat!("dnscontrol/", env!("CARGO_PKG_VERSION"));

/// Normalize a SOCKS5 setting to a proxy URL.
///
/// Accepts `host:port` or a full `socks5://` / `socks5h://` URL.
#[must_use]
pub fn socks5_url(setting: &str) -> String {
    let setting = setting.trim();
    if setting.starts_with("socks5://") || setting.starts_with("socks5h://") {
        setting.to_string()
    } else {
        format!("socks5://{setting}")
    }
}

/// Client builder with the process-wide transport settings applied.
///
/// # Errors
///
/// Returns an error if the SOCKS5 setting is not a valid proxy URL.
pub fn client_builder(socks5: Option<&str>) -> Result<ClientBuilder> {
    let mut builder = HttpClient::builder().user_agent(USER_AGENT);
    if let Some(setting) = socks5.filter(|s| !s.trim().is_empty()) {
        let url = socks5_url(setting);
        let proxy = Proxy::all(&url).with_context(|| format!("Invalid SOCKS5 proxy '{url}'"))?;
        info!(proxy = %url, "Routing outbound HTTP through SOCKS5 proxy");
        builder = builder.proxy(proxy);
    }
    Ok(builder)
}

/// Client used by the notifiers.
///
/// # Errors
///
/// Returns an error if the client cannot be built.
pub fn notifier_client(socks5: Option<&str>) -> Result<HttpClient> {
    client_builder(socks5)?
        .timeout(Duration::from_secs(NOTIFIER_HTTP_TIMEOUT_SECS))
        .build()
        .context("Failed to build HTTP client")
}
