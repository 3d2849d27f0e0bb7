// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Correction notifications.
//!
//! With `--notify`, every correction outcome in phase 2 is sent to the
//! endpoints configured in the credentials entry `notifications`:
//!
//! | key           | target                                  |
//! |---------------|-----------------------------------------|
//! | `webhook_url` | generic JSON webhook                    |
//! | `slack_url`   | Slack incoming webhook (`{"text": ..}`) |
//!
//! Delivery failures are logged and never fail the run.

use crate::providers::ProviderConfig;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client as HttpClient;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

const WEBHOOK_URL_KEY: &str = "webhook_url";
const SLACK_URL_KEY: &str = "slack_url";

/// One correction outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Notification<'a> {
    pub domain: &'a str,
    pub provider: &'a str,
    #[serde(rename = "message")]
    pub msg: &'a str,
    pub error: Option<&'a str>,
    pub preview: bool,
}

impl Notification<'_> {
    /// Human-readable one-liner.
    #[must_use]
    pub fn text(&self) -> String {
        match (self.preview, self.error) {
            (true, _) => format!(
                "DNSControl preview: {}[{}] -- {}",
                self.domain, self.provider, self.msg
            ),
            (false, None) => format!(
                "Successfully ran correction for {}[{}] - {}",
                self.domain, self.provider, self.msg
            ),
            (false, Some(err)) => format!(
                "ERROR running correction on {}[{}] - {}: {}",
                self.domain, self.provider, self.msg, err
            ),
        }
    }
}

/// Receives correction outcomes.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails.
    async fn notify(&self, event: &Notification<'_>) -> Result<()>;

    /// Flush anything pending at the end of the run.
    async fn done(&self) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _event: &Notification<'_>) -> Result<()> {
        Ok(())
    }
}

async fn post_json<T: Serialize + Sync>(client: &HttpClient, url: &Url, body: &T) -> Result<()> {
    let response = client
        .post(url.clone())
        .json(body)
        .send()
        .await
        .with_context(|| format!("Failed to send notification to {url}"))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        bail!("Notification endpoint {url} returned HTTP {status}: {error_text}");
    }
    debug!(url = %url, status = %status, "Notification delivered");
    Ok(())
}

/// POSTs the outcome as JSON.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: HttpClient,
    url: Url,
}

impl WebhookNotifier {
    #[must_use]
    pub fn new(client: HttpClient, url: Url) -> Self {
        Self { client, url }
    }
}

#[derive(Serialize)]
struct WebhookBody<'a> {
    #[serde(flatten)]
    event: &'a Notification<'a>,
    text: String,
    timestamp: DateTime<Utc>,
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, event: &Notification<'_>) -> Result<()> {
        let body = WebhookBody {
            event,
            text: event.text(),
            timestamp: Utc::now(),
        };
        post_json(&self.client, &self.url, &body).await
    }
}

/// Posts `{"text": ...}` to a Slack incoming webhook.
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    client: HttpClient,
    url: Url,
}

impl SlackNotifier {
    #[must_use]
    pub fn new(client: HttpClient, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, event: &Notification<'_>) -> Result<()> {
        let body = serde_json::json!({ "text": event.text() });
        post_json(&self.client, &self.url, &body).await
    }
}

/// Fans out to several notifiers; one failing target does not stop the others.
#[derive(Default)]
pub struct MultiNotifier {
    targets: Vec<Box<dyn Notifier>>,
}

impl MultiNotifier {
    #[must_use]
    pub fn new(targets: Vec<Box<dyn Notifier>>) -> Self {
        Self { targets }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[async_trait]
impl Notifier for MultiNotifier {
    async fn notify(&self, event: &Notification<'_>) -> Result<()> {
        for target in &self.targets {
            if let Err(e) = target.notify(event).await {
                warn!(domain = %event.domain, provider = %event.provider, error = %e, "Notification failed");
            }
        }
        Ok(())
    }

    async fn done(&self) {
        for target in &self.targets {
            target.done().await;
        }
    }
}

fn parse_url(key: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value).with_context(|| format!("notifications.{key} is not a valid URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("notifications.{key} must be an http(s) URL, got '{}'", url.scheme());
    }
    Ok(url)
}

/// Build the notifier for this run.
///
/// Returns [`NoopNotifier`] when notifications are disabled or nothing is
/// configured.
///
/// # Errors
///
/// Returns an error if a configured URL is invalid.
pub fn build_notifier(
    enabled: bool,
    config: Option<&ProviderConfig>,
    client: &HttpClient,
) -> Result<Box<dyn Notifier>> {
    let Some(config) = config.filter(|_| enabled) else {
        return Ok(Box::new(NoopNotifier));
    };

    let mut targets: Vec<Box<dyn Notifier>> = Vec::new();
    if let Some(value) = config.get(WEBHOOK_URL_KEY).filter(|v| !v.is_empty()) {
        targets.push(Box::new(WebhookNotifier::new(
            client.clone(),
            parse_url(WEBHOOK_URL_KEY, value)?,
        )));
    }
    if let Some(value) = config.get(SLACK_URL_KEY).filter(|v| !v.is_empty()) {
        targets.push(Box::new(SlackNotifier::new(
            client.clone(),
            parse_url(SLACK_URL_KEY, value)?,
        )));
    }

    if targets.is_empty() {
        warn!("--notify given but the notifications entry configures no target");
        return Ok(Box::new(NoopNotifier));
    }
    Ok(Box::new(MultiNotifier::new(targets)))
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod notify_tests;
