// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The unit of user-visible work: a message plus an optional deferred effect.
//!
//! A correction without an action is a report. Actions are `'static` futures,
//! so they own everything they touch (provider handle, zone name, records)
//! and never borrow shared zone state.

use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;

/// Deferred side effect of a correction.
pub type CorrectionAction = BoxFuture<'static, anyhow::Result<()>>;

/// Message plus optional action.
pub struct Correction {
    pub msg: String,
    pub action: Option<CorrectionAction>,
}

impl Correction {
    /// Message-only correction.
    #[must_use]
    pub fn report(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            action: None,
        }
    }

    /// Correction that runs `action` when executed.
    #[must_use]
    pub fn with_action<F>(msg: impl Into<String>, action: F) -> Self
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            msg: msg.into(),
            action: Some(Box::pin(action)),
        }
    }

    /// Prefix the message with `[provider]`.
    #[must_use]
    pub fn for_provider(mut self, provider: &str) -> Self {
        self.msg = format!("[{provider}] {}", self.msg);
        self
    }

    /// True if there is nothing to execute.
    #[must_use]
    pub fn is_report(&self) -> bool {
        self.action.is_none()
    }

    /// Run the action, consuming it. Returns `None` for reports or when the
    /// action already ran.
    pub async fn execute(&mut self) -> Option<anyhow::Result<()>> {
        let action = self.action.take()?;
        Some(action.await)
    }
}

impl PartialEq for Correction {
    fn eq(&self, other: &Self) -> bool {
        self.msg == other.msg
    }
}

impl fmt::Debug for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Correction")
            .field("msg", &self.msg)
            .field("has_action", &self.action.is_some())
            .finish()
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg)
    }
}

/// Split corrections into (reports, actionable), preserving order.
#[must_use]
pub fn split_reports(corrections: Vec<Correction>) -> (Vec<Correction>, Vec<Correction>) {
    corrections.into_iter().partition(Correction::is_report)
}
