// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # dnscontrol - declarative DNS reconciliation
//!
//! Reads a desired-state description of many DNS zones and brings every
//! attached DNS provider and registrar in line with it.
//!
//! ## Overview
//!
//! - Typed records with canonical comparison and BIND presentation parsing
//! - A differ that turns (existing, desired) into ordered instructions,
//!   honoring unmanaged patterns and `NO_PURGE`
//! - A provider abstraction with declared capabilities and optional
//!   zone listing, creation and deletion
//! - A two-phase orchestrator: parallel planning, serial execution
//!
//! ## Modules
//!
//! - [`models`] - Records, zones, IR input and corrections
//! - [`diff`] - Existing-vs-desired comparison
//! - [`ignore`] - Unmanaged record patterns
//! - [`providers`] - Driver traits, capabilities, registry and built-in drivers
//! - [`creds`] / [`provider_types`] - Credentials store and type resolution
//! - [`context`] - Everything one run needs, built at startup
//! - [`reconcilers`] - Planning and execution
//! - [`zone_cache`] - Per-run zone list cache
//! - [`printer`] / [`notify`] / [`metrics`] - Outputs
//! - [`cli`] - Command-line surface
//!
//! ## Example
//!
//! ```rust,no_run
//! use dnscontrol::context::Context;
//! use dnscontrol::creds::CredsStore;
//! use dnscontrol::models::DnsConfig;
//! use dnscontrol::printer::ConsolePrinter;
//! use dnscontrol::providers::ProviderRegistry;
//! use dnscontrol::reconcilers::{Orchestrator, RunOptions};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = DnsConfig::load(Path::new("dnsconfig.json")).await?;
//! let creds = CredsStore::load(Path::new("creds.json")).await?;
//! let ctx = Context::build(&config, &creds, &ProviderRegistry::with_builtin())?;
//!
//! let summary = Orchestrator::new(&ctx, RunOptions::default(), &ConsolePrinter)
//!     .run()
//!     .await?;
//! println!("{} corrections planned", summary.changes);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod constants;
pub mod context;
pub mod creds;
pub mod diff;
pub mod errors;
pub mod http;
pub mod ignore;
pub mod metrics;
pub mod models;
pub mod notify;
pub mod printer;
pub mod provider_types;
pub mod providers;
pub mod reconcilers;
pub mod zone_cache;
