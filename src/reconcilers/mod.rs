// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation of desired zones against DNS providers and registrars.
//!
//! # Reconciliation Architecture
//!
//! A run follows a plan-then-act loop:
//!
//! 1. **Validate** - Reject zones whose desired state contradicts itself
//! 2. **Plan** - Fetch current state and compute corrections per (zone, provider)
//! 3. **Act** - Print corrections, or execute them in order
//! 4. **Report** - Summarize outcomes for the exit code and the JSON report
//!
//! # Building Blocks
//!
//! ## Planning
//!
//! - [`validate_records`] / [`validate_references`] - Desired-state checks
//! - [`determine_nameservers`] - Merge provider nameservers into the zone
//! - [`populate_corrections`] / [`depopulate_corrections`] - Zone creation and deletion
//! - [`plan_zone_records`] - Record corrections for one provider
//! - [`registrar_corrections`] - Delegation corrections
//!
//! ## Running
//!
//! - [`Orchestrator`] - Both phases over every selected zone
//! - [`DomainFilter`] / [`ProviderFilter`] - `--domains` and `--providers`
//! - [`CallPolicy`] - Deadlines and retries for provider calls
//!
//! # Example
//!
//! ```rust,no_run
//! use dnscontrol::context::Context;
//! use dnscontrol::printer::ConsolePrinter;
//! use dnscontrol::reconcilers::{Orchestrator, RunOptions};
//!
//! async fn preview(ctx: &Context) -> anyhow::Result<bool> {
//!     let printer = ConsolePrinter;
//!     let summary = Orchestrator::new(ctx, RunOptions::default(), &printer)
//!         .run()
//!         .await?;
//!     Ok(summary.is_success(false))
//! }
//! ```

pub mod delegation;
pub mod orchestrator;
pub mod populate;
pub mod prompt;
pub mod report;
pub mod retry;
pub mod selection;
pub mod state;
pub mod validation;
pub mod zone_records;

pub use delegation::{determine_nameservers, registrar_corrections};
pub use orchestrator::{Orchestrator, RunOptions, RunPlan, RunSummary, SectionPlan, ZonePlan};
pub use populate::{depopulate_corrections, populate_corrections};
pub use prompt::{Confirm, ConsolePrompter, Prompter, ScriptedPrompter};
pub use report::{write_report, ReportEntry};
pub use retry::CallPolicy;
pub use selection::{DomainFilter, ProviderFilter};
pub use state::{PairTracker, TaskState};
pub use validation::{validate_records, validate_references};
pub use zone_records::{plan_zone_records, PlannedCorrections};
