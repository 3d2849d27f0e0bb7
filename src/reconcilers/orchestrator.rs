// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Two-phase run over every selected zone.
//!
//! # Phase 1: plan
//!
//! One task per zone. Inside a zone, providers are planned one after the
//! other in IR order, followed by the registrar. Zones whose selected
//! providers all declare [`Capability::CanConcur`] are planned in a pool
//! bounded by [`RunOptions::concurrency`]; the remaining zones are planned
//! one at a time afterwards. A panic inside a driver is caught at the
//! (zone, provider) boundary and reported as [`ProviderError::Panicked`].
//!
//! # Phase 2: act
//!
//! Strictly serial and in IR order. For every zone: its provider sections,
//! then its registrar section. Each section prints its reports first, then
//! its corrections. Preview prints; push runs each action, and a failed
//! or panicking action does not stop the next one.

use super::delegation::{determine_nameservers, registrar_corrections};
use super::populate::{depopulate_corrections, populate_corrections};
use super::prompt::{Confirm, ConsolePrompter, Prompter};
use super::report::{write_report, ReportEntry};
use super::retry::CallPolicy;
use super::selection::{DomainFilter, ProviderFilter};
use super::state::{PairTracker, TaskState};
use super::validation::{validate_records, validate_references};
use super::zone_records::plan_zone_records;
use crate::constants::DEFAULT_CONCURRENCY;
use crate::context::Context;
use crate::errors::ProviderError;
use crate::metrics::{record_correction, record_zone_planned};
use crate::models::{split_reports, Correction, DomainConfig};
use crate::notify::{NoopNotifier, Notification, Notifier};
use crate::printer::Printer;
use crate::providers::{Capability, ProviderInstance, RegistrarInstance};
use crate::zone_cache::ZoneCache;
use anyhow::Result;
use futures::FutureExt;
use std::any::Any;
use std::collections::BTreeSet;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

const ROLE_PROVIDER: &str = "DNS Provider";
const ROLE_REGISTRAR: &str = "Registrar";
const ROLE_DEPOPULATE: &str = "Depopulate";

/// Heading of the section holding zone deletions.
const DEPOPULATE_HEADING: &str = "(zones not in configuration)";

/// Knobs of one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Execute corrections instead of only printing them
    pub push: bool,
    /// Confirm each correction before running it (push only)
    pub interactive: bool,
    /// Create zones missing at providers
    pub populate: bool,
    /// Delete zones present at providers but absent from the IR
    pub depopulate: bool,
    /// Fail the run if any actionable correction is planned
    pub expect_no_changes: bool,
    /// Print headings for sections without corrections
    pub full: bool,
    pub domains: DomainFilter,
    pub providers: ProviderFilter,
    /// Where to write the JSON report, if anywhere
    pub report_path: Option<PathBuf>,
    /// Zones planned at the same time
    pub concurrency: usize,
    pub policy: CallPolicy,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            push: false,
            interactive: false,
            populate: true,
            depopulate: false,
            expect_no_changes: false,
            full: false,
            domains: DomainFilter::default(),
            providers: ProviderFilter::default(),
            report_path: None,
            concurrency: DEFAULT_CONCURRENCY,
            policy: CallPolicy::default(),
        }
    }
}

/// Planned work of one provider or registrar on one zone.
#[derive(Debug)]
pub struct SectionPlan {
    pub name: String,
    /// Printed before any correction
    pub reports: Vec<Correction>,
    /// Corrections carrying an action
    pub corrections: Vec<Correction>,
    /// Actionable changes as counted by the driver; one correction may
    /// carry several
    pub changes: usize,
    /// Set when planning failed; the section then has no corrections
    pub error: Option<String>,
    pub tracker: PairTracker,
}

impl SectionPlan {
    fn finish(name: &str, mut tracker: PairTracker, result: Result<Vec<Correction>>) -> Self {
        match result {
            Ok(planned) => {
                tracker.advance(TaskState::Planned);
                record_zone_planned(name, true);
                let (reports, corrections) = split_reports(planned);
                Self {
                    name: name.to_string(),
                    reports,
                    changes: corrections.len(),
                    corrections,
                    error: None,
                    tracker,
                }
            }
            Err(e) => {
                tracker.fail();
                record_zone_planned(name, false);
                let text = format!("{e:#}");
                error!(section = %name, error = %text, "Planning failed");
                Self {
                    name: name.to_string(),
                    reports: Vec::new(),
                    corrections: Vec::new(),
                    changes: 0,
                    error: Some(text),
                    tracker,
                }
            }
        }
    }

    /// Like [`SectionPlan::finish`], keeping the change count planning
    /// reported instead of counting corrections.
    fn finish_counted(
        name: &str,
        tracker: PairTracker,
        result: Result<(Vec<Correction>, usize)>,
    ) -> Self {
        match result {
            Ok((planned, changes)) => Self {
                changes,
                ..Self::finish(name, tracker, Ok(planned))
            },
            Err(e) => Self::finish(name, tracker, Err(e)),
        }
    }
}

/// Planned work of one zone.
#[derive(Debug)]
pub struct ZonePlan {
    /// `name` or `name!tag`
    pub zone: String,
    /// Zone-level failures; when set, no section was planned
    pub errors: Vec<String>,
    pub providers: Vec<SectionPlan>,
    pub registrar: Option<SectionPlan>,
}

impl ZonePlan {
    fn failed(zone: &str, errors: Vec<String>) -> Self {
        for e in &errors {
            warn!(zone = %zone, error = %e, "Skipping zone");
        }
        Self {
            zone: zone.to_string(),
            errors,
            providers: Vec::new(),
            registrar: None,
        }
    }

    /// Actionable changes across all sections.
    #[must_use]
    pub fn change_count(&self) -> usize {
        self.providers
            .iter()
            .chain(self.registrar.iter())
            .map(|s| s.changes)
            .sum()
    }
}

/// Output of phase 1.
#[derive(Debug, Default)]
pub struct RunPlan {
    /// Selected zones, in IR order
    pub zones: Vec<ZonePlan>,
    /// One section per provider when `--depopulate` is set
    pub depopulate: Vec<SectionPlan>,
}

/// Outcome of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Planning failures plus failed actions
    pub errors: usize,
    /// Actionable corrections planned
    pub changes: usize,
    pub executed: usize,
    pub skipped: usize,
}

impl RunSummary {
    #[must_use]
    pub fn is_success(&self, expect_no_changes: bool) -> bool {
        self.errors == 0 && !(expect_no_changes && self.changes > 0)
    }

    #[must_use]
    pub fn exit_code(&self, expect_no_changes: bool) -> u8 {
        u8::from(!self.is_success(expect_no_changes))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Await `fut`, turning a panic into [`ProviderError::Panicked`].
async fn guarded<T, F>(provider: &str, zone: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(ProviderError::Panicked {
            provider: provider.to_string(),
            zone: zone.to_string(),
            reason: panic_message(payload.as_ref()),
        }
        .into()),
    }
}

/// Phase-1 work of one zone. Owns everything it touches.
struct ZoneTask {
    zone: DomainConfig,
    /// Every provider attached to the zone, with its nameserver count
    attached: Vec<ProviderInstance>,
    /// Attached providers picked by `--providers`
    selected: Vec<ProviderInstance>,
    registrar: Option<RegistrarInstance>,
    errors: Vec<String>,
    cache: ZoneCache,
    policy: CallPolicy,
    populate: bool,
    preview: bool,
}

impl ZoneTask {
    fn new(
        ctx: &Context,
        zone: &DomainConfig,
        options: &RunOptions,
        providers: &BTreeSet<String>,
        registrars: &BTreeSet<String>,
    ) -> Self {
        let errors: Vec<String> = validate_records(zone)
            .into_iter()
            .chain(validate_references(zone, providers, registrars))
            .map(|e| e.to_string())
            .collect();

        let attached: Vec<ProviderInstance> = zone
            .dns_provider_names
            .iter()
            .filter_map(|(name, count)| ctx.providers.get(name).map(|p| p.for_zone(*count)))
            .collect();
        let selected = attached
            .iter()
            .filter(|p| options.providers.selects(p))
            .cloned()
            .collect();
        let registrar = if options.providers.selects_registrar(&zone.registrar_name) {
            ctx.registrars.get(&zone.registrar_name).cloned()
        } else {
            None
        };

        Self {
            zone: zone.clone(),
            attached,
            selected,
            registrar,
            errors,
            cache: ctx.cache.clone(),
            policy: options.policy,
            populate: options.populate,
            preview: !options.push,
        }
    }

    fn can_concur(&self) -> bool {
        self.selected.iter().all(|p| p.has(Capability::CanConcur))
    }

    async fn run(mut self) -> ZonePlan {
        let unique = self.zone.unique_name.clone();
        if !self.errors.is_empty() {
            return ZonePlan::failed(&unique, self.errors);
        }
        debug!(zone = %unique, providers = self.selected.len(), "Planning zone");

        if let Err(e) = determine_nameservers(&mut self.zone, &self.attached, &self.policy).await {
            return ZonePlan::failed(&unique, vec![format!("{e:#}")]);
        }

        let mut providers = Vec::with_capacity(self.selected.len());
        for provider in &self.selected {
            providers.push(self.plan_provider(provider).await);
        }

        let registrar = match &self.registrar {
            Some(registrar) => Some(self.plan_registrar(registrar).await),
            None => None,
        };

        ZonePlan {
            zone: unique,
            errors: Vec::new(),
            providers,
            registrar,
        }
    }

    async fn plan_provider(&self, provider: &ProviderInstance) -> SectionPlan {
        let zone = &self.zone;
        let mut tracker = PairTracker::new(&zone.unique_name, &provider.name);
        tracker.advance(TaskState::Listing);

        let tracker_ref = &mut tracker;
        let result = guarded(&provider.name, &zone.unique_name, async move {
            let mut planned = Vec::new();
            let mut changes = 0;
            if self.populate {
                let populate =
                    populate_corrections(provider, zone, &self.cache, &self.policy, self.preview)
                        .await?;
                changes += populate.iter().filter(|c| !c.is_report()).count();
                planned.extend(populate);
            }
            tracker_ref.advance(TaskState::Listed);

            let records = plan_zone_records(provider, zone, &self.policy, tracker_ref).await?;
            changes += records.change_count;
            planned.extend(records.reports);
            planned.extend(records.corrections);
            Ok((planned, changes))
        })
        .await;

        SectionPlan::finish_counted(&provider.name, tracker, result)
    }

    async fn plan_registrar(&self, registrar: &RegistrarInstance) -> SectionPlan {
        let mut tracker = PairTracker::new(&self.zone.unique_name, &registrar.name);
        for next in [TaskState::Listing, TaskState::Listed, TaskState::Diffing] {
            tracker.advance(next);
        }
        let result = guarded(
            &registrar.name,
            &self.zone.unique_name,
            registrar_corrections(registrar, &self.zone, &self.policy),
        )
        .await;
        SectionPlan::finish(&registrar.name, tracker, result)
    }
}

/// Runs both phases against a [`Context`].
pub struct Orchestrator<'a> {
    ctx: &'a Context,
    options: RunOptions,
    printer: &'a dyn Printer,
    notifier: &'a dyn Notifier,
    prompter: &'a dyn Prompter,
    cancel: Arc<AtomicBool>,
}

impl<'a> Orchestrator<'a> {
    #[must_use]
    pub fn new(ctx: &'a Context, options: RunOptions, printer: &'a dyn Printer) -> Self {
        Self {
            ctx,
            options,
            printer,
            notifier: &NoopNotifier,
            prompter: &ConsolePrompter,
            cancel: Arc::default(),
        }
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: &'a dyn Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn with_prompter(mut self, prompter: &'a dyn Prompter) -> Self {
        self.prompter = prompter;
        self
    }

    /// Once `flag` is set, phase 2 starts no new correction.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    /// Plan and then print or execute.
    ///
    /// # Errors
    ///
    /// Returns an error only if the report file cannot be written. Planning
    /// and execution failures are counted in the summary.
    pub async fn run(&self) -> Result<RunSummary> {
        let plan = self.plan().await;
        self.apply(plan).await
    }

    /// Phase 1.
    pub async fn plan(&self) -> RunPlan {
        let providers = self.ctx.provider_names();
        let registrars = self.ctx.registrar_names();
        let tasks: Vec<ZoneTask> = self
            .ctx
            .zones
            .iter()
            .filter(|z| self.options.domains.matches(z))
            .map(|z| ZoneTask::new(self.ctx, z, &self.options, &providers, &registrars))
            .collect();
        if tasks.is_empty() {
            warn!("No zone matches the domain filter");
        }
        info!(zones = tasks.len(), preview = !self.options.push, "Planning corrections");

        let mut slots: Vec<Option<ZonePlan>> = tasks.iter().map(|_| None).collect();
        let (parallel, serial): (Vec<_>, Vec<_>) = tasks
            .into_iter()
            .enumerate()
            .partition(|(_, task)| task.can_concur());

        let semaphore = Arc::new(Semaphore::new(self.options.concurrency.max(1)));
        let mut handles = Vec::with_capacity(parallel.len());
        for (index, task) in parallel {
            let semaphore = Arc::clone(&semaphore);
            let zone = task.zone.unique_name.clone();
            handles.push((
                index,
                zone,
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.ok();
                    task.run().await
                }),
            ));
        }
        for (index, zone, handle) in handles {
            slots[index] = Some(match handle.await {
                Ok(plan) => plan,
                Err(e) => ZonePlan::failed(&zone, vec![format!("Planning task for zone '{zone}' failed: {e}")]),
            });
        }

        for (index, task) in serial {
            debug!(zone = %task.zone.unique_name, "Planning zone sequentially");
            slots[index] = Some(task.run().await);
        }

        let depopulate = if self.options.depopulate {
            self.plan_depopulate().await
        } else {
            Vec::new()
        };

        RunPlan {
            zones: slots.into_iter().flatten().collect(),
            depopulate,
        }
    }

    async fn plan_depopulate(&self) -> Vec<SectionPlan> {
        let mut sections = Vec::new();
        for provider in self
            .ctx
            .providers
            .values()
            .filter(|p| self.options.providers.selects(p))
        {
            if provider.driver.as_zone_lister().is_none() {
                debug!(provider = %provider.name, "Provider cannot list zones, skipping depopulate");
                continue;
            }
            let mut tracker = PairTracker::new(DEPOPULATE_HEADING, &provider.name);
            tracker.advance(TaskState::Listing);
            let wanted = self.ctx.zones_of(&provider.name);
            let result = depopulate_corrections(
                provider,
                &wanted,
                &self.ctx.cache,
                &self.options.policy,
                !self.options.push,
            )
            .await;
            tracker.advance(TaskState::Listed);
            tracker.advance(TaskState::Diffing);
            sections.push(SectionPlan::finish(&provider.name, tracker, result));
        }
        sections
    }

    /// Phase 2.
    ///
    /// # Errors
    ///
    /// Returns an error if the report file cannot be written.
    pub async fn apply(&self, plan: RunPlan) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut report = Vec::new();
        let mut skip_rest = false;

        for zone in plan.zones {
            self.printer.domain_heading(&zone.zone);
            for e in &zone.errors {
                self.printer.error(e);
                summary.errors += 1;
            }
            for section in zone.providers {
                report.push(ReportEntry::for_provider(
                    &zone.zone,
                    &section.name,
                    section.changes,
                ));
                self.apply_section(&zone.zone, ROLE_PROVIDER, section, &mut summary, &mut skip_rest)
                    .await;
            }
            if let Some(section) = zone.registrar {
                report.push(ReportEntry::for_registrar(
                    &zone.zone,
                    &section.name,
                    section.changes,
                ));
                self.apply_section(&zone.zone, ROLE_REGISTRAR, section, &mut summary, &mut skip_rest)
                    .await;
            }
        }

        if !plan.depopulate.is_empty() {
            self.printer.domain_heading(DEPOPULATE_HEADING);
            for section in plan.depopulate {
                self.apply_section(
                    DEPOPULATE_HEADING,
                    ROLE_DEPOPULATE,
                    section,
                    &mut summary,
                    &mut skip_rest,
                )
                .await;
            }
        }

        if let Some(path) = &self.options.report_path {
            write_report(path, &report).await?;
            info!(path = %path.display(), entries = report.len(), "Wrote report");
        }
        self.notifier.done().await;

        info!(
            errors = summary.errors,
            changes = summary.changes,
            executed = summary.executed,
            skipped = summary.skipped,
            "Run complete"
        );
        Ok(summary)
    }

    async fn apply_section(
        &self,
        domain: &str,
        role: &str,
        section: SectionPlan,
        summary: &mut RunSummary,
        skip_rest: &mut bool,
    ) {
        let SectionPlan {
            name,
            reports,
            mut corrections,
            changes,
            error,
            mut tracker,
        } = section;
        let count = corrections.len();

        if self.options.full || count > 0 || !reports.is_empty() || error.is_some() {
            self.printer.provider_heading(role, &name, count);
        }
        if let Some(e) = error {
            self.printer.error(&e);
            summary.errors += 1;
            return;
        }
        for r in &reports {
            self.printer.report(&r.msg);
        }
        summary.changes += changes;

        if !self.options.push {
            for (i, correction) in corrections.iter().enumerate() {
                self.printer.correction(i + 1, &correction.msg);
                self.notify(domain, &name, &correction.msg, None, true).await;
            }
            return;
        }

        tracker.advance(TaskState::Executing);
        let mut failed = false;
        for (i, correction) in corrections.iter_mut().enumerate() {
            self.printer.correction(i + 1, &correction.msg);

            if self.cancel.load(Ordering::SeqCst) {
                self.printer.warning("skipped, run interrupted");
                summary.skipped += 1;
                record_correction(&name, "skipped");
                continue;
            }
            if *skip_rest {
                self.printer.report("skipped");
                summary.skipped += 1;
                record_correction(&name, "skipped");
                continue;
            }
            if self.options.interactive {
                match self.prompter.confirm(&correction.msg).await {
                    Confirm::Yes => {}
                    answer => {
                        *skip_rest = answer == Confirm::SkipRest;
                        self.printer.report("skipped");
                        summary.skipped += 1;
                        record_correction(&name, "skipped");
                        continue;
                    }
                }
            }

            let outcome = guarded(&name, domain, async {
                correction.execute().await.unwrap_or(Ok(()))
            })
            .await;
            summary.executed += 1;
            match outcome {
                Ok(()) => {
                    self.printer.outcome(None);
                    record_correction(&name, "success");
                    self.notify(domain, &name, &correction.msg, None, false).await;
                }
                Err(e) => {
                    let text = format!("{e:#}");
                    error!(zone = %domain, provider = %name, error = %text, "Correction failed");
                    self.printer.outcome(Some(&text));
                    record_correction(&name, "failure");
                    self.notify(domain, &name, &correction.msg, Some(&text), false)
                        .await;
                    summary.errors += 1;
                    failed = true;
                }
            }
        }

        if failed {
            tracker.fail();
        } else {
            tracker.advance(TaskState::Done);
        }
    }

    async fn notify(
        &self,
        domain: &str,
        provider: &str,
        msg: &str,
        error: Option<&str>,
        preview: bool,
    ) {
        let event = Notification {
            domain,
            provider,
            msg,
            error,
            preview,
        };
        if let Err(e) = self.notifier.notify(&event).await {
            warn!(zone = %domain, provider = %provider, error = %e, "Notification failed");
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod orchestrator_tests;
