// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record-level differ.
//!
//! Given the records a provider currently serves and the zone's desired
//! state, the differ produces the minimal ordered list of CREATE, CHANGE and
//! DELETE instructions that reconciles the two. It never mutates either side.
//!
//! Two modes share one pairing algorithm:
//!
//! - [`by_record_set`]: one instruction per changed (label, type) RRset,
//!   carrying the complete old and new RRsets. Suited to upsert-style APIs.
//!   A DS RRset that both loses and gains records is replaced in two steps,
//!   removals first, so the delegation ordering holds around an NS change.
//! - [`by_record`]: one instruction per changed record. Suited to APIs that
//!   address individual records by id.
//!
//! Existing records matched by the zone's unmanaged patterns never appear in
//! a DELETE. A desired record that collides with such a record is an error
//! unless the zone opts out of the safety check.
//!
//! Both inputs are expected to be canonical (see
//! [`crate::models::post_process_records`]).

mod analyze;
mod messages;
mod ordering;

use crate::constants::DEFAULT_MAX_REPORT_LINES;
use crate::errors::DiffError;
use crate::ignore::IgnoreEngine;
use crate::models::{DomainConfig, Record, RecordType};
use analyze::{Delta, Group, GroupDiff};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Provider-supplied projection used for equality beyond TTL and target
/// (proxy state, comments, tags).
pub type ComparableFn = dyn Fn(&Record) -> String + Send + Sync;

/// Instruction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Create,
    Change,
    Delete,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "CREATE",
            Self::Change => "CHANGE",
            Self::Delete => "DELETE",
        })
    }
}

/// One unit of differ output.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub verb: Verb,
    pub label: String,
    pub rtype: RecordType,
    /// Records currently served (empty for CREATE)
    pub old: Vec<Record>,
    /// Records to serve afterwards (empty for DELETE)
    pub new: Vec<Record>,
    /// Rendered lines; the first is the headline
    pub msgs: Vec<String>,
}

impl Instruction {
    /// All message lines joined with newlines.
    #[must_use]
    pub fn msg(&self) -> String {
        self.msgs.join("\n")
    }

    /// The single old record of a record-mode instruction.
    #[must_use]
    pub fn old_record(&self) -> Option<&Record> {
        self.old.first()
    }

    /// The single new record of a record-mode instruction.
    #[must_use]
    pub fn new_record(&self) -> Option<&Record> {
        self.new.first()
    }

    fn sort_target(&self) -> String {
        self.new
            .first()
            .or_else(|| self.old.first())
            .map(Record::target_combined)
            .unwrap_or_default()
    }
}

/// Differ tuning.
#[derive(Clone)]
pub struct DiffOptions {
    pub comparable: Option<Arc<ComparableFn>>,
    /// Cap on report lines; 0 for no cap
    pub max_report: usize,
    /// Also report every ignored record
    pub verbose: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            comparable: None,
            max_report: DEFAULT_MAX_REPORT_LINES,
            verbose: false,
        }
    }
}

impl fmt::Debug for DiffOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffOptions")
            .field("comparable", &self.comparable.is_some())
            .field("max_report", &self.max_report)
            .field("verbose", &self.verbose)
            .finish()
    }
}

/// Differ output for one zone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changes {
    pub instructions: Vec<Instruction>,
    /// IGNORE / NO_PURGE lines, capped
    pub reports: Vec<String>,
    /// Record-level changes that need an action
    pub change_count: usize,
}

impl Changes {
    /// True when nothing needs to be done.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

#[derive(Clone, Copy)]
enum Mode {
    ByRecord,
    ByRecordSet,
}

/// Diff producing one instruction per changed record.
///
/// # Errors
///
/// Returns [`DiffError`] on a malformed unmanaged pattern or a collision with
/// an ignored record.
pub fn by_record(
    existing: &[Record],
    zone: &DomainConfig,
    opts: &DiffOptions,
) -> Result<Changes, DiffError> {
    diff(existing, zone, opts, Mode::ByRecord)
}

/// Diff producing one instruction per changed RRset.
///
/// # Errors
///
/// Returns [`DiffError`] on a malformed unmanaged pattern or a collision with
/// an ignored record.
pub fn by_record_set(
    existing: &[Record],
    zone: &DomainConfig,
    opts: &DiffOptions,
) -> Result<Changes, DiffError> {
    diff(existing, zone, opts, Mode::ByRecordSet)
}

fn diff(
    existing: &[Record],
    zone: &DomainConfig,
    opts: &DiffOptions,
    mode: Mode,
) -> Result<Changes, DiffError> {
    let ignore = IgnoreEngine::compile(&zone.unmanaged)?;
    let (managed, ignored) = ignore.partition(existing);
    if !zone.unmanaged_unsafe {
        ignore.check_collisions(&zone.name, &zone.records, &ignored)?;
    }

    let comparable = opts.comparable.as_deref();
    let mut changes = Changes::default();
    let mut reports = Vec::new();
    let mut unchanged = 0;
    if opts.verbose {
        reports.extend(ignored.iter().map(|r| messages::ignored(r)));
    }

    for group in analyze::group(&managed, &zone.records, &ignored).values() {
        let paired = analyze::pair(group, comparable, zone.keep_unknown);
        unchanged += paired.unchanged.len();
        reports.extend(paired.deltas.iter().filter_map(|d| match d {
            Delta::Kept(r) => Some(messages::kept(r)),
            _ => None,
        }));
        if !paired.has_changes() {
            continue;
        }
        changes.change_count += paired.change_count();
        match mode {
            Mode::ByRecord => changes
                .instructions
                .extend(record_instructions(group, &paired, comparable)),
            Mode::ByRecordSet => changes
                .instructions
                .extend(rrset_instructions(group, &paired, comparable)),
        }
    }

    ordering::sort(&mut changes.instructions);
    changes.reports = messages::cap(reports, opts.max_report);

    debug!(
        zone = %zone.unique_name,
        existing = existing.len(),
        ignored = ignored.len(),
        unchanged,
        desired = zone.records.len(),
        instructions = changes.instructions.len(),
        change_count = changes.change_count,
        "Computed zone diff"
    );

    Ok(changes)
}

fn delta_lines(delta: &Delta<'_>, comparable: Option<&ComparableFn>) -> Vec<String> {
    match delta {
        Delta::Create(r) => vec![messages::create(r)],
        Delta::Delete(r) => vec![messages::delete(r)],
        Delta::Change { old, new } => messages::change(old, new, comparable),
        Delta::Kept(_) => Vec::new(),
    }
}

fn record_instructions(
    group: &Group<'_>,
    paired: &GroupDiff<'_>,
    comparable: Option<&ComparableFn>,
) -> Vec<Instruction> {
    paired
        .deltas
        .iter()
        .filter_map(|delta| {
            let (verb, old, new) = match delta {
                Delta::Create(r) => (Verb::Create, vec![], vec![(*r).clone()]),
                Delta::Delete(r) => (Verb::Delete, vec![(*r).clone()], vec![]),
                Delta::Change { old, new } => {
                    (Verb::Change, vec![(*old).clone()], vec![(*new).clone()])
                }
                Delta::Kept(_) => return None,
            };
            Some(Instruction {
                verb,
                label: group.label.clone(),
                rtype: group.rtype.clone(),
                old,
                new,
                msgs: delta_lines(delta, comparable),
            })
        })
        .collect()
}

/// Whole-RRset instructions. Ignored and NO_PURGE-kept records at the same
/// key are carried in `new` so an RRset replace keeps them.
fn rrset_instructions(
    group: &Group<'_>,
    paired: &GroupDiff<'_>,
    comparable: Option<&ComparableFn>,
) -> Vec<Instruction> {
    let old: Vec<Record> = group
        .existing
        .iter()
        .chain(group.ignored.iter())
        .map(|r| (*r).clone())
        .collect();

    let kept = paired.deltas.iter().filter_map(|d| match d {
        Delta::Kept(r) => Some(*r),
        _ => None,
    });
    let new: Vec<Record> = group
        .desired
        .iter()
        .copied()
        .chain(group.ignored.iter().copied())
        .chain(kept)
        .cloned()
        .collect();

    let (removals, additions): (Vec<&Delta<'_>>, Vec<&Delta<'_>>) = paired
        .deltas
        .iter()
        .filter(|d| !matches!(d, Delta::Kept(_)))
        .partition(|d| matches!(d, Delta::Delete(_)));
    let lines = |deltas: &[&Delta<'_>]| -> Vec<String> {
        deltas
            .iter()
            .flat_map(|d| delta_lines(d, comparable))
            .collect()
    };

    if group.rtype == RecordType::DS && !removals.is_empty() && !additions.is_empty() {
        let remaining: Vec<Record> = old
            .iter()
            .filter(|r| {
                !removals
                    .iter()
                    .any(|d| matches!(d, Delta::Delete(gone) if *gone == *r))
            })
            .cloned()
            .collect();
        return vec![
            rrset(group, old, remaining.clone(), lines(&removals)),
            rrset(group, remaining, new, lines(&additions)),
        ];
    }

    let msgs = paired
        .deltas
        .iter()
        .flat_map(|d| delta_lines(d, comparable))
        .collect();
    vec![rrset(group, old, new, msgs)]
}

fn rrset(group: &Group<'_>, old: Vec<Record>, new: Vec<Record>, msgs: Vec<String>) -> Instruction {
    let verb = if old.is_empty() {
        Verb::Create
    } else if new.is_empty() {
        Verb::Delete
    } else {
        Verb::Change
    };
    Instruction {
        verb,
        label: group.label.clone(),
        rtype: group.rtype.clone(),
        old,
        new,
        msgs,
    }
}
