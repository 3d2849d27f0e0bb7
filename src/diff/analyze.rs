// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Grouping by (label, type) and pairing existing against desired records.

use super::ComparableFn;
use crate::models::{Record, RecordType};
use std::collections::BTreeMap;

/// Records sharing one (label, type).
#[derive(Debug)]
pub(crate) struct Group<'a> {
    pub label: String,
    pub rtype: RecordType,
    pub existing: Vec<&'a Record>,
    pub desired: Vec<&'a Record>,
    pub ignored: Vec<&'a Record>,
}

/// One record-level difference.
#[derive(Debug)]
pub(crate) enum Delta<'a> {
    Create(&'a Record),
    Delete(&'a Record),
    Change { old: &'a Record, new: &'a Record },
    /// Would be deleted, kept because of NO_PURGE
    Kept(&'a Record),
}

impl Delta<'_> {
    /// Rank within one RRset: deletes, then changes, then creates.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Delete(_) | Self::Kept(_) => 0,
            Self::Change { .. } => 1,
            Self::Create(_) => 2,
        }
    }

    pub fn sort_target(&self) -> String {
        match self {
            Self::Create(r) | Self::Delete(r) | Self::Kept(r) => r.target_combined(),
            Self::Change { new, .. } => new.target_combined(),
        }
    }
}

/// Result of pairing one group.
#[derive(Debug, Default)]
pub(crate) struct GroupDiff<'a> {
    pub unchanged: Vec<&'a Record>,
    pub deltas: Vec<Delta<'a>>,
}

impl GroupDiff<'_> {
    /// Number of record-level changes that need an action.
    pub fn change_count(&self) -> usize {
        self.deltas
            .iter()
            .filter(|d| !matches!(d, Delta::Kept(_)))
            .count()
    }

    pub fn has_changes(&self) -> bool {
        self.change_count() > 0
    }
}

/// Bucket records by (label, type string). The map orders groups by label
/// and then type name.
pub(crate) fn group<'a>(
    managed: &[&'a Record],
    desired: &'a [Record],
    ignored: &[&'a Record],
) -> BTreeMap<(String, String), Group<'a>> {
    let mut groups: BTreeMap<(String, String), Group<'a>> = BTreeMap::new();
    for &r in managed {
        entry_for(&mut groups, r).existing.push(r);
    }
    for r in desired {
        entry_for(&mut groups, r).desired.push(r);
    }
    for &r in ignored {
        entry_for(&mut groups, r).ignored.push(r);
    }
    groups
}

fn entry_for<'m, 'a>(
    groups: &'m mut BTreeMap<(String, String), Group<'a>>,
    r: &Record,
) -> &'m mut Group<'a> {
    let rtype = r.rtype();
    groups
        .entry((r.name.clone(), rtype.as_str().to_string()))
        .or_insert_with(|| Group {
            label: r.name.clone(),
            rtype,
            existing: Vec::new(),
            desired: Vec::new(),
            ignored: Vec::new(),
        })
}

struct Entry<'a> {
    record: &'a Record,
    target: String,
    extra: String,
}

impl<'a> Entry<'a> {
    fn new(record: &'a Record, comparable: Option<&ComparableFn>) -> Self {
        Self {
            record,
            target: record.target_combined(),
            extra: comparable.map(|f| f(record)).unwrap_or_default(),
        }
    }
}

fn take_first<'a, P>(pool: &mut [Option<Entry<'a>>], pred: P) -> Option<Entry<'a>>
where
    P: Fn(&Entry<'a>) -> bool,
{
    pool.iter_mut()
        .find(|slot| matches!(slot, Some(entry) if pred(entry)))
        .and_then(Option::take)
}

/// Pair existing and desired records of one group.
///
/// Pairing passes, in order: exact match (unchanged), same target and extra
/// (TTL change), same target (metadata change), then positional pairing of
/// what is left. NS and DS never pair positionally; a changed NS or DS target
/// becomes a delete plus a create so that the delegation ordering rules can
/// apply to each half.
pub(crate) fn pair<'a>(
    group: &Group<'a>,
    comparable: Option<&ComparableFn>,
    keep_unknown: bool,
) -> GroupDiff<'a> {
    let mut existing: Vec<Option<Entry<'a>>> = group
        .existing
        .iter()
        .map(|&r| Some(Entry::new(r, comparable)))
        .collect();
    let mut desired: Vec<Option<Entry<'a>>> = group
        .desired
        .iter()
        .map(|&r| Some(Entry::new(r, comparable)))
        .collect();
    let mut out = GroupDiff::default();

    for slot in &mut desired {
        let Some(want) = slot.as_ref() else { continue };
        if let Some(have) = take_first(&mut existing, |have| {
            have.record.ttl == want.record.ttl
                && have.target == want.target
                && have.extra == want.extra
        }) {
            out.unchanged.push(have.record);
            *slot = None;
        }
    }

    for exact_extra in [true, false] {
        for slot in &mut desired {
            let Some(want) = slot.as_ref() else { continue };
            if let Some(have) = take_first(&mut existing, |have| {
                have.target == want.target && (!exact_extra || have.extra == want.extra)
            }) {
                out.deltas.push(Delta::Change {
                    old: have.record,
                    new: want.record,
                });
                *slot = None;
            }
        }
    }

    if !matches!(group.rtype, RecordType::NS | RecordType::DS) {
        let leftovers = existing.iter_mut().filter(|s| s.is_some());
        let wanted = desired.iter_mut().filter(|s| s.is_some());
        for (have, want) in leftovers.zip(wanted) {
            if let (Some(have), Some(want)) = (have.take(), want.take()) {
                out.deltas.push(Delta::Change {
                    old: have.record,
                    new: want.record,
                });
            }
        }
    }

    for have in existing.into_iter().flatten() {
        out.deltas.push(if keep_unknown {
            Delta::Kept(have.record)
        } else {
            Delta::Delete(have.record)
        });
    }
    for want in desired.into_iter().flatten() {
        out.deltas.push(Delta::Create(want.record));
    }

    out.deltas.sort_by_cached_key(|d| (d.rank(), d.sort_target()));
    out
}
