// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Instruction ordering.
//!
//! Instructions for one label are emitted bucket by bucket:
//!
//! | bucket | contents               |
//! |--------|------------------------|
//! | 0      | DS deletes, DS shrinks |
//! | 1      | other deletes          |
//! | 2      | other changes          |
//! | 3      | other creates          |
//! | 4      | other DS changes       |
//! | 5      | DS creates             |
//!
//! A DS shrink is an RRset change whose new records are all already served.
//! A delegation is therefore torn down DS first and built up NS first, and
//! within one (label, type) every delete precedes every create. Ties are broken
//! by type name and then rendered target.

use super::{Instruction, Verb};
use crate::models::RecordType;

fn bucket(i: &Instruction) -> u8 {
    let ds = i.rtype == RecordType::DS;
    match (i.verb, ds) {
        (Verb::Delete, true) => 0,
        (Verb::Change, true) if i.new.iter().all(|r| i.old.contains(r)) => 0,
        (Verb::Delete, false) => 1,
        (Verb::Change, false) => 2,
        (Verb::Create, false) => 3,
        (Verb::Change, true) => 4,
        (Verb::Create, true) => 5,
    }
}

/// Sort instructions into emission order. Stable.
pub(crate) fn sort(instructions: &mut [Instruction]) {
    instructions.sort_by_cached_key(|i| {
        (
            i.label.clone(),
            bucket(i),
            i.rtype.as_str().to_string(),
            i.sort_target(),
        )
    });
}
