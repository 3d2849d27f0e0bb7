// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Core data model: records, zones and corrections.

pub mod correction;
pub mod domain;
pub mod meta;
pub mod record;
pub mod rtype;
pub mod target;

pub use correction::{split_reports, Correction, CorrectionAction};
pub use domain::{split_tag, DnsConfig, DomainConfig, IrDomain, IrNameserver, IrRecord, ProviderDecl};
pub use meta::{ProxyState, RecordMeta, Redirect};
pub use record::{
    canonical_label, canonical_zone, post_process_records, NativeRecord, Record, RecordKey,
};
pub use rtype::RecordType;
pub use target::{canonical_name, Loc, RecordData, SvcData};
