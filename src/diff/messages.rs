// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Human-readable rendering of differ output.

use super::ComparableFn;
use crate::models::{Record, RecordData};

fn describe(r: &Record) -> String {
    format!("{} {} {}", r.name, r.rtype(), r.target_combined())
}

pub(crate) fn create(r: &Record) -> String {
    format!("+ CREATE {} ttl={}", describe(r), r.ttl)
}

pub(crate) fn delete(r: &Record) -> String {
    format!("- DELETE {} ttl={}", describe(r), r.ttl)
}

/// First line plus per-field continuation lines for one changed record.
pub(crate) fn change(old: &Record, new: &Record, comparable: Option<&ComparableFn>) -> Vec<String> {
    let old_target = old.target_combined();
    let new_target = new.target_combined();
    let old_extra = comparable.map(|f| f(old)).unwrap_or_default();
    let new_extra = comparable.map(|f| f(new)).unwrap_or_default();

    if old_target == new_target && old_extra == new_extra {
        return vec![format!(
            "± MODIFY-TTL {} ttl {} -> {}",
            describe(new),
            old.ttl,
            new.ttl
        )];
    }

    let mut lines = vec![format!(
        "± MODIFY {} {} {} ttl={} -> {} ttl={}",
        new.name,
        new.rtype(),
        old_target,
        old.ttl,
        new_target,
        new.ttl
    )];
    lines.extend(field_deltas(&old.data, &new.data));
    if old_extra != new_extra {
        lines.push(format!("    meta: {old_extra:?} -> {new_extra:?}"));
    }
    lines
}

pub(crate) fn kept(r: &Record) -> String {
    format!("NO_PURGE: keeping {} ttl={}", describe(r), r.ttl)
}

pub(crate) fn ignored(r: &Record) -> String {
    format!("IGNORE: leaving unmanaged {} ttl={}", describe(r), r.ttl)
}

/// Cap report lines at `max`, summarizing the remainder. `0` disables the cap.
pub(crate) fn cap(mut lines: Vec<String>, max: usize) -> Vec<String> {
    if max == 0 || lines.len() <= max {
        return lines;
    }
    let hidden = lines.len() - max;
    lines.truncate(max);
    lines.push(format!("... and {hidden} more"));
    lines
}

/// Named fields of structured payloads.
fn fields(data: &RecordData) -> Vec<(&'static str, String)> {
    match data {
        RecordData::MX {
            preference,
            exchange,
        } => vec![
            ("preference", preference.to_string()),
            ("exchange", exchange.clone()),
        ],
        RecordData::SRV {
            priority,
            weight,
            port,
            target,
        } => vec![
            ("priority", priority.to_string()),
            ("weight", weight.to_string()),
            ("port", port.to_string()),
            ("target", target.clone()),
        ],
        RecordData::CAA { flag, tag, value } => vec![
            ("flag", flag.to_string()),
            ("tag", tag.clone()),
            ("value", value.clone()),
        ],
        RecordData::TLSA {
            usage,
            selector,
            matching_type,
            certificate,
        } => vec![
            ("usage", usage.to_string()),
            ("selector", selector.to_string()),
            ("matching_type", matching_type.to_string()),
            ("certificate", certificate.clone()),
        ],
        RecordData::SSHFP {
            algorithm,
            fingerprint_type,
            fingerprint,
        } => vec![
            ("algorithm", algorithm.to_string()),
            ("fingerprint_type", fingerprint_type.to_string()),
            ("fingerprint", fingerprint.clone()),
        ],
        RecordData::DS {
            key_tag,
            algorithm,
            digest_type,
            digest,
        } => vec![
            ("key_tag", key_tag.to_string()),
            ("algorithm", algorithm.to_string()),
            ("digest_type", digest_type.to_string()),
            ("digest", digest.clone()),
        ],
        RecordData::DNSKEY {
            flags,
            protocol,
            algorithm,
            public_key,
        } => vec![
            ("flags", flags.to_string()),
            ("protocol", protocol.to_string()),
            ("algorithm", algorithm.to_string()),
            ("public_key", public_key.clone()),
        ],
        RecordData::NAPTR {
            order,
            preference,
            flags,
            service,
            regexp,
            replacement,
        } => vec![
            ("order", order.to_string()),
            ("preference", preference.to_string()),
            ("flags", flags.clone()),
            ("service", service.clone()),
            ("regexp", regexp.clone()),
            ("replacement", replacement.clone()),
        ],
        RecordData::HTTPS(svc) | RecordData::SVCB(svc) => vec![
            ("priority", svc.priority.to_string()),
            ("target", svc.target.clone()),
            ("params", svc.params.clone()),
        ],
        _ => Vec::new(),
    }
}

fn field_deltas(old: &RecordData, new: &RecordData) -> Vec<String> {
    let old_fields = fields(old);
    let new_fields = fields(new);
    if old_fields.len() != new_fields.len() {
        return Vec::new();
    }
    old_fields
        .into_iter()
        .zip(new_fields)
        .filter(|((_, a), (_, b))| a != b)
        .map(|((name, a), (_, b))| format!("    {name}: {a} -> {b}"))
        .collect()
}
