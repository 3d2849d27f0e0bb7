// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The single in-memory record representation shared by the IR loader, the
//! differ and every provider driver.

use super::meta::RecordMeta;
use super::rtype::RecordType;
use super::target::{canonical_name, RecordData, SvcData};
use crate::constants::APEX_LABEL;
use crate::errors::RecordError;
use hickory_proto::rr::Name;
use std::any::Any;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

/// Opaque handle on a provider's native representation of a record.
pub type NativeRecord = Arc<dyn Any + Send + Sync>;

/// A DNS record within one zone.
#[derive(Clone)]
pub struct Record {
    /// Short label within the zone, `@` for the apex
    pub name: String,
    /// Fully qualified name without trailing dot
    pub name_fqdn: String,
    /// Seconds; 0 means provider default
    pub ttl: u32,
    /// Typed payload
    pub data: RecordData,
    /// Provider hints
    pub meta: RecordMeta,
    /// Native record this one was fetched as, if any
    pub original: Option<NativeRecord>,
}

/// Identity of a record: (fqdn, type).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub name_fqdn: String,
    pub rtype: RecordType,
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name_fqdn, self.rtype)
    }
}

impl Record {
    /// Build a record, normalizing the label and validating the payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the label is not a valid name within `zone` or the
    /// payload fails validation.
    pub fn new(label: &str, zone: &str, ttl: u32, data: RecordData) -> Result<Self, RecordError> {
        let mut record = Self {
            name: String::new(),
            name_fqdn: String::new(),
            ttl,
            data: RecordData::TXT(vec![String::new()]),
            meta: RecordMeta::default(),
            original: None,
        };
        record.set_label(label, zone)?;
        record.set_data(data)?;
        Ok(record)
    }

    /// Build a record from its presentation-form target text.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is unknown or the text does not parse.
    pub fn parse(
        label: &str,
        zone: &str,
        ttl: u32,
        rtype: &str,
        text: &str,
    ) -> Result<Self, RecordError> {
        let rtype: RecordType = rtype.parse()?;
        let data =
            RecordData::parse(&rtype, text, zone).map_err(|reason| RecordError::InvalidRecordData {
                label: label.to_string(),
                rtype: rtype.to_string(),
                reason,
            })?;
        Self::new(label, zone, ttl, data)
    }

    /// Store the label and precompute the FQDN.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidName`] if the resulting name is not a valid
    /// DNS name or an absolute label lies outside `zone`.
    pub fn set_label(&mut self, label: &str, zone: &str) -> Result<(), RecordError> {
        let (short, fqdn) = canonical_label(label, zone);
        let zone = canonical_zone(zone);
        if fqdn != zone && !fqdn.ends_with(&format!(".{zone}")) {
            return Err(RecordError::InvalidName {
                name: label.to_string(),
                reason: format!("name is outside zone '{zone}'"),
            });
        }
        Name::from_ascii(&fqdn).map_err(|e| RecordError::InvalidName {
            name: fqdn.clone(),
            reason: e.to_string(),
        })?;
        self.name = short;
        self.name_fqdn = fqdn;
        Ok(())
    }

    /// Replace the payload after canonicalizing and validating it.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidRecordData`] when validation fails.
    pub fn set_data(&mut self, mut data: RecordData) -> Result<(), RecordError> {
        data.canonicalize();
        data.validate()
            .map_err(|reason| RecordError::InvalidRecordData {
                label: self.name.clone(),
                rtype: data.rtype().to_string(),
                reason,
            })?;
        self.data = data;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if `ip` is not an IPv4 address.
    pub fn set_target_a(&mut self, ip: &str) -> Result<(), RecordError> {
        let addr: Ipv4Addr = ip.trim().parse().map_err(|_| self.invalid("A", ip))?;
        self.set_data(RecordData::A(addr))
    }

    /// # Errors
    ///
    /// Returns an error if `ip` is not an IPv6 address.
    pub fn set_target_aaaa(&mut self, ip: &str) -> Result<(), RecordError> {
        let addr: Ipv6Addr = ip.trim().parse().map_err(|_| self.invalid("AAAA", ip))?;
        self.set_data(RecordData::AAAA(addr))
    }

    /// Set a single-name target (CNAME, NS, PTR, ALIAS).
    ///
    /// # Errors
    ///
    /// Returns an error if `rtype` is not a name type or the name is invalid.
    pub fn set_target_name(&mut self, rtype: &RecordType, name: &str) -> Result<(), RecordError> {
        let name = canonical_name(name);
        let data = match rtype {
            RecordType::CNAME => RecordData::CNAME(name),
            RecordType::NS => RecordData::NS(name),
            RecordType::PTR => RecordData::PTR(name),
            RecordType::ALIAS => RecordData::ALIAS(name),
            other => return Err(self.invalid(other.as_str(), "not a name-target type")),
        };
        self.set_data(data)
    }

    /// # Errors
    ///
    /// Returns an error if the exchange is not a valid name.
    pub fn set_target_mx(&mut self, preference: u16, exchange: &str) -> Result<(), RecordError> {
        self.set_data(RecordData::MX {
            preference,
            exchange: exchange.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if the target is not a valid name.
    pub fn set_target_srv(
        &mut self,
        priority: u16,
        weight: u16,
        port: u16,
        target: &str,
    ) -> Result<(), RecordError> {
        self.set_data(RecordData::SRV {
            priority,
            weight,
            port,
            target: target.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if the tag is not one of issue, issuewild or iodef.
    pub fn set_target_caa(&mut self, flag: u8, tag: &str, value: &str) -> Result<(), RecordError> {
        self.set_data(RecordData::CAA {
            flag,
            tag: tag.to_string(),
            value: value.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if a numeric field is out of range or the data is not hex.
    pub fn set_target_tlsa(
        &mut self,
        usage: u8,
        selector: u8,
        matching_type: u8,
        certificate: &str,
    ) -> Result<(), RecordError> {
        self.set_data(RecordData::TLSA {
            usage,
            selector,
            matching_type,
            certificate: certificate.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if a numeric field is out of range or the data is not hex.
    pub fn set_target_sshfp(
        &mut self,
        algorithm: u8,
        fingerprint_type: u8,
        fingerprint: &str,
    ) -> Result<(), RecordError> {
        self.set_data(RecordData::SSHFP {
            algorithm,
            fingerprint_type,
            fingerprint: fingerprint.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if the digest is not hex.
    pub fn set_target_ds(
        &mut self,
        key_tag: u16,
        algorithm: u8,
        digest_type: u8,
        digest: &str,
    ) -> Result<(), RecordError> {
        self.set_data(RecordData::DS {
            key_tag,
            algorithm,
            digest_type,
            digest: digest.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if the protocol is not 3.
    pub fn set_target_dnskey(
        &mut self,
        flags: u16,
        protocol: u8,
        algorithm: u8,
        public_key: &str,
    ) -> Result<(), RecordError> {
        self.set_data(RecordData::DNSKEY {
            flags,
            protocol,
            algorithm,
            public_key: public_key.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if the replacement is not a valid name.
    pub fn set_target_naptr(
        &mut self,
        order: u16,
        preference: u16,
        flags: &str,
        service: &str,
        regexp: &str,
        replacement: &str,
    ) -> Result<(), RecordError> {
        self.set_data(RecordData::NAPTR {
            order,
            preference,
            flags: flags.to_string(),
            service: service.to_string(),
            regexp: regexp.to_string(),
            replacement: replacement.to_string(),
        })
    }

    /// Set an HTTPS or SVCB target.
    ///
    /// # Errors
    ///
    /// Returns an error if `rtype` is neither HTTPS nor SVCB or the target is invalid.
    pub fn set_target_svc(
        &mut self,
        rtype: &RecordType,
        priority: u16,
        target: &str,
        params: &str,
    ) -> Result<(), RecordError> {
        let svc = SvcData {
            priority,
            target: target.to_string(),
            params: params.trim().to_string(),
        };
        let data = match rtype {
            RecordType::HTTPS => RecordData::HTTPS(svc),
            RecordType::SVCB => RecordData::SVCB(svc),
            other => return Err(self.invalid(other.as_str(), "not a service binding type")),
        };
        self.set_data(data)
    }

    /// Set TXT strings, kept as an ordered list of byte strings.
    ///
    /// # Errors
    ///
    /// Returns an error if `strings` is empty.
    pub fn set_target_txt(&mut self, strings: Vec<String>) -> Result<(), RecordError> {
        self.set_data(RecordData::TXT(strings))
    }

    /// Record type of the payload.
    #[must_use]
    pub fn rtype(&self) -> RecordType {
        self.data.rtype()
    }

    /// Presentation-form target used by the differ and every printer.
    #[must_use]
    pub fn target_combined(&self) -> String {
        self.data.target_combined()
    }

    /// Identity of the record.
    #[must_use]
    pub fn key(&self) -> RecordKey {
        RecordKey {
            name_fqdn: self.name_fqdn.clone(),
            rtype: self.rtype(),
        }
    }

    /// True if the record sits at the zone apex.
    #[must_use]
    pub fn is_apex(&self) -> bool {
        self.name == APEX_LABEL
    }

    /// Bring label and payload into canonical form. Total and idempotent.
    pub fn canonicalize(&mut self, zone: &str) {
        let (short, fqdn) = canonical_label(&self.name_or_fqdn(), zone);
        self.name = short;
        self.name_fqdn = fqdn;
        self.data.canonicalize();
    }

    /// Attach the provider's native representation.
    #[must_use]
    pub fn with_original<T: Any + Send + Sync>(mut self, native: T) -> Self {
        self.original = Some(Arc::new(native));
        self
    }

    /// Borrow the native representation as `T`, if it is one.
    #[must_use]
    pub fn original_as<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.original.as_ref().and_then(|o| o.downcast_ref::<T>())
    }

    fn name_or_fqdn(&self) -> String {
        if self.name_fqdn.is_empty() {
            self.name.clone()
        } else {
            format!("{}.", self.name_fqdn)
        }
    }

    fn invalid(&self, rtype: &str, value: &str) -> RecordError {
        RecordError::InvalidRecordData {
            label: self.name.clone(),
            rtype: rtype.to_string(),
            reason: format!("invalid value '{value}'"),
        }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.name_fqdn == other.name_fqdn
            && self.ttl == other.ttl
            && self.data == other.data
            && self.meta == other.meta
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("name", &self.name)
            .field("name_fqdn", &self.name_fqdn)
            .field("ttl", &self.ttl)
            .field("data", &self.data)
            .field("meta", &self.meta)
            .field("original", &self.original.is_some())
            .finish()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ttl={}",
            self.name,
            self.rtype(),
            self.target_combined(),
            self.ttl
        )
    }
}

/// Zone name in canonical form: lower-case, IDNA, no trailing dot.
#[must_use]
pub fn canonical_zone(zone: &str) -> String {
    canonical_name(zone).trim_end_matches('.').to_string()
}

/// Resolve a label against `zone`, returning `(short, fqdn)`.
///
/// `@`, the empty label and the zone's own absolute name all map to the apex.
/// Absolute labels inside the zone are shortened.
#[must_use]
pub fn canonical_label(label: &str, zone: &str) -> (String, String) {
    let zone = canonical_zone(zone);
    let raw = label.trim();
    if raw.is_empty() || raw == APEX_LABEL {
        return (APEX_LABEL.to_string(), zone);
    }

    let absolute = raw.ends_with('.');
    let lower = canonical_name(raw);
    let lower = lower.trim_end_matches('.');

    if absolute {
        if lower == zone {
            return (APEX_LABEL.to_string(), zone);
        }
        if let Some(short) = lower.strip_suffix(&format!(".{zone}")) {
            return (short.to_string(), lower.to_string());
        }
        return (lower.to_string(), lower.to_string());
    }

    (lower.to_string(), format!("{lower}.{zone}"))
}

/// Canonicalize both sides of a diff in place and sort deterministically by
/// (label, type, rendered target).
pub fn post_process_records(records: &mut [Record], zone: &str) {
    for record in records.iter_mut() {
        record.canonicalize(zone);
    }
    records.sort_by_cached_key(|r| {
        (
            r.name.clone(),
            r.rtype().as_str().to_string(),
            r.target_combined(),
        )
    });
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod record_tests;
