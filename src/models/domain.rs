// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Intermediate representation (IR) input and the per-zone desired state.
//!
//! The IR is produced by an external configuration compiler and read here as
//! JSON. [`DomainConfig::from_ir`] turns one IR domain into the typed zone the
//! engine works on.

use super::meta::RecordMeta;
use super::record::{canonical_zone, Record};
use super::rtype::RecordType;
use super::target::quote_txt;
use crate::constants::{
    DEFAULT_NS_TTL_SECS, DEFAULT_RECORD_TTL_SECS, META_NO_NS, META_NS_TTL, TAG_SEPARATOR,
};
use crate::errors::RecordError;
use crate::ignore::IgnoreSpec;
use anyhow::{Context as _, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Top-level IR document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsConfig {
    #[serde(default)]
    pub registrars: Vec<ProviderDecl>,
    #[serde(default)]
    pub dns_providers: Vec<ProviderDecl>,
    #[serde(default)]
    pub domains: Vec<IrDomain>,
}

impl DnsConfig {
    /// Read and parse an IR file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid IR JSON.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read configuration {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse configuration {}", path.display()))
    }

    /// Declared type of a DNS provider or registrar, empty if none.
    #[must_use]
    pub fn declared_type(&self, name: &str) -> &str {
        self.dns_providers
            .iter()
            .chain(self.registrars.iter())
            .find(|p| p.name == name)
            .map_or("", |p| p.provider_type.as_str())
    }
}

/// A provider instance as declared in the IR.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDecl {
    pub name: String,
    #[serde(default, rename = "type")]
    pub provider_type: String,
}

/// A zone as it appears in the IR.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrDomain {
    /// DNS name, optionally suffixed with `!tag`
    pub name: String,
    #[serde(default)]
    pub registrar: String,
    /// Provider name to nameserver count, in declaration order
    #[serde(
        default,
        serialize_with = "serialize_counts",
        deserialize_with = "deserialize_counts"
    )]
    pub dns_provider_names: Vec<(String, i32)>,
    #[serde(default)]
    pub records: Vec<IrRecord>,
    #[serde(default)]
    pub nameservers: Vec<IrNameserver>,
    #[serde(default)]
    pub unmanaged: Vec<IgnoreSpec>,
    #[serde(default, alias = "unmanagedDisableSafetyCheck")]
    pub unmanaged_unsafe: bool,
    #[serde(default)]
    pub keep_unknown: bool,
    #[serde(default, alias = "meta")]
    pub metadata: BTreeMap<String, String>,
}

/// Nameserver entry in the IR.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrNameserver {
    pub name: String,
}

/// A record as it appears in the IR.
///
/// Structured types may carry their fields separately (`mxpreference`,
/// `srvport`, ...) next to `target`; when they are absent `target` holds the
/// full presentation text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub struct IrRecord {
    #[serde(rename = "type")]
    pub rtype: String,
    pub name: String,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mxpreference: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srvpriority: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srvweight: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srvport: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caaflag: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caatag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tlsausage: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tlsaselector: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tlsamatchingtype: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sshfpalgorithm: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sshfpfingerprint: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dskeytag: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsalgorithm: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsdigesttype: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsdigest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dnskeyflags: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dnskeyprotocol: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dnskeyalgorithm: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dnskeypublickey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naptrorder: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naptrpreference: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naptrflags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naptrservice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naptrregexp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svcpriority: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svcparams: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txtstrings: Option<Vec<String>>,
}

impl IrRecord {
    /// Presentation text combining `target` with any structured fields.
    #[must_use]
    pub fn presentation(&self, rtype: &RecordType) -> String {
        let target = self.target.as_str();
        match rtype {
            RecordType::MX => match self.mxpreference {
                Some(pref) => format!("{pref} {target}"),
                None => target.to_string(),
            },
            RecordType::SRV => match (self.srvpriority, self.srvweight, self.srvport) {
                (Some(p), Some(w), Some(port)) => format!("{p} {w} {port} {target}"),
                _ => target.to_string(),
            },
            RecordType::CAA => match &self.caatag {
                Some(tag) => format!(
                    "{} {tag} {}",
                    self.caaflag.unwrap_or_default(),
                    quote_txt(target)
                ),
                None => target.to_string(),
            },
            RecordType::TLSA => match (self.tlsausage, self.tlsaselector, self.tlsamatchingtype) {
                (Some(u), Some(s), Some(m)) => format!("{u} {s} {m} {target}"),
                _ => target.to_string(),
            },
            RecordType::SSHFP => match (self.sshfpalgorithm, self.sshfpfingerprint) {
                (Some(a), Some(f)) => format!("{a} {f} {target}"),
                _ => target.to_string(),
            },
            RecordType::DS => match (self.dskeytag, self.dsalgorithm, self.dsdigesttype) {
                (Some(k), Some(a), Some(d)) => {
                    let digest = self.dsdigest.as_deref().unwrap_or(target);
                    format!("{k} {a} {d} {digest}")
                }
                _ => target.to_string(),
            },
            RecordType::DNSKEY => {
                match (self.dnskeyflags, self.dnskeyprotocol, self.dnskeyalgorithm) {
                    (Some(f), Some(p), Some(a)) => {
                        let key = self.dnskeypublickey.as_deref().unwrap_or(target);
                        format!("{f} {p} {a} {key}")
                    }
                    _ => target.to_string(),
                }
            }
            RecordType::NAPTR => match (self.naptrorder, self.naptrpreference) {
                (Some(o), Some(p)) => format!(
                    "{o} {p} {} {} {} {target}",
                    quote_txt(self.naptrflags.as_deref().unwrap_or_default()),
                    quote_txt(self.naptrservice.as_deref().unwrap_or_default()),
                    quote_txt(self.naptrregexp.as_deref().unwrap_or_default()),
                ),
                _ => target.to_string(),
            },
            RecordType::HTTPS | RecordType::SVCB => match self.svcpriority {
                Some(p) => format!(
                    "{p} {target} {}",
                    self.svcparams.as_deref().unwrap_or_default()
                ),
                None => target.to_string(),
            },
            RecordType::TXT => match &self.txtstrings {
                Some(strings) if !strings.is_empty() => strings
                    .iter()
                    .map(|s| quote_txt(s))
                    .collect::<Vec<_>>()
                    .join(" "),
                _ => target.to_string(),
            },
            _ => target.to_string(),
        }
    }

    /// Convert into a validated record of `zone`.
    ///
    /// # Errors
    ///
    /// Returns an error if the type, label, target or metadata is invalid.
    pub fn to_record(&self, zone: &str) -> Result<Record, RecordError> {
        let rtype: RecordType = self.rtype.parse()?;
        let text = self.presentation(&rtype);
        let mut record = Record::parse(
            &self.name,
            zone,
            self.ttl.unwrap_or(DEFAULT_RECORD_TTL_SECS),
            rtype.as_str(),
            &text,
        )?;
        record.meta =
            RecordMeta::from_map(&self.meta).map_err(|reason| RecordError::InvalidRecordData {
                label: record.name.clone(),
                rtype: rtype.to_string(),
                reason,
            })?;
        Ok(record)
    }
}

/// Desired state of one zone, ready for planning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainConfig {
    /// DNS name, canonical, without tag
    pub name: String,
    /// Split-horizon tag, if any
    pub tag: Option<String>,
    /// `name` or `name!tag`; unique across the IR
    pub unique_name: String,
    pub registrar_name: String,
    /// Provider name to nameserver count (`-1` for all), in IR order
    pub dns_provider_names: Vec<(String, i32)>,
    pub records: Vec<Record>,
    /// Nameserver names, canonical with trailing dot
    pub nameservers: Vec<String>,
    pub unmanaged: Vec<IgnoreSpec>,
    /// Disables the unmanaged collision safety check
    pub unmanaged_unsafe: bool,
    /// NO_PURGE: never delete unknown records
    pub keep_unknown: bool,
    pub metadata: BTreeMap<String, String>,
}

impl DomainConfig {
    /// Build the typed zone from its IR form.
    ///
    /// # Errors
    ///
    /// Returns the first record that fails to convert.
    pub fn from_ir(ir: &IrDomain) -> Result<Self, RecordError> {
        let (name, tag) = split_tag(&ir.name);
        let unique_name = match &tag {
            Some(t) => format!("{name}{TAG_SEPARATOR}{t}"),
            None => name.clone(),
        };

        let records = ir
            .records
            .iter()
            .map(|r| r.to_record(&name))
            .collect::<Result<Vec<_>, _>>()?;

        let nameservers = ir
            .nameservers
            .iter()
            .map(|ns| super::target::canonical_name(&ns.name))
            .collect();

        Ok(Self {
            name,
            tag,
            unique_name,
            registrar_name: ir.registrar.clone(),
            dns_provider_names: ir.dns_provider_names.clone(),
            records,
            nameservers,
            unmanaged: ir.unmanaged.clone(),
            unmanaged_unsafe: ir.unmanaged_unsafe,
            keep_unknown: ir.keep_unknown,
            metadata: ir.metadata.clone(),
        })
    }

    /// True when zone metadata sets `no_ns=true`.
    #[must_use]
    pub fn no_ns(&self) -> bool {
        self.metadata
            .get(META_NO_NS)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// TTL for synthesized apex NS records.
    #[must_use]
    pub fn ns_ttl(&self) -> u32 {
        self.metadata
            .get(META_NS_TTL)
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_NS_TTL_SECS)
    }

    /// Provider names attached to the zone, in IR order.
    pub fn provider_names(&self) -> impl Iterator<Item = &str> {
        self.dns_provider_names.iter().map(|(n, _)| n.as_str())
    }
}

/// Split `name!tag` into the canonical name and the tag. An empty tag
/// (`name!`) is the untagged variant.
#[must_use]
pub fn split_tag(raw: &str) -> (String, Option<String>) {
    match raw.split_once(TAG_SEPARATOR) {
        Some((name, tag)) if !tag.is_empty() => (canonical_zone(name), Some(tag.to_string())),
        Some((name, _)) => (canonical_zone(name), None),
        None => (canonical_zone(raw), None),
    }
}

fn serialize_counts<S: Serializer>(
    counts: &[(String, i32)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(counts.len()))?;
    for (name, count) in counts {
        map.serialize_entry(name, count)?;
    }
    map.end()
}

fn deserialize_counts<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<(String, i32)>, D::Error> {
    struct CountsVisitor;

    impl<'de> Visitor<'de> for CountsVisitor {
        type Value = Vec<(String, i32)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of provider name to nameserver count")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut out = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((name, count)) = access.next_entry::<String, i32>()? {
                out.push((name, count));
            }
            Ok(out)
        }
    }

    deserializer.deserialize_map(CountsVisitor)
}

#[cfg(test)]
#[path = "domain_tests.rs"]
mod domain_tests;
