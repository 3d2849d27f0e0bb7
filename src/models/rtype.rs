// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record type enumeration.

use crate::errors::RecordError;
use std::fmt;
use std::str::FromStr;

/// DNS record kinds understood by the engine.
///
/// Provider-specific pseudo-types (redirect rules, routing rules, vendor
/// aliases) are carried as [`RecordType::Custom`] with their upper-case name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RecordType {
    A,
    AAAA,
    ALIAS,
    CAA,
    CNAME,
    DNSKEY,
    DS,
    HTTPS,
    LOC,
    MX,
    NAPTR,
    NS,
    PTR,
    SRV,
    SSHFP,
    SVCB,
    TLSA,
    TXT,
    Custom(String),
}

impl RecordType {
    /// Upper-case presentation name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::A => "A",
            Self::AAAA => "AAAA",
            Self::ALIAS => "ALIAS",
            Self::CAA => "CAA",
            Self::CNAME => "CNAME",
            Self::DNSKEY => "DNSKEY",
            Self::DS => "DS",
            Self::HTTPS => "HTTPS",
            Self::LOC => "LOC",
            Self::MX => "MX",
            Self::NAPTR => "NAPTR",
            Self::NS => "NS",
            Self::PTR => "PTR",
            Self::SRV => "SRV",
            Self::SSHFP => "SSHFP",
            Self::SVCB => "SVCB",
            Self::TLSA => "TLSA",
            Self::TXT => "TXT",
            Self::Custom(name) => name,
        }
    }

    /// True for types whose payload is a single domain name.
    #[must_use]
    pub fn is_name_target(&self) -> bool {
        matches!(self, Self::ALIAS | Self::CNAME | Self::NS | Self::PTR)
    }
}

impl FromStr for RecordType {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Ok(match upper.as_str() {
            "A" => Self::A,
            "AAAA" => Self::AAAA,
            "ALIAS" => Self::ALIAS,
            "CAA" => Self::CAA,
            "CNAME" => Self::CNAME,
            "DNSKEY" => Self::DNSKEY,
            "DS" => Self::DS,
            "HTTPS" => Self::HTTPS,
            "LOC" => Self::LOC,
            "MX" => Self::MX,
            "NAPTR" => Self::NAPTR,
            "NS" => Self::NS,
            "PTR" => Self::PTR,
            "SRV" => Self::SRV,
            "SSHFP" => Self::SSHFP,
            "SVCB" => Self::SVCB,
            "TLSA" => Self::TLSA,
            "TXT" => Self::TXT,
            "" => return Err(RecordError::UnknownType(s.to_string())),
            _ if upper
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') =>
            {
                Self::Custom(upper)
            }
            _ => return Err(RecordError::UnknownType(s.to_string())),
        })
    }
}

impl TryFrom<String> for RecordType {
    type Error = RecordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
