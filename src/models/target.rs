// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed record payloads.
//!
//! [`RecordData`] is the type-discriminated target of a record. Every variant
//! knows how to render itself in BIND presentation form
//! ([`RecordData::target_combined`]), how to parse that form back
//! ([`RecordData::parse`]) and how to bring itself into canonical form
//! ([`RecordData::canonicalize`]).
//!
//! Canonical form:
//! - names are lower-case and end with exactly one trailing dot
//! - IP addresses are stored parsed, so they always render in shortest form
//! - hex digests are lower-case
//! - TXT strings are kept byte-for-byte, including embedded quotes

use super::rtype::RecordType;
use crate::constants::CAA_TAGS;
use hickory_proto::rr::Name;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Service binding parameters shared by HTTPS and SVCB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvcData {
    /// 0 means alias mode
    pub priority: u16,
    /// Target name, `.` for "same as owner"
    pub target: String,
    /// Space separated `key=value` parameters in presentation form
    pub params: String,
}

/// LOC payload in its RFC 1876 wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loc {
    pub version: u8,
    pub size: u8,
    pub horiz_pre: u8,
    pub vert_pre: u8,
    pub latitude: u32,
    pub longitude: u32,
    pub altitude: u32,
}

/// Type-discriminated record target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    CNAME(String),
    NS(String),
    PTR(String),
    ALIAS(String),
    MX {
        preference: u16,
        exchange: String,
    },
    SRV {
        priority: u16,
        weight: u16,
        port: u16,
        target: String,
    },
    CAA {
        flag: u8,
        tag: String,
        value: String,
    },
    TLSA {
        usage: u8,
        selector: u8,
        matching_type: u8,
        certificate: String,
    },
    SSHFP {
        algorithm: u8,
        fingerprint_type: u8,
        fingerprint: String,
    },
    DS {
        key_tag: u16,
        algorithm: u8,
        digest_type: u8,
        digest: String,
    },
    DNSKEY {
        flags: u16,
        protocol: u8,
        algorithm: u8,
        public_key: String,
    },
    NAPTR {
        order: u16,
        preference: u16,
        flags: String,
        service: String,
        regexp: String,
        replacement: String,
    },
    LOC(Loc),
    HTTPS(SvcData),
    SVCB(SvcData),
    /// One or more character strings
    TXT(Vec<String>),
    /// Provider pseudo-type with opaque content
    Custom {
        rtype: String,
        content: String,
    },
}

impl RecordData {
    /// The record type this payload belongs to.
    #[must_use]
    pub fn rtype(&self) -> RecordType {
        match self {
            Self::A(_) => RecordType::A,
            Self::AAAA(_) => RecordType::AAAA,
            Self::CNAME(_) => RecordType::CNAME,
            Self::NS(_) => RecordType::NS,
            Self::PTR(_) => RecordType::PTR,
            Self::ALIAS(_) => RecordType::ALIAS,
            Self::MX { .. } => RecordType::MX,
            Self::SRV { .. } => RecordType::SRV,
            Self::CAA { .. } => RecordType::CAA,
            Self::TLSA { .. } => RecordType::TLSA,
            Self::SSHFP { .. } => RecordType::SSHFP,
            Self::DS { .. } => RecordType::DS,
            Self::DNSKEY { .. } => RecordType::DNSKEY,
            Self::NAPTR { .. } => RecordType::NAPTR,
            Self::LOC(_) => RecordType::LOC,
            Self::HTTPS(_) => RecordType::HTTPS,
            Self::SVCB(_) => RecordType::SVCB,
            Self::TXT(_) => RecordType::TXT,
            Self::Custom { rtype, .. } => RecordType::Custom(rtype.clone()),
        }
    }

    /// Deterministic presentation-form rendering of the target.
    #[must_use]
    pub fn target_combined(&self) -> String {
        match self {
            Self::A(ip) => ip.to_string(),
            Self::AAAA(ip) => ip.to_string(),
            Self::CNAME(n) | Self::NS(n) | Self::PTR(n) | Self::ALIAS(n) => n.clone(),
            Self::MX {
                preference,
                exchange,
            } => format!("{preference} {exchange}"),
            Self::SRV {
                priority,
                weight,
                port,
                target,
            } => format!("{priority} {weight} {port} {target}"),
            Self::CAA { flag, tag, value } => format!("{flag} {tag} {}", quote_txt(value)),
            Self::TLSA {
                usage,
                selector,
                matching_type,
                certificate,
            } => format!("{usage} {selector} {matching_type} {certificate}"),
            Self::SSHFP {
                algorithm,
                fingerprint_type,
                fingerprint,
            } => format!("{algorithm} {fingerprint_type} {fingerprint}"),
            Self::DS {
                key_tag,
                algorithm,
                digest_type,
                digest,
            } => format!("{key_tag} {algorithm} {digest_type} {digest}"),
            Self::DNSKEY {
                flags,
                protocol,
                algorithm,
                public_key,
            } => format!("{flags} {protocol} {algorithm} {public_key}"),
            Self::NAPTR {
                order,
                preference,
                flags,
                service,
                regexp,
                replacement,
            } => format!(
                "{order} {preference} {} {} {} {replacement}",
                quote_txt(flags),
                quote_txt(service),
                quote_txt(regexp)
            ),
            Self::LOC(loc) => loc.to_string(),
            Self::HTTPS(svc) | Self::SVCB(svc) => {
                if svc.params.is_empty() {
                    format!("{} {}", svc.priority, svc.target)
                } else {
                    format!("{} {} {}", svc.priority, svc.target, svc.params)
                }
            }
            Self::TXT(strings) => strings
                .iter()
                .map(|s| quote_txt(s))
                .collect::<Vec<_>>()
                .join(" "),
            Self::Custom { content, .. } => content.clone(),
        }
    }

    /// Bring the payload into canonical form. Idempotent and total.
    pub fn canonicalize(&mut self) {
        match self {
            Self::A(_) | Self::AAAA(_) | Self::LOC(_) | Self::TXT(_) | Self::Custom { .. } => {}
            Self::CNAME(n) | Self::NS(n) | Self::PTR(n) | Self::ALIAS(n) => {
                *n = canonical_name(n);
            }
            Self::MX { exchange, .. } => *exchange = canonical_name(exchange),
            Self::SRV { target, .. } => *target = canonical_name(target),
            Self::CAA { tag, .. } => *tag = tag.to_ascii_lowercase(),
            Self::TLSA { certificate, .. } => *certificate = certificate.to_ascii_lowercase(),
            Self::SSHFP { fingerprint, .. } => *fingerprint = fingerprint.to_ascii_lowercase(),
            Self::DS { digest, .. } => *digest = digest.to_ascii_lowercase(),
            Self::DNSKEY { .. } => {}
            Self::NAPTR { replacement, .. } => *replacement = canonical_name(replacement),
            Self::HTTPS(svc) | Self::SVCB(svc) => svc.target = canonical_name(&svc.target),
        }
    }

    /// Check field ranges and formats. Returns a human readable reason on failure.
    ///
    /// # Errors
    ///
    /// Returns the reason when a field is out of range or malformed.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::CNAME(n) | Self::NS(n) | Self::PTR(n) | Self::ALIAS(n) => validate_name(n),
            Self::MX { exchange, .. } => validate_name(exchange),
            Self::SRV { target, .. } => validate_name(target),
            Self::CAA { flag, tag, .. } => {
                if !CAA_TAGS.contains(&tag.as_str()) {
                    return Err(format!(
                        "CAA tag '{tag}' must be one of {}",
                        CAA_TAGS.join(", ")
                    ));
                }
                if *flag != 0 && *flag != 128 {
                    return Err(format!("CAA flag must be 0 or 128, got {flag}"));
                }
                Ok(())
            }
            Self::TLSA {
                usage,
                selector,
                matching_type,
                certificate,
            } => {
                check_range("TLSA usage", *usage, 0, 3)?;
                check_range("TLSA selector", *selector, 0, 1)?;
                check_range("TLSA matching type", *matching_type, 0, 2)?;
                check_hex("TLSA certificate", certificate)
            }
            Self::SSHFP {
                algorithm,
                fingerprint_type,
                fingerprint,
            } => {
                check_range("SSHFP algorithm", *algorithm, 1, 4)?;
                check_range("SSHFP fingerprint type", *fingerprint_type, 1, 2)?;
                check_hex("SSHFP fingerprint", fingerprint)
            }
            Self::DS { digest, .. } => check_hex("DS digest", digest),
            Self::DNSKEY { protocol, .. } => {
                if *protocol == 3 {
                    Ok(())
                } else {
                    Err(format!("DNSKEY protocol must be 3, got {protocol}"))
                }
            }
            Self::NAPTR { replacement, .. } => validate_name(replacement),
            Self::HTTPS(svc) | Self::SVCB(svc) => validate_name(&svc.target),
            Self::TXT(strings) => {
                if strings.is_empty() {
                    Err("TXT record needs at least one string".to_string())
                } else {
                    Ok(())
                }
            }
            Self::A(_) | Self::AAAA(_) | Self::LOC(_) | Self::Custom { .. } => Ok(()),
        }
    }

    /// Parse a presentation-form target for the given type.
    ///
    /// Relative names are resolved against `origin`; `@` means the origin itself.
    ///
    /// # Errors
    ///
    /// Returns the reason when the text does not fit the type's grammar.
    pub fn parse(rtype: &RecordType, text: &str, origin: &str) -> Result<Self, String> {
        let text = text.trim();
        let data = match rtype {
            RecordType::A => Self::A(
                Ipv4Addr::from_str(text).map_err(|e| format!("invalid IPv4 '{text}': {e}"))?,
            ),
            RecordType::AAAA => Self::AAAA(
                Ipv6Addr::from_str(text).map_err(|e| format!("invalid IPv6 '{text}': {e}"))?,
            ),
            RecordType::CNAME => Self::CNAME(resolve_name(text, origin)),
            RecordType::NS => Self::NS(resolve_name(text, origin)),
            RecordType::PTR => Self::PTR(resolve_name(text, origin)),
            RecordType::ALIAS => Self::ALIAS(resolve_name(text, origin)),
            RecordType::MX => {
                let t = fields(text, 2, 2)?;
                Self::MX {
                    preference: number(&t[0], "MX preference")?,
                    exchange: resolve_name(&t[1], origin),
                }
            }
            RecordType::SRV => {
                let t = fields(text, 4, 4)?;
                Self::SRV {
                    priority: number(&t[0], "SRV priority")?,
                    weight: number(&t[1], "SRV weight")?,
                    port: number(&t[2], "SRV port")?,
                    target: resolve_name(&t[3], origin),
                }
            }
            RecordType::CAA => {
                let t = fields(text, 3, 3)?;
                Self::CAA {
                    flag: number(&t[0], "CAA flag")?,
                    tag: t[1].to_ascii_lowercase(),
                    value: t[2].clone(),
                }
            }
            RecordType::TLSA => {
                let t = fields(text, 4, usize::MAX)?;
                Self::TLSA {
                    usage: number(&t[0], "TLSA usage")?,
                    selector: number(&t[1], "TLSA selector")?,
                    matching_type: number(&t[2], "TLSA matching type")?,
                    certificate: t[3..].concat(),
                }
            }
            RecordType::SSHFP => {
                let t = fields(text, 3, usize::MAX)?;
                Self::SSHFP {
                    algorithm: number(&t[0], "SSHFP algorithm")?,
                    fingerprint_type: number(&t[1], "SSHFP fingerprint type")?,
                    fingerprint: t[2..].concat(),
                }
            }
            RecordType::DS => {
                let t = fields(text, 4, usize::MAX)?;
                Self::DS {
                    key_tag: number(&t[0], "DS key tag")?,
                    algorithm: number(&t[1], "DS algorithm")?,
                    digest_type: number(&t[2], "DS digest type")?,
                    digest: t[3..].concat(),
                }
            }
            RecordType::DNSKEY => {
                let t = fields(text, 4, usize::MAX)?;
                Self::DNSKEY {
                    flags: number(&t[0], "DNSKEY flags")?,
                    protocol: number(&t[1], "DNSKEY protocol")?,
                    algorithm: number(&t[2], "DNSKEY algorithm")?,
                    public_key: t[3..].concat(),
                }
            }
            RecordType::NAPTR => {
                let t = fields(text, 6, 6)?;
                Self::NAPTR {
                    order: number(&t[0], "NAPTR order")?,
                    preference: number(&t[1], "NAPTR preference")?,
                    flags: t[2].clone(),
                    service: t[3].clone(),
                    regexp: t[4].clone(),
                    replacement: resolve_name(&t[5], origin),
                }
            }
            RecordType::LOC => Self::LOC(Loc::parse(text)?),
            RecordType::HTTPS | RecordType::SVCB => {
                let (head, params) = split_svc(text)?;
                let svc = SvcData {
                    priority: number(&head.0, "service priority")?,
                    target: resolve_name(&head.1, origin),
                    params,
                };
                if *rtype == RecordType::HTTPS {
                    Self::HTTPS(svc)
                } else {
                    Self::SVCB(svc)
                }
            }
            RecordType::TXT => {
                if text.starts_with('"') {
                    Self::TXT(tokenize(text)?)
                } else {
                    Self::TXT(vec![text.to_string()])
                }
            }
            RecordType::Custom(name) => Self::Custom {
                rtype: name.clone(),
                content: text.to_string(),
            },
        };
        Ok(data)
    }
}

/// Lower-case a name and give it exactly one trailing dot.
///
/// Non-ASCII names are converted to their IDNA form.
#[must_use]
pub fn canonical_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let trimmed = lower.trim_end_matches('.');
    if trimmed.is_empty() {
        return ".".to_string();
    }
    let ascii = if trimmed.is_ascii() {
        trimmed.to_string()
    } else {
        Name::from_utf8(trimmed)
            .map(|n| n.to_ascii().trim_end_matches('.').to_string())
            .unwrap_or_else(|_| trimmed.to_string())
    };
    format!("{ascii}.")
}

/// Resolve a possibly relative name against `origin`.
#[must_use]
pub fn resolve_name(name: &str, origin: &str) -> String {
    let origin = origin.trim_end_matches('.');
    if name == "@" {
        return canonical_name(origin);
    }
    if name.ends_with('.') || origin.is_empty() {
        return canonical_name(name);
    }
    canonical_name(&format!("{name}.{origin}"))
}

/// Validate a target name using hickory's parser.
///
/// # Errors
///
/// Returns the parser diagnostic when the name is malformed.
pub fn validate_name(name: &str) -> Result<(), String> {
    if name == "." {
        return Ok(());
    }
    Name::from_ascii(name)
        .map(|_| ())
        .map_err(|e| format!("invalid name '{name}': {e}"))
}

/// Quote a character string for presentation, escaping `\` and `"`.
#[must_use]
pub fn quote_txt(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Split presentation text into fields, honouring double quotes and backslash escapes.
///
/// # Errors
///
/// Returns an error on an unterminated quoted string.
pub fn tokenize(text: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let mut token = String::new();
        if c == '"' {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            token.push(escaped);
                        }
                    }
                    '"' => {
                        closed = true;
                        break;
                    }
                    _ => token.push(c),
                }
            }
            if !closed {
                return Err(format!("unterminated quoted string in '{text}'"));
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
        }
        tokens.push(token);
    }

    Ok(tokens)
}

fn fields(text: &str, min: usize, max: usize) -> Result<Vec<String>, String> {
    let tokens = tokenize(text)?;
    if tokens.len() < min || tokens.len() > max {
        return Err(format!(
            "expected {} fields, found {} in '{text}'",
            if min == max {
                min.to_string()
            } else {
                format!("at least {min}")
            },
            tokens.len()
        ));
    }
    Ok(tokens)
}

fn number<T: FromStr>(s: &str, what: &str) -> Result<T, String> {
    s.parse::<T>()
        .map_err(|_| format!("{what} '{s}' is not a valid number in range"))
}

fn check_range(what: &str, value: u8, min: u8, max: u8) -> Result<(), String> {
    if value < min || value > max {
        return Err(format!("{what} must be between {min} and {max}, got {value}"));
    }
    Ok(())
}

fn check_hex(what: &str, value: &str) -> Result<(), String> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("{what} '{value}' is not hexadecimal"));
    }
    Ok(())
}

fn split_svc(text: &str) -> Result<((String, String), String), String> {
    let mut parts = text.splitn(3, char::is_whitespace);
    let priority = parts.next().unwrap_or_default().to_string();
    let target = parts
        .next()
        .ok_or_else(|| format!("expected priority and target in '{text}'"))?
        .to_string();
    let params = parts.next().unwrap_or_default().trim().to_string();
    Ok(((priority, target), params))
}

// ============================================================================
// LOC encoding
// ============================================================================

const LOC_EQUATOR: i64 = 1 << 31;
const LOC_ALTITUDE_BASE: i64 = 10_000_000;
const LOC_DEFAULT_SIZE: u8 = 0x12;
const LOC_DEFAULT_HORIZ_PRE: u8 = 0x16;
const LOC_DEFAULT_VERT_PRE: u8 = 0x13;

impl Loc {
    /// Parse `d [m [s]] N|S d [m [s]] E|W alt[m] [size[m] [hp[m] [vp[m]]]]`.
    ///
    /// # Errors
    ///
    /// Returns the reason when the text is not a valid LOC presentation.
    pub fn parse(text: &str) -> Result<Self, String> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let mut pos = 0;
        let latitude = parse_coordinate(&tokens, &mut pos, 'N', 'S', 90)?;
        let longitude = parse_coordinate(&tokens, &mut pos, 'E', 'W', 180)?;

        let altitude_m = tokens
            .get(pos)
            .ok_or_else(|| "LOC is missing altitude".to_string())
            .and_then(|t| meters(t))?;
        pos += 1;
        #[allow(clippy::cast_possible_truncation)]
        let altitude = (altitude_m * 100.0).round() as i64 + LOC_ALTITUDE_BASE;
        let altitude =
            u32::try_from(altitude).map_err(|_| format!("LOC altitude {altitude_m}m out of range"))?;

        let size = optional_precision(tokens.get(pos), LOC_DEFAULT_SIZE)?;
        let horiz_pre = optional_precision(tokens.get(pos + 1), LOC_DEFAULT_HORIZ_PRE)?;
        let vert_pre = optional_precision(tokens.get(pos + 2), LOC_DEFAULT_VERT_PRE)?;

        Ok(Self {
            version: 0,
            size,
            horiz_pre,
            vert_pre,
            latitude,
            longitude,
            altitude,
        })
    }
}

impl std::fmt::Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let altitude = (i64::from(self.altitude) - LOC_ALTITUDE_BASE) as f64 / 100.0;
        write!(
            f,
            "{} {} {:.2}m {} {} {}",
            render_coordinate(self.latitude, 'N', 'S'),
            render_coordinate(self.longitude, 'E', 'W'),
            altitude,
            render_precision(self.size),
            render_precision(self.horiz_pre),
            render_precision(self.vert_pre)
        )
    }
}

fn parse_coordinate(
    tokens: &[&str],
    pos: &mut usize,
    positive: char,
    negative: char,
    max_degrees: i64,
) -> Result<u32, String> {
    let mut parts = Vec::new();
    let hemisphere = loop {
        let token = tokens
            .get(*pos)
            .ok_or_else(|| format!("LOC coordinate is missing its {positive}/{negative}"))?;
        *pos += 1;
        let upper = token.to_ascii_uppercase();
        if upper.len() == 1 && (upper.starts_with(positive) || upper.starts_with(negative)) {
            break upper.starts_with(positive);
        }
        if parts.len() == 3 {
            return Err(format!("LOC coordinate has too many fields near '{token}'"));
        }
        parts.push(*token);
    };

    let degrees: i64 = parts
        .first()
        .ok_or_else(|| "LOC coordinate is missing degrees".to_string())
        .and_then(|d| number(d, "LOC degrees"))?;
    let minutes: i64 = parts.get(1).map_or(Ok(0), |m| number(m, "LOC minutes"))?;
    let seconds: f64 = parts.get(2).map_or(Ok(0.0), |s| number(s, "LOC seconds"))?;
    if degrees > max_degrees || minutes >= 60 || !(0.0..60.0).contains(&seconds) {
        return Err("LOC coordinate out of range".to_string());
    }

    #[allow(clippy::cast_possible_truncation)]
    let millis = degrees * 3_600_000 + minutes * 60_000 + (seconds * 1000.0).round() as i64;
    let value = if hemisphere {
        LOC_EQUATOR + millis
    } else {
        LOC_EQUATOR - millis
    };
    u32::try_from(value).map_err(|_| "LOC coordinate out of range".to_string())
}

fn render_coordinate(value: u32, positive: char, negative: char) -> String {
    let offset = i64::from(value) - LOC_EQUATOR;
    let hemisphere = if offset >= 0 { positive } else { negative };
    let mut rest = offset.abs();
    let degrees = rest / 3_600_000;
    rest %= 3_600_000;
    let minutes = rest / 60_000;
    rest %= 60_000;
    format!(
        "{degrees} {minutes} {:.3} {hemisphere}",
        rest as f64 / 1000.0
    )
}

fn meters(token: &str) -> Result<f64, String> {
    let value = token.trim_end_matches(['m', 'M']);
    value
        .parse::<f64>()
        .map_err(|_| format!("LOC distance '{token}' is not a number"))
}

fn optional_precision(token: Option<&&str>, default: u8) -> Result<u8, String> {
    match token {
        None => Ok(default),
        Some(t) => {
            let m = meters(t)?;
            if m < 0.0 {
                return Err(format!("LOC precision '{t}' must not be negative"));
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let mut mantissa = (m * 100.0).round() as u64;
            let mut exponent = 0u8;
            while mantissa >= 10 && exponent < 9 {
                mantissa /= 10;
                exponent += 1;
            }
            #[allow(clippy::cast_possible_truncation)]
            Ok(((mantissa.min(9) as u8) << 4) | exponent)
        }
    }
}

fn render_precision(encoded: u8) -> String {
    let mantissa = u64::from(encoded >> 4);
    let exponent = u32::from(encoded & 0x0f);
    let centimeters = mantissa * 10u64.pow(exponent);
    if centimeters % 100 == 0 {
        format!("{}m", centimeters / 100)
    } else {
        format!("{:.2}m", centimeters as f64 / 100.0)
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod target_tests;
