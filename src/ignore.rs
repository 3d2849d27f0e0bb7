// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unmanaged-record matching.
//!
//! A zone lists `{label, type, target}` glob triples naming existing records
//! the engine must never touch. Matching is case-insensitive over the
//! canonical short label, the upper-case type name and the rendered target.
//! `*` matches any run of characters (including `.` and `/`), `?` matches one
//! character, and an empty pattern behaves like `*`. The type pattern may be a
//! comma-separated list (`"A,AAAA"`).

use crate::errors::DiffError;
use crate::models::Record;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One unmanaged triple as written in the IR.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreSpec {
    #[serde(default, alias = "label_pattern")]
    pub label: String,
    #[serde(default, rename = "type", alias = "rType_pattern")]
    pub rtype: String,
    #[serde(default, alias = "target_pattern")]
    pub target: String,
}

impl fmt::Display for IgnoreSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "label={} type={} target={}",
            or_star(&self.label),
            or_star(&self.rtype),
            or_star(&self.target)
        )
    }
}

fn or_star(s: &str) -> &str {
    if s.trim().is_empty() {
        "*"
    } else {
        s
    }
}

#[derive(Debug, Clone)]
struct CompiledPattern {
    label: Regex,
    rtypes: Vec<Regex>,
    target: Regex,
}

impl CompiledPattern {
    fn matches(&self, label: &str, rtype: &str, target: &str) -> bool {
        self.label.is_match(label)
            && self.rtypes.iter().any(|p| p.is_match(rtype))
            && self.target.is_match(target)
    }
}

/// Translate a glob into an anchored, case-insensitive regex.
///
/// Supports `*`, `?` and bracket classes (`[abc]`, `[!abc]`, `[a-z]`).
fn glob_to_regex(glob: &str) -> Result<String, String> {
    let mut out = String::with_capacity(glob.len() + 8);
    out.push_str("(?is)^");
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                let mut class = String::new();
                if chars.peek() == Some(&'!') {
                    chars.next();
                    class.push('^');
                }
                let mut closed = false;
                while let Some(c) = chars.next() {
                    if c == ']' && !class.is_empty() && class != "^" {
                        closed = true;
                        break;
                    }
                    if c == '\\' || c == '[' || c == '&' || c == '~' {
                        class.push('\\');
                    }
                    class.push(c);
                }
                if !closed {
                    return Err("unclosed character class".to_string());
                }
                out.push('[');
                out.push_str(&class);
                out.push(']');
            }
            _ => out.push_str(&regex::escape(&c.to_string())),
        }
    }
    out.push('$');
    Ok(out)
}

fn compile(text: &str) -> Result<Regex, DiffError> {
    let text = or_star(text).trim();
    let invalid = |reason: String| DiffError::InvalidPattern {
        pattern: text.to_string(),
        reason,
    };
    let source = glob_to_regex(text).map_err(invalid)?;
    Regex::new(&source).map_err(|e| invalid(e.to_string()))
}

/// Compiled set of unmanaged patterns for one zone.
#[derive(Debug, Clone, Default)]
pub struct IgnoreEngine {
    patterns: Vec<CompiledPattern>,
}

impl IgnoreEngine {
    /// Compile the zone's unmanaged triples.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::InvalidPattern`] if any glob is malformed.
    pub fn compile(specs: &[IgnoreSpec]) -> Result<Self, DiffError> {
        let patterns = specs
            .iter()
            .map(|spec| {
                let rtypes = if spec.rtype.trim().is_empty() {
                    vec![compile("*")?]
                } else {
                    spec.rtype
                        .split(',')
                        .map(compile)
                        .collect::<Result<Vec<_>, _>>()?
                };
                Ok(CompiledPattern {
                    label: compile(&spec.label)?,
                    rtypes,
                    target: compile(&spec.target)?,
                })
            })
            .collect::<Result<Vec<_>, DiffError>>()?;
        Ok(Self { patterns })
    }

    /// True when no pattern is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Match raw (label, type, target) text against every pattern.
    #[must_use]
    pub fn matches(&self, label: &str, rtype: &str, target: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches(label, rtype, target))
    }

    /// True if the record is hidden by an unmanaged pattern.
    #[must_use]
    pub fn is_ignored(&self, record: &Record) -> bool {
        !self.is_empty()
            && self.matches(
                &record.name,
                record.rtype().as_str(),
                &record.target_combined(),
            )
    }

    /// Split `existing` into (managed, ignored), preserving order.
    #[must_use]
    pub fn partition<'a>(&self, existing: &'a [Record]) -> (Vec<&'a Record>, Vec<&'a Record>) {
        existing.iter().partition(|r| !self.is_ignored(r))
    }

    /// Safety check: a desired record that an unmanaged pattern would hide
    /// collides with an ignored existing record sharing its label and type.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::UnmanagedCollision`] for the first collision found.
    pub fn check_collisions(
        &self,
        zone: &str,
        desired: &[Record],
        ignored: &[&Record],
    ) -> Result<(), DiffError> {
        if ignored.is_empty() {
            return Ok(());
        }
        for record in desired {
            if self.would_hide(record, ignored) {
                return Err(DiffError::UnmanagedCollision {
                    zone: zone.to_string(),
                    label: record.name.clone(),
                    rtype: record.rtype().to_string(),
                    target: record.target_combined(),
                });
            }
        }
        Ok(())
    }

    /// True if `desired` falls under a pattern that already hides an existing
    /// record with the same label and type.
    #[must_use]
    pub fn would_hide(&self, desired: &Record, ignored: &[&Record]) -> bool {
        self.is_ignored(desired)
            && ignored
                .iter()
                .any(|r| r.name == desired.name && r.rtype() == desired.rtype())
    }
}

#[cfg(test)]
#[path = "ignore_tests.rs"]
mod ignore_tests;
