// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! User-facing correction stream.
//!
//! Preview and push share one format:
//!
//! ```text
//! ******************** Domain: example.com
//! ----- DNS Provider: cloudflare...2 corrections
//! #1: + CREATE www A 192.0.2.1 ttl=300
//! SUCCESS!
//! ```
//!
//! Logs go to stderr through `tracing`; this stream goes to stdout so the two
//! never interleave in pipes.

use std::io::Write;
use std::sync::Mutex;

/// Destination for the correction stream.
pub trait Printer: Send + Sync {
    /// Write one line.
    fn line(&self, text: &str);

    fn domain_heading(&self, domain: &str) {
        self.line(&format!("******************** Domain: {domain}"));
    }

    /// Heading for one provider or registrar section.
    ///
    /// `role` is `"DNS Provider"` or `"Registrar"`.
    fn provider_heading(&self, role: &str, name: &str, corrections: usize) {
        let plural = if corrections == 1 { "" } else { "s" };
        self.line(&format!("----- {role}: {name}...{corrections} correction{plural}"));
    }

    /// A numbered correction message; continuation lines are indented as given.
    fn correction(&self, index: usize, msg: &str) {
        self.line(&format!("#{index}: {msg}"));
    }

    /// A report-only line.
    fn report(&self, msg: &str) {
        self.line(msg);
    }

    /// Outcome of the correction just printed.
    fn outcome(&self, error: Option<&str>) {
        match error {
            None => self.line("SUCCESS!"),
            Some(err) => self.line(&format!("FAILURE! {err}")),
        }
    }

    fn warning(&self, msg: &str) {
        self.line(&format!("WARNING: {msg}"));
    }

    fn error(&self, msg: &str) {
        self.line(&format!("ERROR: {msg}"));
    }
}

/// Writes to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePrinter;

impl Printer for ConsolePrinter {
    fn line(&self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        // A closed stdout (e.g. `| head`) must not abort the run.
        let _ = writeln!(stdout, "{text}");
    }
}

/// Collects lines in memory.
#[derive(Debug, Default)]
pub struct BufferPrinter {
    lines: Mutex<Vec<String>>,
}

impl BufferPrinter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything printed so far, one entry per line.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn contents(&self) -> String {
        self.lines().join("\n")
    }
}

impl Printer for BufferPrinter {
    fn line(&self, text: &str) {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .extend(text.lines().map(String::from));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let printer = BufferPrinter::new();
        printer.domain_heading("example.com");
        printer.provider_heading("DNS Provider", "mem", 1);
        printer.correction(1, "± MODIFY www A 192.0.2.1 ttl=300 -> 192.0.2.2 ttl=300\n    a: x -> y");
        printer.outcome(None);
        printer.provider_heading("Registrar", "none", 0);
        printer.outcome(Some("boom"));

        assert_eq!(
            printer.lines(),
            vec![
                "******************** Domain: example.com",
                "----- DNS Provider: mem...1 correction",
                "#1: ± MODIFY www A 192.0.2.1 ttl=300 -> 192.0.2.2 ttl=300",
                "    a: x -> y",
                "SUCCESS!",
                "----- Registrar: none...0 corrections",
                "FAILURE! boom",
            ]
        );
    }
}
