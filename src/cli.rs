// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line surface.
//!
//! ```text
//! dnscontrol preview [--domains example.com] [--providers all]
//! dnscontrol push -i --notify --report report.json
//! ```

use crate::constants::{DEFAULT_CONCURRENCY, DEFAULT_PROVIDER_CALL_TIMEOUT_SECS, SOCKS5_ENV_VAR};
use crate::context::Context;
use crate::creds::CredsStore;
use crate::http::notifier_client;
use crate::metrics::write_metrics_file;
use crate::models::DnsConfig;
use crate::notify::{build_notifier, NoopNotifier, Notifier};
use crate::printer::Printer;
use crate::providers::ProviderRegistry;
use crate::reconcilers::{CallPolicy, DomainFilter, Orchestrator, ProviderFilter, RunOptions};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Reconcile DNS zones across providers and registrars
#[derive(Parser, Debug)]
#[command(name = "dnscontrol")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the corrections that would be made
    Preview(RunArgs),

    /// Make the corrections
    Push(RunArgs),
}

impl Command {
    #[must_use]
    pub fn args(&self) -> &RunArgs {
        match self {
            Self::Preview(args) | Self::Push(args) => args,
        }
    }

    #[must_use]
    pub fn is_push(&self) -> bool {
        matches!(self, Self::Push(_))
    }
}

/// Arguments shared by `preview` and `push`.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// IR file produced by the configuration compiler
    #[arg(long, value_name = "FILE", default_value = "dnsconfig.json")]
    pub config: PathBuf,

    /// Credentials file (JSON, or YAML with a .yaml/.yml extension)
    #[arg(long, value_name = "FILE", default_value = "creds.json")]
    pub creds: PathBuf,

    /// Confirm each correction before running it (push only)
    #[arg(short, long)]
    pub interactive: bool,

    /// Send correction outcomes to the endpoints in the "notifications" creds entry
    #[arg(long)]
    pub notify: bool,

    /// Do not create zones missing at providers
    #[arg(long)]
    pub no_populate: bool,

    /// Delete zones present at providers but absent from the configuration
    #[arg(long)]
    pub depopulate: bool,

    /// Exit non-zero if any correction is planned
    #[arg(long)]
    pub expect_no_changes: bool,

    /// Print headings for providers without corrections
    #[arg(long)]
    pub full: bool,

    /// Zones to process: comma-separated, `name!tag`, `name!*`, or "all"
    #[arg(long, value_name = "FILTER", default_value = "")]
    pub domains: String,

    /// Providers to process: comma-separated, "all", or empty for the defaults
    #[arg(long, value_name = "FILTER", default_value = "")]
    pub providers: String,

    /// Write a JSON report of corrections per zone and provider
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// SOA serial handed to BIND providers, for reproducible output
    #[arg(long, value_name = "SERIAL")]
    pub bindserial: Option<u32>,

    /// Zones planned at the same time
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Deadline for one provider call, in seconds
    #[arg(long, default_value_t = DEFAULT_PROVIDER_CALL_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// SOCKS5 proxy for outbound HTTP (host:port or socks5://host:port)
    #[arg(long, env = SOCKS5_ENV_VAR)]
    pub socks5: Option<String>,

    /// Write Prometheus metrics in text format to this file at exit
    #[arg(long, value_name = "FILE")]
    pub metrics_file: Option<PathBuf>,
}

impl RunArgs {
    /// Orchestrator options for this invocation.
    #[must_use]
    pub fn run_options(&self, push: bool) -> RunOptions {
        RunOptions {
            push,
            interactive: push && self.interactive,
            populate: !self.no_populate,
            depopulate: self.depopulate,
            expect_no_changes: self.expect_no_changes,
            full: self.full,
            domains: DomainFilter::parse(&self.domains),
            providers: ProviderFilter::parse(&self.providers),
            report_path: self.report.clone(),
            concurrency: self.concurrency,
            policy: CallPolicy::with_timeout(Duration::from_secs(self.timeout_secs)),
        }
    }
}

/// Load everything, run the command and return the process exit code.
///
/// # Errors
///
/// Returns an error if the configuration or credentials cannot be loaded,
/// provider setup fails, or an output file cannot be written. Correction
/// failures are reflected in the exit code instead.
pub async fn execute(
    command: &Command,
    registry: &ProviderRegistry,
    printer: &dyn Printer,
    cancel: Arc<AtomicBool>,
) -> Result<u8> {
    let args = command.args();
    let push = command.is_push();
    if args.interactive && !push {
        warn!("--interactive only applies to push; ignoring");
    }

    let config = DnsConfig::load(&args.config).await?;
    let mut creds = CredsStore::load(&args.creds).await?;
    if let Some(serial) = args.bindserial {
        creds.inject_bind_serial(serial);
    }
    let ctx = Context::build(&config, &creds, registry)?;

    let notifier: Box<dyn Notifier> = if args.notify {
        let client = notifier_client(args.socks5.as_deref())?;
        build_notifier(true, creds.notifications(), &client)?
    } else {
        Box::new(NoopNotifier)
    };

    let options = args.run_options(push);
    debug!(?options, "Run options");
    let summary = Orchestrator::new(&ctx, options, printer)
        .with_notifier(notifier.as_ref())
        .with_cancel_flag(cancel)
        .run()
        .await?;

    if let Some(path) = &args.metrics_file {
        write_metrics_file(path).await?;
        info!(path = %path.display(), "Wrote metrics");
    }

    let code = summary.exit_code(args.expect_no_changes);
    if args.expect_no_changes && summary.changes > 0 {
        warn!(changes = summary.changes, "Changes planned but --expect-no-changes was given");
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["dnscontrol", "preview"]).unwrap();
        let args = cli.command.args();

        assert!(!cli.command.is_push());
        assert_eq!(args.config, PathBuf::from("dnsconfig.json"));
        assert_eq!(args.creds, PathBuf::from("creds.json"));
        assert_eq!(args.concurrency, DEFAULT_CONCURRENCY);

        let options = args.run_options(false);
        assert!(options.populate);
        assert!(options.domains.selects_all());
        assert_eq!(options.providers, ProviderFilter::Defaults);
        assert_eq!(options.policy.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_push_flags() {
        let cli = Cli::try_parse_from([
            "dnscontrol",
            "push",
            "-i",
            "--no-populate",
            "--depopulate",
            "--expect-no-changes",
            "--domains",
            "example.com!*",
            "--providers",
            "all",
            "--report",
            "out.json",
            "--bindserial",
            "2024010101",
            "--timeout-secs",
            "5",
        ])
        .unwrap();
        let args = cli.command.args();
        let options = args.run_options(cli.command.is_push());

        assert!(options.push);
        assert!(options.interactive);
        assert!(!options.populate);
        assert!(options.depopulate);
        assert!(options.expect_no_changes);
        assert_eq!(options.providers, ProviderFilter::All);
        assert_eq!(options.report_path, Some(PathBuf::from("out.json")));
        assert_eq!(args.bindserial, Some(2_024_010_101));
        assert_eq!(options.policy.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_interactive_ignored_for_preview() {
        let cli = Cli::try_parse_from(["dnscontrol", "preview", "-i"]).unwrap();
        assert!(!cli.command.args().run_options(false).interactive);
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["dnscontrol"]).is_err());
    }
}
