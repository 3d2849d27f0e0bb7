// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use dnscontrol::{
    cli::{execute, Cli},
    printer::ConsolePrinter,
    providers::ProviderRegistry,
};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Build Tokio runtime with custom thread names
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .thread_name("dnscontrol-worker")
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(async_main(cli)) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging.
///
/// Format: timestamp file:line LEVEL message, on stderr so the correction
/// stream on stdout stays clean.
///
/// Respects RUST_LOG (default `info`) and RUST_LOG_FORMAT (`json` or `text`).
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(cli: Cli) -> Result<u8> {
    init_tracing();
    info!(
        command = if cli.command.is_push() { "push" } else { "preview" },
        "Starting dnscontrol"
    );

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; finishing the running correction and skipping the rest");
            flag.store(true, Ordering::SeqCst);
        }
    });

    let registry = ProviderRegistry::with_builtin();
    debug!(types = ?registry.type_names(), "Provider registry ready");

    execute(&cli.command, &registry, &ConsolePrinter, cancel).await
}
