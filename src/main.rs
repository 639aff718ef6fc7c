// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod application;
mod cli;
pub mod config;
mod kubernetes;
mod output;
pub mod progress;
mod search;
mod selector;

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::prelude::*;

use cli::{Args, Command};
use kubernetes::AccountPool;
use search::{AccountDirectory, SearchPipeline, SearchQuery};

/// Initialize logging with file output and optional stderr
fn init_logging(verbose: bool, to_stderr: bool) {
    use tracing_rolling_file::{RollingConditionBase, RollingFileAppenderBase};
    use tracing_subscriber::fmt::format::FmtSpan;

    // Create log directory
    let log_dir = config::base_dir()
        .map(|p| p.join("log"))
        .unwrap_or_else(|_| std::path::PathBuf::from("."));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
        return;
    }

    // File appender with size-based rotation:
    // - Max 10MB per file
    // - Keep up to 5 files (total max ~50MB)
    // - Also rotate daily
    let log_path = log_dir.join("k8pick.log");
    let condition = RollingConditionBase::new()
        .daily()
        .max_size(10 * 1024 * 1024); // 10MB

    let file_appender = match RollingFileAppenderBase::new(log_path, condition, 5) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {}", e);
            return;
        }
    };

    // Use non-blocking writer for better performance
    let (non_blocking, _guard) = file_appender.get_non_blocking_appender();
    // Leak the guard to keep the background writer alive
    std::mem::forget(_guard);

    let filter = if verbose { "k8pick=debug" } else { "k8pick=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    // File layer (always enabled)
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_span_events(FmtSpan::NONE);

    if to_stderr && verbose {
        // Both file and stderr output
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::NONE);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(stderr_layer)
            .init();
    } else {
        // File only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (aws-lc-rs)
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let args = Args::parse();

    // Initialize logging
    // - Always log to file (~/.k8pick/log/k8pick.log)
    // - For one-shot commands with -v, also log to stderr
    let is_one_shot = !matches!(args.command, None | Some(Command::Interactive));
    init_logging(args.verbose, is_one_shot && args.verbose);

    let pool = Arc::new(AccountPool::new(progress::create_progress_handle())?);

    match &args.command {
        Some(Command::Search {
            account,
            namespace,
            kind,
        }) => run_search(&args, pool, account, namespace, kind).await,
        Some(Command::Accounts) => run_accounts(&args, pool).await,
        Some(Command::Interactive) | None => cli::run_repl(&args, pool).await,
    }
}

/// One-shot candidate search, printed in the requested output format.
///
/// Runs through the same latest-wins pipeline as the editing session so
/// expression guarding and name extraction behave identically.
async fn run_search(
    args: &Args,
    pool: Arc<AccountPool>,
    account: &str,
    namespace: &str,
    kind: &str,
) -> Result<()> {
    let progress = Arc::clone(pool.progress());
    let pipeline = SearchPipeline::new(pool, progress);

    let handle = pipeline
        .submit(SearchQuery {
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            account: account.to_string(),
        })
        .await;
    if let Some(handle) = handle {
        let _ = handle.await;
    }

    let state = pipeline.state().await;
    if let Some(error) = state.last_error {
        eprintln!("Error searching candidates: {}", error);
        std::process::exit(1);
    }

    let listing = output::candidates_listing(kind, namespace, account, &state.candidates);
    println!("{}", listing.format(&args.output, args.no_headers));
    Ok(())
}

/// List the known accounts with their namespace and kind counts.
async fn run_accounts(args: &Args, pool: Arc<AccountPool>) -> Result<()> {
    let accounts = pool.account_details(kubernetes::KUBERNETES_PROVIDER).await?;
    let listing = output::accounts_listing(&accounts);
    println!("{}", listing.format(&args.output, args.no_headers));
    Ok(())
}
