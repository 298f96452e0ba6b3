// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! vigil daemon (vigild)
//!
//! Background agent that tails logs, diffs host inventories, correlates
//! events into alerts and persists everything into the local store.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::path::{Path, PathBuf};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};
use vigil_daemon::config::Config;
use vigil_daemon::lifecycle::{self, LifecycleError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config_path: Option<PathBuf> = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("vigild {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                let Some(path) = args.next() else {
                    eprintln!("error: --config requires a path");
                    std::process::exit(1);
                };
                config_path = Some(PathBuf::from(path));
            }
            other => {
                eprintln!("error: unexpected argument '{other}'");
                eprintln!("Usage: vigild [--config <path>] [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load(config_path.as_deref())?;
    std::fs::create_dir_all(&config.state_dir)?;

    // Rotate the log file if it has grown too large
    rotate_log_if_needed(&config.log_path());

    let _log_guard = setup_logging(&config)?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting vigild");

    let daemon = match lifecycle::startup(config) {
        Ok(daemon) => daemon,
        Err(LifecycleError::LockFailed(path)) => {
            // Another agent is already running; report its pid
            let pid = std::fs::read_to_string(&path).unwrap_or_default().trim().to_string();
            eprintln!("vigild is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            error!("failed to start agent: {e}");
            return Err(e.into());
        }
    };

    info!("agent ready");
    println!("READY");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    daemon.shutdown().await;
    Ok(())
}

fn print_help() {
    println!("vigild {}", env!("CARGO_PKG_VERSION"));
    println!("vigil daemon - host intrusion detection agent");
    println!();
    println!("USAGE:");
    println!("    vigild [--config <path>]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <path>  TOML configuration file");
    println!("    -h, --help           Print help information");
    println!("    -v, --version        Print version information");
    println!();
    println!("Query the collected data with the `vigil` CLI.");
}

/// Maximum log file size before rotation (10 MB).
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Number of rotated log files to keep (vigild.log.1, .2, .3).
const MAX_ROTATED_LOGS: u32 = 3;

/// Rotate the daemon log file if it exceeds [`MAX_LOG_SIZE`].
///
/// Shifts `vigild.log` → `vigild.log.1` → `vigild.log.2` → `vigild.log.3`,
/// deleting the oldest. Best-effort: rotation failures are silently
/// ignored so the daemon still starts.
fn rotate_log_if_needed(log_path: &Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(_) => return,
    };

    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();

    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }

    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_path = config.log_path();
    let directory = log_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = log_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "vigild.log".to_string());

    // Rotation happens at startup via rotate_log_if_needed
    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
