// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! vigil CLI: read-only queries over the agent's store.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vigil_storage::Store;

#[derive(Parser)]
#[command(name = "vigil", version, about = "Query the vigil host intrusion detection agent")]
struct Cli {
    /// State directory holding hids.db (defaults to the daemon's)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List log events
    Events(commands::EventsArgs),
    /// List process events
    Processes(commands::ProcessesArgs),
    /// List network events
    Network(commands::NetworkArgs),
    /// List alerts
    Alerts(commands::AlertsArgs),
    /// Show row counts and recency
    Status,
}

fn state_dir(cli: &Cli) -> PathBuf {
    if let Some(dir) = &cli.state_dir {
        return dir.clone();
    }
    if let Ok(dir) = std::env::var("VIGIL_STATE_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::state_dir()
        .map(|dir| dir.join("vigil"))
        .unwrap_or_else(|| PathBuf::from("/var/lib/vigil"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let db_path = state_dir(&cli).join("hids.db");
    let store = Store::open_read_only(&db_path)
        .with_context(|| format!("opening {} (is vigild running?)", db_path.display()))?;

    match &cli.command {
        Command::Events(args) => commands::events(&store, args, cli.json),
        Command::Processes(args) => commands::processes(&store, args, cli.json),
        Command::Network(args) => commands::network(&store, args, cli.json),
        Command::Alerts(args) => commands::alerts(&store, args, cli.json),
        Command::Status => commands::status(&store, cli.json),
    }
}
