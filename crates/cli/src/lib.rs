// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! mwcli - operator CLI for the mudwork provisioning daemon.
//!
//! Every command is one IPC round-trip to `mudworkd` over its Unix socket.
//! `reconcile` is the usual entry point for a directory notifier: it sends
//! the full authoritative identifier list and the daemon queues the delta.

mod cli;
mod commands;

pub mod client;
pub mod env;
pub mod error;

pub use cli::{Cli, Command};
pub use client::DaemonClient;
pub use error::{Error, Result};

/// Run a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let state_dir = cli.state_dir.unwrap_or_else(env::default_state_dir);
    let client = DaemonClient::new(&state_dir);
    let mut out = std::io::stdout().lock();
    match cli.command {
        Command::Ping => commands::ping(&client, &mut out),
        Command::Status => commands::status(&client, &mut out),
        Command::Notify { changes } => commands::notify(&client, changes, &mut out),
        Command::Reconcile { file } => commands::reconcile(&client, &file, &mut out),
        Command::Queue => commands::queue(&client, &mut out),
        Command::Shutdown => commands::shutdown(&client, &mut out),
    }
}
