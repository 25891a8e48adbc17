// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand};

const QUICKSTART_HELP: &str = "\
Examples:
  mudwork ping                      Check the daemon is up
  mudwork reconcile --file uids.txt Queue the delta against a directory snapshot
  ldapsearch ... | mudwork reconcile --file -
  mudwork queue                     Show pending changes";

#[derive(Parser)]
#[command(name = "mudwork")]
#[command(about = "Operator CLI for the mudwork provisioning daemon")]
#[command(version)]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Daemon state directory (defaults to $MUDWORK_STATE_DIR or the XDG state dir)
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check whether the daemon is running
    Ping,

    /// Show daemon status and counters
    Status,

    /// Tell the daemon that changes were queued and it should drain
    Notify {
        /// Number of changes, for the daemon's log
        #[arg(default_value_t = 1)]
        changes: usize,
    },

    /// Send the authoritative identifier list; the daemon queues the delta
    Reconcile {
        /// File with one identifier per line, or '-' for stdin
        #[arg(long, short)]
        file: PathBuf,
    },

    /// List pending queue entries
    Queue,

    /// Stop the daemon
    Shutdown,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
