// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command implementations. Output goes to a writer so tests can capture it.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use mw_ipc::{DaemonStatus, ReconcileSummary};

use crate::client::DaemonClient;
use crate::error::{Error, Result};

pub fn ping(client: &DaemonClient, out: &mut impl Write) -> Result<()> {
    client.ping()?;
    let version = client.hello()?;
    writeln!(out, "mudworkd {version} is running")?;
    Ok(())
}

pub fn status(client: &DaemonClient, out: &mut impl Write) -> Result<()> {
    let status = client.status()?;
    write_status(&status, out)
}

pub fn write_status(status: &DaemonStatus, out: &mut impl Write) -> Result<()> {
    writeln!(out, "pid:           {}", status.pid)?;
    writeln!(out, "uptime:        {}s", status.uptime_secs)?;
    writeln!(out, "queued:        {}", status.queued)?;
    writeln!(out, "managed users: {}", status.managed_users)?;
    writeln!(out, "db size:       {} bytes", status.db_size_bytes)?;
    writeln!(out, "test mode:     {}", status.test_mode)?;
    if status.responses.is_empty() {
        writeln!(out, "responses:     none")?;
    } else {
        let counts: Vec<String> = status
            .responses
            .iter()
            .map(|(code, n)| format!("{code}={n}"))
            .collect();
        writeln!(out, "responses:     {}", counts.join(" "))?;
    }
    Ok(())
}

pub fn notify(client: &DaemonClient, changes: usize, out: &mut impl Write) -> Result<()> {
    client.notify(changes)?;
    writeln!(out, "notified daemon of {changes} change(s)")?;
    Ok(())
}

pub fn reconcile(client: &DaemonClient, file: &Path, out: &mut impl Write) -> Result<()> {
    let identifiers = if file == Path::new("-") {
        read_identifiers(std::io::stdin().lock())?
    } else {
        read_identifiers(BufReader::new(File::open(file)?))?
    };
    if identifiers.is_empty() {
        // An empty snapshot would queue a removal for every managed user.
        return Err(Error::EmptySnapshot(file.display().to_string()));
    }
    let summary = client.reconcile(identifiers)?;
    write_summary(&summary, out)
}

pub fn write_summary(summary: &ReconcileSummary, out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "queued {} add(s), {} remove(s)",
        summary.queued_add, summary.queued_remove
    )?;
    let dups = summary.dup_add + summary.dup_remove;
    if dups > 0 {
        writeln!(out, "{dups} change(s) were already queued")?;
    }
    Ok(())
}

pub fn queue(client: &DaemonClient, out: &mut impl Write) -> Result<()> {
    let entries = client.list_queue()?;
    if entries.is_empty() {
        writeln!(out, "queue is empty")?;
    }
    for entry in entries {
        writeln!(out, "{entry}")?;
    }
    Ok(())
}

pub fn shutdown(client: &DaemonClient, out: &mut impl Write) -> Result<()> {
    client.shutdown()?;
    writeln!(out, "daemon shutting down")?;
    Ok(())
}

/// One identifier per line; surrounding whitespace and blank lines are ignored.
pub fn read_identifiers(reader: impl BufRead) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let id = line.trim();
        if !id.is_empty() {
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
