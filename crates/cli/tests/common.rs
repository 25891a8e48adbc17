// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::unwrap_used)]

use std::os::unix::net::UnixListener;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use mw_ipc::{framing, DaemonRequest, DaemonResponse};

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub fn mudwork() -> Command {
    cargo_bin_cmd!("mudwork")
}

/// A stand-in daemon answering a fixed number of requests on
/// `<state_dir>/daemon.sock`.
pub struct FakeDaemon {
    pub dir: TempDir,
    pub requests: Arc<Mutex<Vec<DaemonRequest>>>,
    handle: Option<JoinHandle<()>>,
}

impl FakeDaemon {
    /// Answer each incoming request with the next scripted response.
    pub fn start(responses: Vec<DaemonResponse>) -> Self {
        let dir = TempDir::new().unwrap();
        let listener = UnixListener::bind(dir.path().join("daemon.sock")).unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();
        let handle = std::thread::spawn(move || {
            for response in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let request = framing::read_request(&mut stream).unwrap();
                seen.lock().unwrap().push(request);
                framing::write_response(&mut stream, &response).unwrap();
            }
        });
        FakeDaemon {
            dir,
            requests,
            handle: Some(handle),
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = mudwork();
        cmd.arg("--state-dir").arg(self.dir.path());
        cmd
    }

    /// Wait for the scripted exchange to finish and return what was asked.
    pub fn finish(mut self) -> Vec<DaemonRequest> {
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap();
        }
        self.requests.lock().unwrap().clone()
    }
}
