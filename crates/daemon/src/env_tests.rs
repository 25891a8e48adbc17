// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::path::PathBuf;

#[test]
fn constants_match_env_var_names() {
    assert_eq!(names::MUDWORK_STATE_DIR, "MUDWORK_STATE_DIR");
    assert_eq!(names::XDG_STATE_HOME, "XDG_STATE_HOME");
    assert_eq!(names::RUST_LOG, "RUST_LOG");
}

#[test]
fn explicit_flag_wins() {
    let dir = resolve_state_dir(Some(PathBuf::from("/srv/mudwork")));
    assert_eq!(dir, PathBuf::from("/srv/mudwork"));
}

#[test]
fn state_dir_follows_env_var() {
    let _guard = EnvGuard::set(names::MUDWORK_STATE_DIR, "/custom/state");
    assert_eq!(state_dir(), Some(PathBuf::from("/custom/state")));
    assert_eq!(resolve_state_dir(None), PathBuf::from("/custom/state"));
}

/// RAII guard that sets an env var and restores it on drop.
struct EnvGuard {
    key: &'static str,
    original: Option<String>,
}

impl EnvGuard {
    fn set(key: &'static str, value: &str) -> Self {
        let original = std::env::var(key).ok();
        std::env::set_var(key, value);
        Self { key, original }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.original {
            Some(val) => std::env::set_var(self.key, val),
            None => std::env::remove_var(self.key),
        }
    }
}
