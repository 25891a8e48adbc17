// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

/// (constant name, what the variable controls)
const ENV_NAMES: &[(&str, &str)] = &[
    ("MUDWORK_STATE_DIR", "override the mudwork state directory"),
    ("XDG_STATE_HOME", "XDG base directory for state data"),
    ("RUST_LOG", "log filter directives for tracing-subscriber"),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = std::env::var("OUT_DIR")?;
    let path = std::path::Path::new(&out_dir).join("env_names.rs");
    let mut f = std::fs::File::create(path)?;

    for (name, doc) in ENV_NAMES {
        writeln!(f, "/// Environment variable: {doc}.")?;
        writeln!(f, "pub const {name}: &str = \"{name}\";")?;
    }
    println!("cargo:rerun-if-changed=build.rs");

    Ok(())
}
