// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! mudworkd - the mudwork provisioning daemon.
//!
//! Keeps the provisioning queue in SQLite and listens on a Unix socket for
//! directory snapshots and change notifications from `mudwork`.
//!
//! Usage:
//!   mudworkd --config <path> [--state-dir <path>] [--test-mode] [--no-init]
//!   mudworkd --config <path> --groups

use std::fs;
use std::io::Write;
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use mw_core::Database;

use mwd::api::HttpBulkApi;
use mwd::builder::{BatchBuilder, BuildSettings};
use mwd::config::{Config, DEFAULT_CONFIG_PATH};
use mwd::drain::Drainer;
use mwd::lookup::LdapLookup;
use mwd::reconcile::Reconciler;
use mwd::server::{self, ServerContext};
use mwd::stats::{self, Stats, SAMPLE_INTERVAL};
use mwd::submit::Submitter;
use mwd::token::{HttpTokenIssuer, TokenProvider};
use mwd::{env, worker, SharedDb};

/// Socket filename within the state directory.
const SOCKET_NAME: &str = "daemon.sock";
/// PID filename within the state directory.
const PID_NAME: &str = "daemon.pid";
/// Lock filename for single instance guarantee.
const LOCK_NAME: &str = "daemon.lock";

#[derive(Parser, Debug)]
#[command(name = "mudworkd")]
#[command(about = "Provisioning queue daemon for the user-management bulk API")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory for the socket, PID file, lock and log
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Send batches with testOnly=true and leave managed users untouched
    #[arg(long)]
    test_mode: bool,

    /// Skip the token renewal at startup
    #[arg(long)]
    no_init: bool,

    /// List the remote groups and exit
    #[arg(long)]
    groups: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let state_dir = env::resolve_state_dir(args.state_dir.clone());
    if let Err(e) = fs::create_dir_all(&state_dir) {
        eprintln!("error: cannot create {}: {}", state_dir.display(), e);
        std::process::exit(1);
    }

    setup_logging(&state_dir.join("daemon.log"), args.verbose);
    tracing::info!("mudworkd starting, state_dir={}", state_dir.display());

    let mut config = match Config::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    config.test_mode |= args.test_mode;
    if config.test_mode {
        tracing::info!("test mode: batches are validated only, managed users stay unchanged");
    }

    if let Err(e) = run(args, config, &state_dir).await {
        tracing::error!("{}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args, config: Config, state_dir: &Path) -> mwd::Result<()> {
    let timeout = config.request_timeout();
    let issuer = HttpTokenIssuer::new(
        config.token_url(),
        config.enterprise.api_key.clone(),
        config.enterprise.client_secret.clone(),
        config.enterprise.assertion_path.clone(),
        timeout,
    )?;
    let tokens = Arc::new(TokenProvider::new(Box::new(issuer)));
    let api = Arc::new(HttpBulkApi::new(
        config.api_base_url(),
        config.enterprise.org_id.clone(),
        config.enterprise.api_key.clone(),
        config.test_mode,
        timeout,
    )?);
    let stats = Arc::new(Stats::default());
    let submitter = Submitter::new(api, tokens.clone(), stats.clone(), config.retry.max_attempts);

    if !args.no_init {
        tokens.renew().await?;
    }

    if args.groups {
        for group in submitter.list_groups().await? {
            println!(
                "{}\t{}\t{}",
                group.group_name, group.group_type, group.member_count
            );
        }
        return Ok(());
    }

    let lock_file = acquire_lock(&state_dir.join(LOCK_NAME))?;
    let pid_path = state_dir.join(PID_NAME);
    write_pid_file(&pid_path)?;

    let db_path = config.db_path(state_dir);
    tracing::info!("opening store {}", db_path.display());
    let db: SharedDb = Arc::new(tokio::sync::Mutex::new(Database::open(&db_path)?));

    let socket_path = state_dir.join(SOCKET_NAME);
    let _ = fs::remove_file(&socket_path);
    let listener = match UnixListener::bind(&socket_path) {
        Ok(l) => l,
        Err(e) => {
            cleanup(&pid_path, &socket_path);
            return Err(e.into());
        }
    };
    tracing::info!("listening on {}", socket_path.display());

    let lookup = Arc::new(LdapLookup::new(
        config.ldap.clone(),
        config.enterprise.domain.clone(),
        timeout,
    ));
    let builder = BatchBuilder::new(
        lookup,
        BuildSettings {
            group: config.group.clone(),
            domain: config.enterprise.domain.clone(),
            country: config.country.clone(),
        },
    );
    let drainer = Drainer::new(
        db.clone(),
        builder,
        submitter,
        Reconciler::new(db.clone(), config.test_mode),
        config.page_size,
    );

    let (notifier, rx) = worker::channel();
    let pending = db.lock().await.queue_len()?;
    if pending > 0 {
        tracing::info!(pending, "resuming queue left by previous run");
        notifier.notify(pending);
    }

    let sampler = tokio::spawn(stats::run_sampler(stats.clone(), db.clone(), SAMPLE_INTERVAL));
    let mut queue_worker = tokio::spawn(worker::run(drainer, rx));
    let ctx = ServerContext {
        db,
        notifier,
        stats,
        start_time: Instant::now(),
        test_mode: config.test_mode,
    };
    let mut ipc = tokio::task::spawn_blocking(move || server::serve(listener, &ctx));

    println!("READY");
    let _ = std::io::stdout().flush();

    let result = tokio::select! {
        joined = &mut queue_worker => match joined {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "queue worker failed");
                Err(e)
            }
            Err(e) => Err(mwd::Error::Io(std::io::Error::other(e))),
        },
        _ = &mut ipc => Ok(()),
    };

    sampler.abort();
    queue_worker.abort();
    cleanup(&pid_path, &socket_path);
    drop(lock_file);
    tracing::info!("mudworkd stopped");
    result
}

fn setup_logging(log_path: &Path, verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(env::names::RUST_LOG)
        .unwrap_or_else(|_| EnvFilter::new(default));

    // Try to open log file, fall back to stderr
    if let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn acquire_lock(lock_path: &Path) -> std::io::Result<fs::File> {
    use fs2::FileExt;

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path)?;
    file.try_lock_exclusive()
        .map_err(|_| std::io::Error::other("another daemon instance is already running"))?;
    Ok(file)
}

fn write_pid_file(pid_path: &Path) -> std::io::Result<()> {
    fs::write(pid_path, format!("{}", std::process::id()))
}

fn cleanup(pid_path: &Path, socket_path: &Path) {
    let _ = fs::remove_file(pid_path);
    let _ = fs::remove_file(socket_path);
}
