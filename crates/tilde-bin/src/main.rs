//! tilde entrypoint.
use anyhow::{Context, Result};
use clap::Parser;
use core_actions::io_ops::open_state;
use core_config::load_from;
use core_terminal::{RawTerminal, TerminalOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Once;
use tilde::{EditorRuntime, ShutdownReason, log_shutdown_stage};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE: &str = "tilde.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "tilde", version, about = "A small terminal text editor")]
struct Args {
    /// Optional file to open. A missing file is created on first save.
    pub path: Option<PathBuf>,
    /// Configuration file path (overrides discovery of `tilde.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join(LOG_FILE);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|_| guard)
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn run(args: Args) -> Result<ShutdownReason> {
    let config = load_from(args.config.clone())?;
    let settings = config.settings;
    let state = open_state(args.path.as_deref(), &settings);
    info!(
        target: "runtime.startup",
        file = %state.display_name(),
        config = ?config.source,
        tab_stop = settings.tab_stop,
        read_timeout_ds = settings.read_timeout_ds,
        "bootstrap_complete"
    );

    let term = RawTerminal::enter(TerminalOptions {
        read_timeout_ds: settings.read_timeout_ds,
    })
    .context("entering raw mode")?;
    let mut runtime = EditorRuntime::new(term, state, settings)?;
    let reason = runtime.run()?;

    log_shutdown_stage(reason, "begin");
    let mut term = runtime.into_terminal();
    term.restore().context("restoring terminal")?;
    log_shutdown_stage(reason, "terminal_restored");
    drop(term);
    log_shutdown_stage(reason, "complete");
    Ok(reason)
}

fn main() -> ExitCode {
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    match run(Args::parse()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(target: "runtime", error = %format!("{e:#}"), "fatal");
            eprintln!("tilde: {e:#}");
            ExitCode::FAILURE
        }
    }
}
