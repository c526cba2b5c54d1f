//! execvisor binary: `execvisor <program> [args...]`
//!
//! Reads the environment once, brings up the configured dependencies, then
//! execs `<program>` with its arguments untouched. Returns only on failure,
//! with an exit code that tells the failure classes apart.

use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;

use execvisor::{HandoffCommand, LogWriter, Supervisor, SupervisorConfig, SupervisorError};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();

    let err = run();
    tracing::error!(
        label = err.as_label(),
        dependency = err.dependency().unwrap_or("-"),
        error = %err,
        "execvisor: aborting"
    );
    ExitCode::from(err.exit_code())
}

/// Returns only when the run failed; success ends in exec.
fn run() -> SupervisorError {
    let command = match HandoffCommand::new(std::env::args_os().skip(1)) {
        Ok(command) => command,
        Err(e) => return e.into(),
    };
    let cfg = match SupervisorConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => return e.into(),
    };
    tracing::info!(environment = %cfg.environment, "execvisor starting");

    let deps = cfg.dependencies();
    let command = command.with_env(cfg.workload_env());
    Supervisor::new(vec![Arc::new(LogWriter::new())]).run_and_handoff(&deps, command)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}
