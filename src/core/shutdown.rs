//! # OS signal handling before handoff.
//!
//! Until the process image is replaced, termination signals belong to the
//! supervisor. [`cancel_on_signal`] turns the first one into a cancelled
//! [`CancellationToken`] so the readiness loop can abort instead of waiting
//! out its deadline. After handoff the workload receives signals directly.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (`docker stop`, Kubernetes pod termination)
//! - `SIGQUIT`
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Spawns a listener that cancels `token` on the first termination signal.
///
/// If the handlers cannot be installed the listener logs and exits; the
/// supervisor then simply runs without early cancellation.
pub fn cancel_on_signal(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            res = wait_for_shutdown_signal() => match res {
                Ok(()) => token.cancel(),
                Err(error) => tracing::warn!(%error, "cannot install signal handlers"),
            },
            _ = token.cancelled() => {}
        }
    })
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
