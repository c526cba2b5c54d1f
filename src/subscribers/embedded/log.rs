//! # LogWriter: events to `tracing`
//!
//! The default subscriber installed by the binary. Each [`Event`] becomes one
//! structured `tracing` record; the binary's `tracing-subscriber` decides the
//! format and filtering (`RUST_LOG`).
//!
//! ## Example output
//! ```text
//! INFO starting dependency seq=0 dependency=redis command=redis-server --port 6379 --daemonize yes
//! INFO dependency launched seq=1 dependency=redis
//! DEBUG readiness probe failed seq=2 dependency=redis attempt=1 elapsed_ms=0 reason=Connection refused (os error 111)
//! INFO dependency ready seq=4 dependency=redis attempt=3 elapsed_ms=1003
//! INFO handing off to workload seq=5 command=app --flag
//! ```

use std::time::Duration;

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let dependency = e.dependency.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        let elapsed_ms = e.elapsed.map(millis).unwrap_or_default();
        let seq = e.seq;

        match e.kind {
            EventKind::DependencyStarting => {
                tracing::info!(
                    seq,
                    dependency,
                    command = e.command.as_deref().unwrap_or("-"),
                    "starting dependency"
                );
            }
            EventKind::DependencyLaunched => {
                tracing::info!(seq, dependency, "dependency launched");
            }
            EventKind::DependencyAlreadyReady => {
                tracing::info!(
                    seq,
                    dependency,
                    probe = e.probe.as_deref().unwrap_or("-"),
                    "dependency already reachable; launch skipped"
                );
            }
            EventKind::LaunchFailed => {
                tracing::error!(seq, dependency, reason, "dependency launch failed");
            }
            EventKind::ProbeFailed => {
                tracing::debug!(
                    seq,
                    dependency,
                    attempt = e.attempt,
                    elapsed_ms,
                    reason,
                    "readiness probe failed"
                );
            }
            EventKind::DependencyReady => {
                tracing::info!(
                    seq,
                    dependency,
                    attempt = e.attempt,
                    elapsed_ms,
                    "dependency ready"
                );
            }
            EventKind::ReadinessTimeout => {
                tracing::error!(
                    seq,
                    dependency,
                    attempt = e.attempt,
                    elapsed_ms,
                    reason,
                    "dependency not ready before deadline"
                );
            }
            EventKind::ShutdownRequested => {
                tracing::warn!(seq, dependency, "termination signal received before handoff");
            }
            EventKind::HandoffStarting => {
                tracing::info!(
                    seq,
                    command = e.command.as_deref().unwrap_or("-"),
                    "handing off to workload"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
