//! # Events emitted by the supervisor during startup.
//!
//! The [`EventKind`] enum classifies event types across three phases:
//! - **Launch events**: a dependency is being started (or skipped)
//! - **Readiness events**: probe outcomes while waiting for a dependency
//! - **Terminal events**: the run ends in handoff, timeout or shutdown
//!
//! The [`Event`] struct carries additional metadata such as the dependency
//! name, attempt count, elapsed time and reasons. Wall-clock timestamps are
//! left to the log formatter.
//!
//! ## Ordering guarantees
//! Each event has a process-wide sequence number (`seq`) that increases
//! monotonically. The supervisor is sequential, so subscribers also observe
//! events in `seq` order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use execvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ProbeFailed)
//!     .with_dependency("redis")
//!     .with_reason("connection refused")
//!     .with_attempt(3)
//!     .with_elapsed(Duration::from_millis(1500));
//!
//! assert_eq!(ev.kind, EventKind::ProbeFailed);
//! assert_eq!(ev.dependency.as_deref(), Some("redis"));
//! assert_eq!(ev.reason.as_deref(), Some("connection refused"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Duration;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervisor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Launch events ===
    /// About to launch a dependency.
    ///
    /// Sets:
    /// - `dependency`: dependency name
    /// - `command`: launch command line
    DependencyStarting,

    /// Launch issued successfully (launcher exited cleanly or process spawned).
    ///
    /// Sets:
    /// - `dependency`: dependency name
    DependencyLaunched,

    /// Probe already succeeded before launching; the launch was skipped.
    ///
    /// Sets:
    /// - `dependency`: dependency name
    /// - `probe`: probe description
    DependencyAlreadyReady,

    /// The dependency could not be launched.
    ///
    /// Sets:
    /// - `dependency`: dependency name
    /// - `reason`: error message
    LaunchFailed,

    // === Readiness events ===
    /// A readiness probe attempt failed; another attempt follows unless the deadline passed.
    ///
    /// Sets:
    /// - `dependency`: dependency name
    /// - `attempt`: attempt number (1-based)
    /// - `elapsed`: time since the wait began
    /// - `reason`: probe failure
    ProbeFailed,

    /// The probe succeeded.
    ///
    /// Sets:
    /// - `dependency`: dependency name
    /// - `attempt`: successful attempt number
    /// - `elapsed`: time since the wait began
    DependencyReady,

    /// Deadline reached without a successful probe.
    ///
    /// Sets:
    /// - `dependency`: dependency name
    /// - `attempt`: attempts made
    /// - `elapsed`: time waited
    /// - `reason`: last probe failure
    ReadinessTimeout,

    // === Terminal events ===
    /// A termination signal arrived before handoff.
    ///
    /// Sets:
    /// - `dependency`: dependency being waited on, if any
    ShutdownRequested,

    /// All dependencies are ready; the process image is about to be replaced.
    ///
    /// Sets:
    /// - `command`: workload command line
    HandoffStarting,
}

/// Supervisor event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the dependency, if applicable.
    pub dependency: Option<Arc<str>>,
    /// Probe attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Time since the readiness wait began.
    pub elapsed: Option<Duration>,
    /// Human-readable reason (errors, probe failures).
    pub reason: Option<Arc<str>>,
    /// Command line being launched or exec'd.
    pub command: Option<Arc<str>>,
    /// Readiness probe description.
    pub probe: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            kind,
            dependency: None,
            attempt: None,
            elapsed: None,
            reason: None,
            command: None,
            probe: None,
        }
    }

    /// Attaches a dependency name.
    #[inline]
    pub fn with_dependency(mut self, name: impl Into<Arc<str>>) -> Self {
        self.dependency = Some(name.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches the time spent waiting so far.
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        self.elapsed = Some(d);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a command line.
    #[inline]
    pub fn with_command(mut self, command: impl Into<Arc<str>>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Attaches a probe description.
    #[inline]
    pub fn with_probe(mut self, probe: impl Into<Arc<str>>) -> Self {
        self.probe = Some(probe.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::DependencyStarting);
        let b = Event::new(EventKind::DependencyLaunched);
        assert!(b.seq > a.seq);
    }
}
