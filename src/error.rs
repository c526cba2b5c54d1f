//! Error types used by the execvisor startup sequence.
//!
//! Every failure is fatal to the supervisor. The enums here only decide how a
//! failure is described and which exit code the process terminates with:
//!
//! - [`ConfigError`]: an environment variable holds an unusable value.
//! - [`StartError`]: a dependency process could not be launched.
//! - [`ReadinessError`]: a dependency launched but never passed its probe.
//! - [`HandoffError`]: the main workload could not be exec'd.
//! - [`SupervisorError`]: umbrella type returned by the sequence, mapped to exit codes.
//!
//! All types provide `as_label` (stable snake_case label for logs).

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Exit code when the supervisor itself cannot run (async runtime setup failed).
pub const EXIT_RUNTIME: u8 = 1;
/// Exit code for invalid configuration or a missing workload command.
pub const EXIT_USAGE: u8 = 2;
/// Exit code for a dependency that could not be launched.
pub const EXIT_START_FAILED: u8 = 3;
/// Exit code for a dependency that never became ready.
pub const EXIT_NOT_READY: u8 = 4;
/// Exit code for a termination signal received before handoff (128 + SIGINT).
pub const EXIT_INTERRUPTED: u8 = 130;
/// Exit code when the workload could not be executed.
pub const EXIT_EXEC_FAILED: u8 = 126;
/// Exit code when the workload binary does not exist.
pub const EXIT_EXEC_NOT_FOUND: u8 = 127;

/// # Errors produced while reading configuration.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but its value cannot be used.
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Raw value as found in the environment.
        value: String,
        /// What was expected instead.
        reason: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Invalid { .. } => "config_invalid",
        }
    }
}

/// # Errors produced while launching a dependency.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StartError {
    /// The executable could not be invoked (missing binary, permission denied).
    #[error("dependency {name:?}: failed to launch `{program}`: {source}")]
    LaunchFailed {
        /// Dependency name.
        name: String,
        /// Program that was invoked.
        program: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// A self-daemonizing launcher exited unsuccessfully.
    #[error("dependency {name:?}: launcher `{program}` exited with {status}")]
    LauncherExited {
        /// Dependency name.
        name: String,
        /// Program that was invoked.
        program: String,
        /// Exit status of the launcher.
        status: ExitStatus,
    },

    /// A self-daemonizing launcher did not return within the dependency's deadline.
    #[error("dependency {name:?}: launcher `{program}` did not exit within {waited:?}")]
    LauncherHung {
        /// Dependency name.
        name: String,
        /// Program that was invoked.
        program: String,
        /// How long the supervisor waited.
        waited: Duration,
    },
}

impl StartError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            StartError::LaunchFailed { .. } => "start_launch_failed",
            StartError::LauncherExited { .. } => "start_launcher_exited",
            StartError::LauncherHung { .. } => "start_launcher_hung",
        }
    }

    /// Name of the dependency that failed.
    pub fn dependency(&self) -> &str {
        match self {
            StartError::LaunchFailed { name, .. }
            | StartError::LauncherExited { name, .. }
            | StartError::LauncherHung { name, .. } => name,
        }
    }
}

/// # Outcome of a single failed readiness probe attempt.
///
/// Probe failures are expected while a dependency boots; they are retried
/// until the deadline and only surface inside [`ReadinessError::Timeout`].
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The attempt did not complete within its budget.
    #[error("probe timed out after {budget:?}")]
    TimedOut {
        /// Time allowed for the attempt.
        budget: Duration,
    },

    /// Connecting, reading, writing or spawning failed.
    #[error("{0}")]
    Io(#[from] io::Error),

    /// The dependency answered, but not with a ready reply.
    #[error("unexpected reply {0:?}")]
    UnexpectedReply(String),

    /// A probe command exited unsuccessfully.
    #[error("probe command exited with {0}")]
    CommandFailed(ExitStatus),
}

/// # Errors produced while waiting for a dependency to become ready.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ReadinessError {
    /// The probe never succeeded before the deadline.
    #[error(
        "dependency {name:?}: not ready after {waited:?} ({attempts} probe attempts, last error: {last_error})"
    )]
    Timeout {
        /// Dependency name.
        name: String,
        /// Time spent waiting.
        waited: Duration,
        /// Number of probe attempts made.
        attempts: u32,
        /// Failure reported by the last probe attempt.
        last_error: String,
    },

    /// A termination signal arrived while waiting.
    #[error("dependency {name:?}: wait interrupted by termination signal")]
    Interrupted {
        /// Dependency name.
        name: String,
    },
}

impl ReadinessError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ReadinessError::Timeout { .. } => "readiness_timeout",
            ReadinessError::Interrupted { .. } => "readiness_interrupted",
        }
    }

    /// Name of the dependency that failed.
    pub fn dependency(&self) -> &str {
        match self {
            ReadinessError::Timeout { name, .. } | ReadinessError::Interrupted { name } => name,
        }
    }
}

/// # Errors produced while handing control to the main workload.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HandoffError {
    /// No workload command was given.
    #[error("no workload command given; usage: execvisor <program> [args...]")]
    EmptyCommand,

    /// A termination signal arrived after the last dependency became ready.
    #[error("termination signal received before handoff to `{program}`")]
    Interrupted {
        /// Program that would have been executed.
        program: String,
    },

    /// The workload could not be located or executed.
    #[error("failed to exec workload `{program}`: {source}")]
    ExecFailed {
        /// Program that was executed.
        program: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}

impl HandoffError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandoffError::EmptyCommand => "handoff_empty_command",
            HandoffError::Interrupted { .. } => "handoff_interrupted",
            HandoffError::ExecFailed { .. } => "handoff_exec_failed",
        }
    }
}

/// # Any failure that ends a supervisor run.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("startup failed: {0}")]
    Start(#[from] StartError),

    #[error("startup failed: {0}")]
    Readiness(#[from] ReadinessError),

    #[error("handoff failed: {0}")]
    Handoff(#[from] HandoffError),

    #[error("cannot start async runtime: {0}")]
    Runtime(#[source] io::Error),
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use execvisor::{HandoffError, SupervisorError};
    ///
    /// let err = SupervisorError::from(HandoffError::EmptyCommand);
    /// assert_eq!(err.as_label(), "handoff_empty_command");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::Config(e) => e.as_label(),
            SupervisorError::Start(e) => e.as_label(),
            SupervisorError::Readiness(e) => e.as_label(),
            SupervisorError::Handoff(e) => e.as_label(),
            SupervisorError::Runtime(_) => "runtime_unavailable",
        }
    }

    /// Name of the dependency the failure belongs to, if any.
    pub fn dependency(&self) -> Option<&str> {
        match self {
            SupervisorError::Start(e) => Some(e.dependency()),
            SupervisorError::Readiness(e) => Some(e.dependency()),
            _ => None,
        }
    }

    /// Process exit code for this failure.
    ///
    /// Dependency failures (3, 4) never collide with handoff failures
    /// (126, 127), so operators can tell a dead dependency from a missing
    /// workload binary by exit code alone.
    pub fn exit_code(&self) -> u8 {
        match self {
            SupervisorError::Runtime(_) => EXIT_RUNTIME,
            SupervisorError::Config(_) => EXIT_USAGE,
            SupervisorError::Start(_) => EXIT_START_FAILED,
            SupervisorError::Readiness(ReadinessError::Timeout { .. }) => EXIT_NOT_READY,
            SupervisorError::Readiness(ReadinessError::Interrupted { .. }) => EXIT_INTERRUPTED,
            SupervisorError::Handoff(HandoffError::EmptyCommand) => EXIT_USAGE,
            SupervisorError::Handoff(HandoffError::Interrupted { .. }) => EXIT_INTERRUPTED,
            SupervisorError::Handoff(HandoffError::ExecFailed { source, .. }) => {
                if source.kind() == io::ErrorKind::NotFound {
                    EXIT_EXEC_NOT_FOUND
                } else {
                    EXIT_EXEC_FAILED
                }
            }
        }
    }
}
