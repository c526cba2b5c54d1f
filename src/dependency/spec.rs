//! # Dependency specification.
//!
//! Defines [`DependencySpec`] a configuration bundle that describes how a
//! dependency process is launched and how its readiness is confirmed.
//!
//! A spec is built with [`DependencySpec::new`] and refined with the `with_*`
//! builders; once handed to the supervisor it is never mutated.

use std::fmt;
use std::time::Duration;

use crate::dependency::Probe;

/// How a dependency process detaches from the supervisor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchMode {
    /// The program forks itself into the background and the launcher exits
    /// (e.g. `redis-server --daemonize yes`).
    ///
    /// The supervisor waits for the launcher to exit and checks its status.
    /// The daemon ends up re-parented to the container's init, outside the
    /// supervisor's process tree.
    Daemonize,

    /// The program runs in the foreground; the supervisor spawns it in its own
    /// process group with stdin detached and never waits on it.
    ///
    /// The process stays a child of the supervisor's PID, which the workload
    /// inherits at handoff.
    Background,
}

/// Program and arguments used to start a dependency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchCommand {
    program: String,
    args: Vec<String>,
    mode: LaunchMode,
}

impl LaunchCommand {
    /// Creates a launch command with an explicit mode.
    pub fn new<I, S>(program: impl Into<String>, args: I, mode: LaunchMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            mode,
        }
    }

    /// Shorthand for [`LaunchMode::Daemonize`].
    pub fn daemonize<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(program, args, LaunchMode::Daemonize)
    }

    /// Shorthand for [`LaunchMode::Background`].
    pub fn background<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(program, args, LaunchMode::Background)
    }

    /// Executable name or path.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the executable.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Detach mode.
    pub fn mode(&self) -> LaunchMode {
        self.mode
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Specification of one dependency the workload needs before it can start.
///
/// Bundles together:
/// - A name used in diagnostics
/// - An optional [`LaunchCommand`] (`None` = externally managed, wait only)
/// - A readiness [`Probe`]
/// - The readiness deadline (`max_wait`) and poll interval
/// - Whether an already-reachable dependency is launched again
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use execvisor::{DependencySpec, LaunchCommand, Probe};
///
/// let redis = DependencySpec::new("redis", Probe::tcp("localhost", 6379))
///     .with_launch(LaunchCommand::daemonize("redis-server", ["--daemonize", "yes"]))
///     .with_max_wait(Duration::from_secs(5))
///     .with_poll_interval(Duration::from_millis(500));
///
/// assert_eq!(redis.name(), "redis");
/// assert!(redis.skip_if_ready());
/// ```
#[derive(Clone, Debug)]
pub struct DependencySpec {
    name: String,
    launch: Option<LaunchCommand>,
    probe: Probe,
    max_wait: Duration,
    poll_interval: Duration,
    skip_if_ready: bool,
}

impl DependencySpec {
    /// Default readiness deadline.
    pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(5);
    /// Default delay between probes.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

    /// Creates a wait-only spec with default deadlines.
    pub fn new(name: impl Into<String>, probe: Probe) -> Self {
        Self {
            name: name.into(),
            launch: None,
            probe,
            max_wait: Self::DEFAULT_MAX_WAIT,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            skip_if_ready: true,
        }
    }

    /// Returns a new spec that launches `launch` before waiting.
    pub fn with_launch(mut self, launch: LaunchCommand) -> Self {
        self.launch = Some(launch);
        self
    }

    /// Returns a new spec with updated readiness deadline.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Returns a new spec with updated poll interval.
    ///
    /// A zero interval is raised to one millisecond so the poll loop always yields.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }

    /// Returns a new spec that launches unconditionally (`false`) or skips the
    /// launch when the probe already succeeds (`true`, default).
    pub fn with_skip_if_ready(mut self, skip: bool) -> Self {
        self.skip_if_ready = skip;
        self
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Launch command, if the supervisor starts this dependency itself.
    pub fn launch(&self) -> Option<&LaunchCommand> {
        self.launch.as_ref()
    }

    /// Readiness probe.
    pub fn probe(&self) -> &Probe {
        &self.probe
    }

    /// Readiness deadline.
    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Delay between probes; also bounds each probe attempt.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Whether the launch is skipped for an already-reachable dependency.
    pub fn skip_if_ready(&self) -> bool {
        self.skip_if_ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_command_display() {
        let cmd = LaunchCommand::daemonize("redis-server", ["--port", "6379"]);
        assert_eq!(cmd.to_string(), "redis-server --port 6379");
        assert_eq!(cmd.mode(), LaunchMode::Daemonize);
    }

    #[test]
    fn test_defaults_are_wait_only() {
        let spec = DependencySpec::new("cache", Probe::tcp("localhost", 1));
        assert!(spec.launch().is_none());
        assert_eq!(spec.max_wait(), DependencySpec::DEFAULT_MAX_WAIT);
        assert_eq!(spec.poll_interval(), DependencySpec::DEFAULT_POLL_INTERVAL);
    }

    #[test]
    fn test_zero_poll_interval_is_raised() {
        let spec = DependencySpec::new("cache", Probe::tcp("localhost", 1))
            .with_poll_interval(Duration::ZERO);
        assert_eq!(spec.poll_interval(), Duration::from_millis(1));
    }
}
