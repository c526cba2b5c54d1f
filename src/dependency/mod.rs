//! Dependency processes: what to launch and how to tell when it is usable.
//!
//! ## Contents
//! - [`DependencySpec`] immutable description of one dependency (launch, probe, deadlines)
//! - [`LaunchCommand`], [`LaunchMode`] how the dependency process is started
//! - [`Probe`] side-effect free readiness checks (TCP connect, Redis `PING`, command exit code)
//! - [`start_dependency`] issues the launch without waiting for readiness
//!
//! ## Quick wiring
//! ```text
//! SupervisorConfig::dependencies() ─► Vec<DependencySpec>
//!      └─► Supervisor::run uses:
//!           - launch  to start the process (start_dependency)
//!           - probe   to poll readiness (await_ready)
//!           - max_wait / poll_interval to bound the wait
//! ```

mod launch;
mod probe;
mod spec;

pub use launch::start_dependency;
pub use probe::Probe;
pub use spec::{DependencySpec, LaunchCommand, LaunchMode};
