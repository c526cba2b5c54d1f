//! # execvisor
//!
//! **execvisor** is a container entrypoint for images that run more than one
//! logical service: it starts the dependency processes (Redis, typically),
//! waits until each one answers its readiness probe, then replaces itself
//! with the main workload so the workload becomes PID 1 and receives signals
//! directly.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────────┐        ┌──────────────────────────────┐
//!     │ SupervisorConfig │───────►│ Vec<DependencySpec>          │
//!     │ (env, read once) │        │ (launch, probe, deadlines)   │
//!     └──────────────────┘        └──────────────┬───────────────┘
//!                                                ▼
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Supervisor (single-threaded, sequential)                        │
//! │  - start_dependency  (daemonize / background launch)             │
//! │  - await_ready       (probe every poll_interval until max_wait)  │
//! │  - SubscriberSet     (ordered event delivery, e.g. LogWriter)    │
//! │  - CancellationToken (cancelled by SIGINT/SIGTERM/SIGQUIT)       │
//! └──────────────────────────────┬───────────────────────────────────┘
//!                                ▼  all dependencies ready
//!                    ┌────────────────────────┐
//!                    │ handoff(HandoffCommand)│  exec: same PID, same fds
//!                    └────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! for dep in deps {
//!   ├─► probe ok already? ──► DependencyAlreadyReady, next dep
//!   ├─► publish DependencyStarting
//!   ├─► start_dependency(dep)
//!   │       ├─ Ok  ──► DependencyLaunched
//!   │       └─ Err ──► LaunchFailed, exit 3
//!   └─► await_ready(dep)
//!           ├─ probe fails ──► ProbeFailed, sleep min(poll_interval, time left), retry
//!           ├─ probe ok    ──► DependencyReady
//!           ├─ deadline    ──► ReadinessTimeout, exit 4
//!           └─ signal      ──► ShutdownRequested, exit 130
//! }
//! publish HandoffStarting ─► exec(workload)  (exit 127/126 if exec fails)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types                                   |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Dependencies**  | Describe how to launch a dependency and probe its readiness. | [`DependencySpec`], [`LaunchCommand`], [`Probe`] |
//! | **Supervision**   | Sequential startup with deadline-bounded readiness.          | [`Supervisor`]                              |
//! | **Handoff**       | Exec the workload with verbatim argv.                        | [`HandoffCommand`], [`handoff`]             |
//! | **Subscriber API**| Hook into startup events (logging, metrics).                 | [`Subscribe`], [`LogWriter`]                |
//! | **Errors**        | Typed errors with stable labels and distinct exit codes.     | [`SupervisorError`]                         |
//! | **Configuration** | Environment read once into an immutable struct.              | [`SupervisorConfig`]                        |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use execvisor::{DependencySpec, Probe, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
//!     let port = listener.local_addr()?.port();
//!
//!     // Wait-only dependency: nothing is launched, only the probe runs.
//!     let cache = DependencySpec::new("cache", Probe::tcp("127.0.0.1", port))
//!         .with_max_wait(Duration::from_secs(1))
//!         .with_poll_interval(Duration::from_millis(100));
//!
//!     let sup = Supervisor::new(Vec::new());
//!     sup.run(&[cache]).await?;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod dependency;
mod error;
mod events;
mod subscribers;

// ---- Public re-exports ----

pub use config::{ProbeKind, REDIS_DEPENDENCY, RedisConfig, SupervisorConfig};
pub use crate::core::{HandoffCommand, Supervisor, handoff};
pub use dependency::{DependencySpec, LaunchCommand, LaunchMode, Probe, start_dependency};
pub use error::{
    ConfigError, EXIT_EXEC_FAILED, EXIT_EXEC_NOT_FOUND, EXIT_INTERRUPTED, EXIT_NOT_READY,
    EXIT_RUNTIME, EXIT_START_FAILED, EXIT_USAGE, HandoffError, ProbeError, ReadinessError,
    StartError, SupervisorError,
};
pub use events::{Event, EventKind};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
