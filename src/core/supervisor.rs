//! # Supervisor: sequences dependency startup, then hands off to the workload.
//!
//! The [`Supervisor`] owns a [`SubscriberSet`] and a [`CancellationToken`].
//! It brings dependencies up one at a time and, once every one of them is
//! ready, replaces its own process image with the workload.
//!
//! ## Key responsibilities
//! - launch each dependency ([`Supervisor::start_dependency`])
//! - poll its readiness under a deadline ([`Supervisor::await_ready`])
//! - abort the whole sequence on the first failure, naming the dependency
//! - exec the workload exactly once ([`Supervisor::run_and_handoff`])
//!
//! ## High-level architecture
//! ```text
//! run_and_handoff(deps, command):
//!   build current-thread runtime
//!   block_on:
//!     shutdown::cancel_on_signal(token)          (SIGINT/SIGTERM/SIGQUIT → cancel)
//!     run(deps):
//!       for dep in deps (declaration order, sequential):
//!         ├─ skip_if_ready && probe ok ──► DependencyAlreadyReady, next
//!         ├─ start_dependency(dep)     ──► Err → LaunchFailed / ShutdownRequested, abort
//!         ├─ await_ready(dep)          ──► Err → ReadinessTimeout / ShutdownRequested, abort
//!         └─ token cancelled?          ──► ShutdownRequested, abort
//!     publish HandoffStarting
//!     token cancelled?                 ──► ShutdownRequested, abort (exit 130)
//!   drop runtime                                  (no supervisor task survives)
//!   handoff(command)                              (exec; returns only on failure)
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use execvisor::{
//!     DependencySpec, HandoffCommand, LaunchCommand, LogWriter, Probe, Supervisor,
//! };
//!
//! let redis = DependencySpec::new("redis", Probe::tcp("localhost", 6379))
//!     .with_launch(LaunchCommand::daemonize("redis-server", ["--daemonize", "yes"]))
//!     .with_max_wait(Duration::from_secs(5));
//!
//! let command = HandoffCommand::new(["app", "--flag"]).unwrap();
//! let sup = Supervisor::new(vec![Arc::new(LogWriter::new())]);
//!
//! // Only returns if something went wrong.
//! let err = sup.run_and_handoff(&[redis], command);
//! std::process::exit(i32::from(err.exit_code()));
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::handoff::{HandoffCommand, handoff};
use crate::core::{readiness, shutdown};
use crate::dependency::{self, DependencySpec};
use crate::error::{HandoffError, ReadinessError, SupervisorError};
use crate::events::{Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Sequences dependency startup and the final handoff.
pub struct Supervisor {
    subs: SubscriberSet,
    token: CancellationToken,
}

impl Supervisor {
    /// Creates a supervisor publishing to `subscribers`, in order.
    pub fn new(subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        Self {
            subs: SubscriberSet::new(subscribers),
            token: CancellationToken::new(),
        }
    }

    /// Token that aborts a readiness wait when cancelled.
    ///
    /// [`Supervisor::run_and_handoff`] cancels it on termination signals;
    /// embedders driving [`Supervisor::run`] themselves may cancel it directly.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Brings up `deps` one after another.
    ///
    /// Each dependency is launched and confirmed ready before the next one is
    /// touched. The first failure aborts the sequence, and so does a cancelled
    /// token, including one cancelled after the last dependency became ready.
    pub async fn run(&self, deps: &[DependencySpec]) -> Result<(), SupervisorError> {
        for spec in deps {
            if self.token.is_cancelled() {
                return Err(self.interrupted(spec).await);
            }
            if !self.already_ready(spec).await {
                self.start_dependency(spec).await?;
                self.await_ready(spec).await?;
            }
            if self.token.is_cancelled() {
                return Err(self.interrupted(spec).await);
            }
        }
        Ok(())
    }

    /// Launches one dependency without waiting for readiness.
    ///
    /// A cancelled token abandons the wait on a daemonizing launcher.
    pub async fn start_dependency(&self, spec: &DependencySpec) -> Result<(), SupervisorError> {
        let Some(launch) = spec.launch() else {
            return Ok(());
        };

        self.subs
            .emit(
                &Event::new(EventKind::DependencyStarting)
                    .with_dependency(spec.name())
                    .with_command(launch.to_string()),
            )
            .await;

        let launched = tokio::select! {
            biased;
            _ = self.token.cancelled() => return Err(self.interrupted(spec).await),
            res = dependency::start_dependency(spec) => res,
        };

        match launched {
            Ok(()) => {
                self.subs
                    .emit(&Event::new(EventKind::DependencyLaunched).with_dependency(spec.name()))
                    .await;
                Ok(())
            }
            Err(e) => {
                self.subs
                    .emit(
                        &Event::new(EventKind::LaunchFailed)
                            .with_dependency(spec.name())
                            .with_reason(e.to_string()),
                    )
                    .await;
                Err(e.into())
            }
        }
    }

    /// Polls one dependency's probe until it succeeds or `max_wait` elapses.
    pub async fn await_ready(&self, spec: &DependencySpec) -> Result<(), ReadinessError> {
        readiness::wait_until_ready(spec, &self.token, &self.subs).await
    }

    /// Runs the startup sequence, then execs `command`.
    ///
    /// Returns only when something failed; the caller should exit with
    /// [`SupervisorError::exit_code`]. On success the process image is
    /// replaced and nothing after the exec runs.
    pub fn run_and_handoff(
        self,
        deps: &[DependencySpec],
        command: HandoffCommand,
    ) -> SupervisorError {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => return SupervisorError::Runtime(e),
        };

        let ready = runtime.block_on(async {
            let _signals = shutdown::cancel_on_signal(self.token.clone());
            self.run(deps).await?;
            self.subs
                .emit(&Event::new(EventKind::HandoffStarting).with_command(command.to_string()))
                .await;

            // Let the signal listener observe anything already delivered.
            tokio::task::yield_now().await;
            if self.token.is_cancelled() {
                self.subs.emit(&Event::new(EventKind::ShutdownRequested)).await;
                return Err(SupervisorError::from(HandoffError::Interrupted {
                    program: command.program().to_string_lossy().into_owned(),
                }));
            }
            Ok::<(), SupervisorError>(())
        });
        drop(runtime);

        if let Err(e) = ready {
            return e;
        }
        match handoff(command) {
            Ok(never) => match never {},
            Err(e) => e.into(),
        }
    }

    /// Pre-launch probe for dependencies that allow skipping the launch.
    async fn already_ready(&self, spec: &DependencySpec) -> bool {
        if spec.launch().is_none() || !spec.skip_if_ready() {
            return false;
        }
        if spec.probe().check(spec.poll_interval()).await.is_err() {
            return false;
        }
        self.subs
            .emit(
                &Event::new(EventKind::DependencyAlreadyReady)
                    .with_dependency(spec.name())
                    .with_probe(spec.probe().to_string()),
            )
            .await;
        true
    }

    /// Publishes `ShutdownRequested` and builds the matching error.
    async fn interrupted(&self, spec: &DependencySpec) -> SupervisorError {
        self.subs
            .emit(&Event::new(EventKind::ShutdownRequested).with_dependency(spec.name()))
            .await;
        ReadinessError::Interrupted {
            name: spec.name().to_string(),
        }
        .into()
    }
}
