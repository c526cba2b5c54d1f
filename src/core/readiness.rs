//! # Deadline-bounded readiness polling.
//!
//! Waits for one dependency's probe to succeed, publishing an event per attempt.
//!
//! ## Loop
//! ```text
//! start = now, deadline = start + max_wait
//! loop {
//!   ├─► attempt += 1
//!   ├─► probe.check(budget = poll_interval)       (cancellable)
//!   │       ├─ Ok  ──► publish DependencyReady, return Ok
//!   │       └─ Err ──► publish ProbeFailed
//!   ├─► now >= deadline ? ──► publish ReadinessTimeout, return Timeout
//!   └─► sleep(min(poll_interval, deadline - now))  (cancellable)
//! }
//! token cancelled at any await ──► publish ShutdownRequested, return Interrupted
//! ```
//!
//! ## Rules
//! - Success is only ever reported for an attempt whose probe succeeded.
//! - `Timeout` is returned no earlier than `max_wait`: the last sleep ends at
//!   the deadline and is followed by one final probe.
//! - `Timeout` is returned no later than `max_wait + poll_interval`: each
//!   probe attempt is bounded by `poll_interval` and no sleep crosses the deadline.

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::dependency::DependencySpec;
use crate::error::ReadinessError;
use crate::events::{Event, EventKind};
use crate::subscribers::SubscriberSet;

/// Polls `spec`'s probe until it succeeds, the deadline passes, or `token` is cancelled.
pub async fn wait_until_ready(
    spec: &DependencySpec,
    token: &CancellationToken,
    subs: &SubscriberSet,
) -> Result<(), ReadinessError> {
    let interval = spec.poll_interval();
    let started = Instant::now();
    let deadline = started + spec.max_wait();
    let mut attempt: u32 = 0;

    loop {
        attempt = attempt.saturating_add(1);

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => return interrupted(spec, subs).await,
            res = spec.probe().check(interval) => res,
        };

        let elapsed = started.elapsed();
        let error = match outcome {
            Ok(()) => {
                subs.emit(
                    &Event::new(EventKind::DependencyReady)
                        .with_dependency(spec.name())
                        .with_attempt(attempt)
                        .with_elapsed(elapsed),
                )
                .await;
                return Ok(());
            }
            Err(e) => e.to_string(),
        };

        subs.emit(
            &Event::new(EventKind::ProbeFailed)
                .with_dependency(spec.name())
                .with_attempt(attempt)
                .with_elapsed(elapsed)
                .with_reason(error.as_str()),
        )
        .await;

        let now = Instant::now();
        if now >= deadline {
            subs.emit(
                &Event::new(EventKind::ReadinessTimeout)
                    .with_dependency(spec.name())
                    .with_attempt(attempt)
                    .with_elapsed(elapsed)
                    .with_reason(error.as_str()),
            )
            .await;
            return Err(ReadinessError::Timeout {
                name: spec.name().to_string(),
                waited: now - started,
                attempts: attempt,
                last_error: error,
            });
        }

        let nap = interval.min(deadline - now);
        tokio::select! {
            biased;
            _ = token.cancelled() => return interrupted(spec, subs).await,
            _ = time::sleep(nap) => {}
        }
    }
}

async fn interrupted(
    spec: &DependencySpec,
    subs: &SubscriberSet,
) -> Result<(), ReadinessError> {
    subs.emit(&Event::new(EventKind::ShutdownRequested).with_dependency(spec.name()))
        .await;
    Err(ReadinessError::Interrupted {
        name: spec.name().to_string(),
    })
}
