//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for plugging custom event handlers
//! into the supervisor (logging, metrics, test recorders).
//!
//! ## Rules
//! - Events are delivered sequentially, in publication order, on the
//!   supervisor's own task. A slow subscriber delays startup.
//! - Panics are caught by [`SubscriberSet`](crate::SubscriberSet) and logged;
//!   the startup sequence continues.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use execvisor::{Event, EventKind, Subscribe};
//!
//! struct Metrics;
//!
//! #[async_trait]
//! impl Subscribe for Metrics {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::ProbeFailed) {
//!             // export a metric, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "metrics" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for supervisor observability.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
/// - Return promptly: delivery is on the startup path.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
