//! # SubscriberSet: ordered delivery over multiple subscribers
//!
//! [`SubscriberSet`] hands each [`Event`] to every subscriber in turn and
//! awaits each one before moving on.
//!
//! ## What it guarantees
//! - Global FIFO: every subscriber sees every event, in publication order.
//! - Panics inside subscribers are caught and logged (isolation).
//!
//! ## Diagram
//! ```text
//!    emit(&Event)
//!        ├──► S1.on_event() ─ await
//!        ├──► S2.on_event() ─ await
//!        └──► SN.on_event() ─ await
//! ```

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::events::Event;

use super::Subscribe;

/// Ordered, panic-isolated fan-out.
#[derive(Clone, Default)]
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscribe>>,
}

impl SubscriberSet {
    /// Creates a new set; delivery order follows `subs`.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { subs }
    }

    /// Delivers one event to all subscribers.
    pub async fn emit(&self, event: &Event) {
        for sub in &self.subs {
            let delivery = AssertUnwindSafe(sub.on_event(event)).catch_unwind().await;
            if let Err(panic) = delivery {
                let info = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::warn!(subscriber = sub.name(), %info, "subscriber panicked");
            }
        }
    }
}
