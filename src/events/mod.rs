//! Supervisor events.
//!
//! This module holds the event **data model** published by the supervisor
//! while it launches dependencies, polls their readiness and prepares handoff.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//!
//! ## Quick reference
//! - **Publisher**: `Supervisor` (start, readiness loop, handoff preparation).
//! - **Consumers**: [`SubscriberSet`](crate::SubscriberSet), which delivers to
//!   every [`Subscribe`](crate::Subscribe) in order.

mod event;

pub use event::{Event, EventKind};
