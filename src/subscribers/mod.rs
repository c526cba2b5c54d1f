//! # Event subscribers for the supervisor.
//!
//! This module provides the [`Subscribe`] trait, the ordered fan-out
//! [`SubscriberSet`] and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Supervisor ── emit(&Event) ──► SubscriberSet
//!                                     │
//!                                ┌────┴────┬─────────┐
//!                                ▼         ▼         ▼
//!                            LogWriter  Metrics  Recorder ...
//! ```

mod embedded;
mod set;
mod subscriber;

pub use embedded::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
