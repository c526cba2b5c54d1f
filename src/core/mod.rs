//! Runtime core: startup sequencing and handoff.
//!
//! The public API from this module is [`Supervisor`], which brings
//! dependencies up in order, and [`HandoffCommand`] / [`handoff`], which
//! replace the process image with the workload.
//!
//! Internal modules:
//! - [`supervisor`]: sequences launch → readiness → handoff, aborts on first failure;
//! - [`readiness`]: deadline-bounded probe loop for one dependency;
//! - [`handoff`]: exec of the workload with verbatim argv;
//! - [`shutdown`]: turns termination signals into a cancelled token before handoff.

mod handoff;
mod readiness;
mod shutdown;
mod supervisor;

pub use handoff::{HandoffCommand, handoff};
pub use supervisor::Supervisor;
