//! Batch scheduler.
//!
//! Runs a batch of independent jobs on a fixed pool of worker slots and joins
//! on all of them. One job's failure never affects another.

mod error;
mod run;
mod slots;

pub use error::SchedulerError;
pub use run::run_all;
pub use slots::{SlotGuard, WorkerSlots};
