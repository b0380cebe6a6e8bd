//! batchdl core: run many external download jobs with bounded concurrency.

pub mod config;
pub mod job;
pub mod logging;
pub mod report;
pub mod runner;
pub mod scheduler;
pub mod sink;
