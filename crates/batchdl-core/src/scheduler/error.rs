//! Scheduler setup errors. Individual job failures never show up here.

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("concurrency must be at least 1 (got {0})")]
    InvalidConcurrency(usize),
    /// A worker thread was torn down before reporting (runtime shutting down).
    #[error("worker task join: {0}")]
    Join(#[from] tokio::task::JoinError),
}
