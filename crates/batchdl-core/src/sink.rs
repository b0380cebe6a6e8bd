//! Log sink for job events and captured child output.
//!
//! Every line carries the job and worker that produced it. Lines from one job
//! reach the sink in emission order; lines from different jobs may interleave.

use std::sync::Mutex;
use std::time::SystemTime;

use crate::job::{JobId, WorkerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Job start and completion.
    Info,
    /// Raw passthrough of the tool's output.
    Debug,
    /// Launch failures, non-zero exits, read faults.
    Error,
}

/// One captured record. Consumed by the sink, not retained by the runner.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub job_id: JobId,
    pub worker: WorkerId,
    pub severity: Severity,
    pub message: String,
    pub timestamp: SystemTime,
}

impl LogLine {
    pub fn new(
        job_id: JobId,
        worker: WorkerId,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            job_id,
            worker,
            severity,
            message: message.into(),
            timestamp: SystemTime::now(),
        }
    }
}

/// Destination for log lines. Called concurrently from every worker.
pub trait LogSink: Send + Sync + 'static {
    fn emit(&self, line: LogLine);
}

/// Forwards lines to `tracing`. The installed subscriber decides where they go
/// (console and/or log file, see `logging`).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, line: LogLine) {
        let LogLine {
            job_id,
            worker,
            severity,
            message,
            ..
        } = line;
        match severity {
            Severity::Info => tracing::info!(worker, job = job_id, "{}", message),
            Severity::Debug => tracing::debug!(worker, job = job_id, "{}", message),
            Severity::Error => tracing::error!(worker, job = job_id, "{}", message),
        }
    }
}

/// Collects lines in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<LogLine>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Messages emitted for one job, in order.
    pub fn messages_for(&self, job_id: JobId) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.job_id == job_id)
            .map(|l| l.message)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, line: LogLine) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(line);
    }
}

impl<S: LogSink> LogSink for std::sync::Arc<S> {
    fn emit(&self, line: LogLine) {
        (**self).emit(line)
    }
}
