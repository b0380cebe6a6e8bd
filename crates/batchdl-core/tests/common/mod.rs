//! Helpers for driving real child processes through `sh -c`.

#![allow(dead_code)]

use batchdl_core::job::{JobCommand, JobId, JobResult, JobSpec, WorkerId};
use batchdl_core::runner::{JobRunner, ProcessRunner};
use batchdl_core::sink::MemorySink;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Spec running `script` under `sh -c` with `dir` as output directory.
pub fn sh(dir: &Path, script: &str) -> JobSpec {
    JobSpec::new(dir, JobCommand::new("sh", ["-c", script]).unwrap())
}

/// Spec whose program does not exist.
pub fn missing_binary(dir: &Path) -> JobSpec {
    JobSpec::new(
        dir,
        JobCommand::new("/nonexistent/batchdl-missing-tool", ["--version"]).unwrap(),
    )
}

pub fn memory_runner() -> Arc<ProcessRunner<Arc<MemorySink>>> {
    Arc::new(ProcessRunner::with_sink(Arc::new(MemorySink::new())))
}

/// Wraps a real runner and records how many jobs run at the same time.
pub struct Instrumented<R> {
    pub inner: R,
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
}

impl<R> Instrumented<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl<R: JobRunner> JobRunner for Instrumented<R> {
    fn run(&self, job_id: JobId, worker: WorkerId, spec: &JobSpec) -> JobResult {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        let result = self.inner.run(job_id, worker, spec);
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
