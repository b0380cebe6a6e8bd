//! Job runner: executes one external command end to end.
//!
//! Pipeline per job: create output dir → spawn with merged stdout/stderr →
//! stream lines to the sink → wait → map exit status. Every failure becomes
//! data in the returned `JobResult`; nothing escapes `run`.

mod child;
mod error;
mod output;

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use crate::job::{JobId, JobResult, JobSpec, JobStatus, WorkerId};
use crate::sink::{LogLine, LogSink, Severity, TracingSink};

pub use error::RunnerError;

use self::child::{spawn_merged, status_from_exit};
use self::output::stream_lines;

/// Runs a single job to a terminal state. Called from the scheduler's worker
/// threads, so implementations block and must be shareable.
pub trait JobRunner: Send + Sync + 'static {
    fn run(&self, job_id: JobId, worker: WorkerId, spec: &JobSpec) -> JobResult;
}

/// Runs jobs as OS child processes and forwards their output to a `LogSink`.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner<S = TracingSink> {
    sink: S,
}

impl ProcessRunner<TracingSink> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: LogSink> ProcessRunner<S> {
    pub fn with_sink(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn execute(
        &self,
        job_id: JobId,
        worker: WorkerId,
        spec: &JobSpec,
    ) -> Result<JobStatus, RunnerError> {
        let emit = |severity, message: String| {
            self.sink.emit(LogLine::new(job_id, worker, severity, message));
        };
        let program = spec.command.program();

        ensure_output_dir(&spec.output_dir)?;
        emit(
            Severity::Info,
            format!("starting download: {}", spec.command.display()),
        );

        let (reader, child) = spawn_merged(&spec.command).map_err(|source| RunnerError::Launch {
            program: program.to_string(),
            source,
        })?;
        tracing::trace!(worker, job = job_id, pid = child.id(), "spawned");

        if let Err(e) = stream_lines(reader, |line| emit(Severity::Debug, line)) {
            emit(Severity::Error, format!("error reading output: {}", e));
        }

        let exit = child.wait().map_err(|source| RunnerError::Wait {
            program: program.to_string(),
            source,
        })?;
        let status = status_from_exit(exit);
        match &status {
            JobStatus::Succeeded => {
                emit(Severity::Info, "download completed successfully".to_string())
            }
            JobStatus::Exited { code } => emit(
                Severity::Error,
                format!("download failed with exit code {}", code),
            ),
            JobStatus::Signaled { signal } => emit(
                Severity::Error,
                format!("download killed by signal {}", signal),
            ),
            other => emit(Severity::Error, format!("download ended: {}", other)),
        }
        Ok(status)
    }
}

impl<S: LogSink> JobRunner for ProcessRunner<S> {
    fn run(&self, job_id: JobId, worker: WorkerId, spec: &JobSpec) -> JobResult {
        let started_at = SystemTime::now();
        let status = self
            .execute(job_id, worker, spec)
            .unwrap_or_else(|err| {
                self.sink
                    .emit(LogLine::new(job_id, worker, Severity::Error, err.to_string()));
                err.into_status()
            });
        JobResult {
            job_id,
            worker,
            spec: spec.clone(),
            status,
            started_at,
            finished_at: SystemTime::now(),
        }
    }
}

/// Recursive and idempotent: an existing directory is fine.
fn ensure_output_dir(path: &Path) -> Result<(), RunnerError> {
    fs::create_dir_all(path).map_err(|source| RunnerError::OutputDir {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::job::JobCommand;
    use crate::sink::MemorySink;
    use std::sync::Arc;

    fn sh(dir: &Path, script: &str) -> JobSpec {
        JobSpec::new(dir, JobCommand::new("sh", ["-c", script]).unwrap())
    }

    fn runner() -> ProcessRunner<Arc<MemorySink>> {
        ProcessRunner::with_sink(Arc::new(MemorySink::new()))
    }

    #[test]
    fn success_logs_start_output_and_completion() {
        let dir = tempfile::tempdir().unwrap();
        let r = runner();
        let res = r.run(0, 0, &sh(dir.path(), "echo hello"));
        assert_eq!(res.status, JobStatus::Succeeded);
        let lines = r.sink().lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].severity, Severity::Info);
        assert!(lines[0].message.starts_with("starting download: sh -c"));
        assert_eq!(lines[1].severity, Severity::Debug);
        assert_eq!(lines[1].message, "hello");
        assert_eq!(lines[2].severity, Severity::Info);
        assert_eq!(lines[2].message, "download completed successfully");
    }

    #[test]
    fn nonzero_exit_records_code() {
        let dir = tempfile::tempdir().unwrap();
        let r = runner();
        let res = r.run(3, 1, &sh(dir.path(), "exit 7"));
        assert_eq!(res.status, JobStatus::Exited { code: 7 });
        assert_eq!(res.job_id, 3);
        assert_eq!(res.worker, 1);
        let last = r.sink().lines().pop().unwrap();
        assert_eq!(last.severity, Severity::Error);
        assert_eq!(last.message, "download failed with exit code 7");
    }

    #[test]
    fn missing_binary_is_launch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let r = runner();
        let spec = JobSpec::new(
            dir.path(),
            JobCommand::new("/nonexistent/batchdl-no-such-tool", ["x"]).unwrap(),
        );
        let res = r.run(0, 0, &spec);
        assert!(res.status.is_launch_failure(), "got {:?}", res.status);
        let last = r.sink().lines().pop().unwrap();
        assert_eq!(last.severity, Severity::Error);
        assert!(last.message.starts_with("could not launch"));
    }

    #[test]
    fn output_dir_under_a_file_fails_before_launch() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        std::fs::write(&file, b"x").unwrap();
        let r = runner();
        let res = r.run(0, 0, &sh(&file.join("sub"), "echo never"));
        match res.status {
            JobStatus::OutputDirFailed { path, .. } => assert_eq!(path, file.join("sub")),
            other => panic!("expected OutputDirFailed, got {:?}", other),
        }
        assert!(r.sink().lines().iter().all(|l| l.message != "never"));
    }

    #[test]
    fn creates_nested_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        let res = runner().run(0, 0, &sh(&nested, "true"));
        assert!(res.status.is_success());
        assert!(nested.is_dir());
    }
}
