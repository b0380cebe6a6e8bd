//! Job model: what to run, where it lands, and how it ended.
//!
//! A `JobSpec` is built by the caller and never mutated; the runner turns it
//! into exactly one `JobResult`.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// Position of a spec in the submitted batch. Duplicate specs get distinct ids.
pub type JobId = usize;

/// Worker slot number in `0..N`.
pub type WorkerId = usize;

/// Error building a command with no program to run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("job command has no program")]
pub struct EmptyCommand;

/// Program plus ordered argument list. Passed to the OS as-is, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCommand {
    program: String,
    args: Vec<OsString>,
}

impl JobCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Result<Self, EmptyCommand>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let program = program.into();
        if program.trim().is_empty() {
            return Err(EmptyCommand);
        }
        Ok(Self {
            program,
            args: args.into_iter().map(Into::into).collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Argv joined by spaces, for log lines and reports only. Lossy for non-UTF-8 args.
    pub fn display(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(|a| a.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One unit of work: run `command` after making sure `output_dir` exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub output_dir: PathBuf,
    pub command: JobCommand,
}

impl JobSpec {
    pub fn new(output_dir: impl Into<PathBuf>, command: JobCommand) -> Self {
        Self {
            output_dir: output_dir.into(),
            command,
        }
    }

    /// Download job for one target: `tool <target words> <flags> <output_dir>`.
    ///
    /// The target is split on whitespace so an entry may carry extra tool
    /// arguments of its own. The output directory is appended last, so flags
    /// should end with the tool's output-path option (e.g. `-P`).
    pub fn download(
        tool: &str,
        target: &str,
        flags: &[String],
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, EmptyCommand> {
        let output_dir = output_dir.into();
        let args = target
            .split_whitespace()
            .map(OsString::from)
            .chain(flags.iter().map(OsString::from))
            .chain(std::iter::once(output_dir.as_os_str().to_owned()));
        Ok(Self::new(output_dir, JobCommand::new(tool, args)?))
    }
}

/// Terminal state of a job. Each variant is a distinct outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    /// Ran and exited with code 0.
    Succeeded,
    /// Ran and exited with a non-zero code.
    Exited { code: i32 },
    /// Ran and was terminated by a signal.
    Signaled { signal: i32 },
    /// The process could not be started at all.
    LaunchFailed { reason: String },
    /// The output directory could not be created; nothing was launched.
    OutputDirFailed { path: PathBuf, reason: String },
    /// The runner could not finish handling this job (panic, lost child handle).
    Aborted { reason: String },
}

impl JobStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Succeeded)
    }

    pub fn is_launch_failure(&self) -> bool {
        matches!(self, JobStatus::LaunchFailed { .. })
    }

    /// Exit code if the process ran and exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            JobStatus::Succeeded => Some(0),
            JobStatus::Exited { code } => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Succeeded => write!(f, "ok"),
            JobStatus::Exited { code } => write!(f, "exit {}", code),
            JobStatus::Signaled { signal } => write!(f, "signal {}", signal),
            JobStatus::LaunchFailed { reason } => write!(f, "launch failed: {}", reason),
            JobStatus::OutputDirFailed { path, reason } => {
                write!(f, "output dir {}: {}", path.display(), reason)
            }
            JobStatus::Aborted { reason } => write!(f, "aborted: {}", reason),
        }
    }
}

/// Outcome of one job, produced exactly once per submitted spec.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub job_id: JobId,
    pub worker: WorkerId,
    pub spec: JobSpec,
    pub status: JobStatus,
    pub started_at: SystemTime,
    pub finished_at: SystemTime,
}

impl JobResult {
    /// Wall time between start and completion (zero if the clock went backwards).
    pub fn duration(&self) -> Duration {
        self.finished_at
            .duration_since(self.started_at)
            .unwrap_or_default()
    }
}
