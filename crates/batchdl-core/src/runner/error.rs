//! Failures that stop a job before it produces an exit status.

use std::io;
use std::path::PathBuf;

use crate::job::JobStatus;

/// Internal to the runner: every variant is turned into a `JobStatus`.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("could not create output dir {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("could not wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl RunnerError {
    pub fn into_status(self) -> JobStatus {
        match self {
            RunnerError::OutputDir { path, source } => JobStatus::OutputDirFailed {
                path,
                reason: source.to_string(),
            },
            err @ RunnerError::Launch { .. } => JobStatus::LaunchFailed {
                reason: err.to_string(),
            },
            err @ RunnerError::Wait { .. } => JobStatus::Aborted {
                reason: err.to_string(),
            },
        }
    }
}
