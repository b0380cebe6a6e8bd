//! Spawning with merged output, and a guard that never leaves a child behind.

use std::io::{self, PipeReader};
use std::process::{Child, Command, ExitStatus, Stdio};

use crate::job::{JobCommand, JobStatus};

/// Spawns `command` with stdout and stderr sharing one pipe, so the reader sees
/// both streams in the order the tool wrote them. Stdin is closed.
pub(super) fn spawn_merged(command: &JobCommand) -> io::Result<(PipeReader, ChildGuard)> {
    let (reader, writer) = io::pipe()?;
    let mut cmd = Command::new(command.program());
    cmd.args(command.args())
        .stdin(Stdio::null())
        .stdout(writer.try_clone()?)
        .stderr(writer);
    let child = cmd.spawn()?;
    // Our copies of the write end live in `cmd`; close them or EOF never comes.
    drop(cmd);
    Ok((reader, ChildGuard { child: Some(child) }))
}

/// Owns a running child. Dropping it without `wait` kills and reaps the child.
pub(super) struct ChildGuard {
    child: Option<Child>,
}

impl ChildGuard {
    pub(super) fn id(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// Blocks until the child exits. On error the guard still reaps it on drop.
    pub(super) fn wait(mut self) -> io::Result<ExitStatus> {
        let Some(child) = self.child.as_mut() else {
            return Err(io::Error::other("child already reaped"));
        };
        let status = child.wait()?;
        self.child = None;
        Ok(status)
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            tracing::warn!(pid = child.id(), "killing unfinished child process");
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Maps an OS exit status to a terminal job status.
pub(super) fn status_from_exit(exit: ExitStatus) -> JobStatus {
    if exit.success() {
        return JobStatus::Succeeded;
    }
    if let Some(code) = exit.code() {
        return JobStatus::Exited { code };
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = exit.signal() {
            return JobStatus::Signaled { signal };
        }
    }
    JobStatus::Aborted {
        reason: format!("unrecognized exit status: {}", exit),
    }
}
