//! Per-batch outcome report: one line per job plus totals.

use serde::Serialize;
use std::fmt::Write as _;
use std::time::UNIX_EPOCH;

use crate::job::{JobId, JobResult, JobStatus, WorkerId};

#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub job_id: JobId,
    pub worker: WorkerId,
    pub command: String,
    pub output_dir: String,
    #[serde(flatten)]
    pub status: JobStatus,
    pub duration_secs: f64,
    /// Completion time, seconds since the Unix epoch.
    pub finished_at: u64,
}

/// Summary of a finished batch, sorted by job id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub launch_failures: usize,
    pub jobs: Vec<JobOutcome>,
}

impl BatchReport {
    pub fn from_results(results: &[JobResult]) -> Self {
        let mut jobs: Vec<JobOutcome> = results
            .iter()
            .map(|r| JobOutcome {
                job_id: r.job_id,
                worker: r.worker,
                command: r.spec.command.display(),
                output_dir: r.spec.output_dir.display().to_string(),
                status: r.status.clone(),
                duration_secs: r.duration().as_secs_f64(),
                finished_at: r
                    .finished_at
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs(),
            })
            .collect();
        jobs.sort_by_key(|j| j.job_id);

        let succeeded = jobs.iter().filter(|j| j.status.is_success()).count();
        let launch_failures = jobs.iter().filter(|j| j.status.is_launch_failure()).count();
        Self {
            total: jobs.len(),
            succeeded,
            failed: jobs.len() - succeeded,
            launch_failures,
            jobs,
        }
    }

    /// True iff every job ran and exited 0. An empty batch counts as success.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Human-readable table, one outcome line per job.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<5} {:<6} {:<8} {:<28} {}",
            "JOB", "WORKER", "TIME", "STATUS", "COMMAND"
        );
        for j in &self.jobs {
            let _ = writeln!(
                out,
                "{:<5} {:<6} {:<8} {:<28} {}",
                j.job_id,
                j.worker,
                format!("{:.1}s", j.duration_secs),
                truncate(&j.status.to_string(), 28),
                j.command
            );
        }
        let _ = writeln!(
            out,
            "{} job(s): {} succeeded, {} failed ({} could not launch)",
            self.total, self.succeeded, self.failed, self.launch_failures
        );
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
    t.push('…');
    t
}
