//! Fan-out / fan-in over a fixed pool of worker slots.
//!
//! Keeps one blocking task per held slot; when a job finishes its slot is
//! returned and the next pending spec is started, until none remain.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::SystemTime;

use tokio::task::JoinSet;

use crate::job::{JobId, JobResult, JobSpec, JobStatus};
use crate::runner::JobRunner;

use super::error::SchedulerError;
use super::slots::{SlotGuard, WorkerSlots};

/// Runs every spec through `runner` with at most `concurrency` jobs at once.
///
/// Returns one result per spec, in completion order; `JobResult::job_id` is the
/// spec's index in `specs`. Only returns once every job is terminal. Fails only
/// for `concurrency == 0`, before anything starts.
pub async fn run_all<R: JobRunner>(
    specs: Vec<JobSpec>,
    concurrency: usize,
    runner: Arc<R>,
) -> Result<Vec<JobResult>, SchedulerError> {
    if concurrency == 0 {
        return Err(SchedulerError::InvalidConcurrency(concurrency));
    }
    if specs.is_empty() {
        return Ok(Vec::new());
    }

    let total = specs.len();
    let workers = concurrency.min(total);
    tracing::info!("creating worker pool with {} workers for {} job(s)", workers, total);

    let slots = WorkerSlots::new(workers);
    let mut pending: VecDeque<(JobId, JobSpec)> = specs.into_iter().enumerate().collect();
    let mut join_set = JoinSet::new();
    let mut results = Vec::with_capacity(total);

    loop {
        while !pending.is_empty() {
            let Some(slot) = slots.try_acquire() else {
                break;
            };
            let Some((job_id, spec)) = pending.pop_front() else {
                break;
            };
            let runner = Arc::clone(&runner);
            join_set.spawn_blocking(move || run_in_slot(&*runner, job_id, spec, slot));
        }

        let Some(joined) = join_set.join_next().await else {
            break;
        };
        let result = joined?;
        tracing::debug!(
            worker = result.worker,
            job = result.job_id,
            "job finished: {}",
            result.status
        );
        results.push(result);
    }

    let succeeded = results.iter().filter(|r| r.status.is_success()).count();
    tracing::info!(
        "batch finished: {}/{} job(s) succeeded (peak concurrency {})",
        succeeded,
        total,
        slots.peak()
    );
    debug_assert_eq!(results.len(), total);
    Ok(results)
}

/// Runs one job while holding `slot`. A panicking runner still yields a result,
/// and the slot is released on every path.
fn run_in_slot<R: JobRunner + ?Sized>(
    runner: &R,
    job_id: JobId,
    spec: JobSpec,
    slot: SlotGuard,
) -> JobResult {
    let worker = slot.worker();
    let started_at = SystemTime::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| runner.run(job_id, worker, &spec)));
    drop(slot);
    match outcome {
        Ok(result) => result,
        Err(payload) => {
            let reason = panic_message(&*payload);
            tracing::error!(worker, job = job_id, "runner panicked: {}", reason);
            JobResult {
                job_id,
                worker,
                spec,
                status: JobStatus::Aborted { reason },
                started_at,
                finished_at: SystemTime::now(),
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
