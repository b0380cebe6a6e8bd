//! Worker slots shared across running jobs.
//!
//! Exactly `capacity` slots exist. A job holds one `SlotGuard` for its whole
//! run; dropping the guard hands the slot back, whatever path the job took.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::job::WorkerId;

/// Fixed pool of worker slots. `in_use` never exceeds `capacity`.
#[derive(Debug)]
pub struct WorkerSlots {
    capacity: usize,
    free: Mutex<Vec<WorkerId>>,
    in_use: AtomicUsize,
    peak: AtomicUsize,
}

impl WorkerSlots {
    /// Create `capacity` slots (at least one).
    pub fn new(capacity: usize) -> Arc<Self> {
        let capacity = capacity.max(1);
        Arc::new(Self {
            capacity,
            // Reversed so slot 0 is handed out first.
            free: Mutex::new((0..capacity).rev().collect()),
            in_use: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently held.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }

    pub fn available(&self) -> usize {
        self.capacity.saturating_sub(self.in_use())
    }

    /// Highest `in_use` seen since creation.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }

    /// Take a free slot, or `None` if all are held.
    pub fn try_acquire(self: &Arc<Self>) -> Option<SlotGuard> {
        let worker = self
            .free
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop()?;
        let now = self.in_use.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak.fetch_max(now, Ordering::AcqRel);
        Some(SlotGuard {
            slots: Arc::clone(self),
            worker,
        })
    }

    fn release(&self, worker: WorkerId) {
        self.in_use.fetch_sub(1, Ordering::AcqRel);
        self.free
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(worker);
    }
}

/// Permission to run one job. Releases its slot when dropped.
#[derive(Debug)]
pub struct SlotGuard {
    slots: Arc<WorkerSlots>,
    worker: WorkerId,
}

impl SlotGuard {
    pub fn worker(&self) -> WorkerId {
        self.worker
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.slots.release(self.worker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_until_exhausted_then_release() {
        let slots = WorkerSlots::new(2);
        assert_eq!(slots.available(), 2);
        let a = slots.try_acquire().unwrap();
        let b = slots.try_acquire().unwrap();
        assert_eq!(a.worker(), 0);
        assert_eq!(b.worker(), 1);
        assert_eq!(slots.in_use(), 2);
        assert!(slots.try_acquire().is_none());
        drop(a);
        assert_eq!(slots.in_use(), 1);
        let c = slots.try_acquire().unwrap();
        assert_eq!(c.worker(), 0);
        drop(b);
        drop(c);
        assert_eq!(slots.in_use(), 0);
        assert_eq!(slots.available(), 2);
        assert_eq!(slots.peak(), 2);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let slots = WorkerSlots::new(0);
        assert_eq!(slots.capacity(), 1);
    }

    #[test]
    fn slot_is_released_when_holder_panics() {
        let slots = WorkerSlots::new(1);
        let guard = slots.try_acquire().unwrap();
        let res = std::thread::spawn(move || {
            let _held = guard;
            panic!("job blew up");
        })
        .join();
        assert!(res.is_err());
        assert_eq!(slots.in_use(), 0);
        assert!(slots.try_acquire().is_some());
    }
}
