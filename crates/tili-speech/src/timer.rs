//! Deferred tasks
//!
//! Every delay in the engine (narration stagger, restart debounce, focus
//! settle) goes through the [`Timer`] capability. [`TimerQueue`] is a
//! virtual-time implementation: time only moves when the owner calls
//! [`TimerQueue::advance`], which makes delays deterministic in tests and
//! lets a single-threaded host drive them from its own event loop.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Task run when a timer fires
pub type TimerTask = Box<dyn FnOnce() + Send>;

/// Handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Scheduling capability
pub trait Timer: Send + Sync {
    /// Run `task` once after `delay`
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle;

    /// Drop a task that has not fired yet; returns whether it was pending
    fn cancel(&self, handle: TimerHandle) -> bool;
}

/// Virtual-time timer queue
///
/// Tasks with equal deadlines fire in scheduling order. Tasks run with no
/// lock held and may schedule further tasks.
#[derive(Default)]
pub struct TimerQueue {
    now: Mutex<Duration>,
    // (deadline, handle) -> task; handle breaks deadline ties by insertion
    tasks: Mutex<BTreeMap<(Duration, TimerHandle), TimerTask>>,
    next_handle: AtomicU64,
}

impl std::fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now", &*self.now.lock())
            .field("pending", &self.tasks.lock().len())
            .finish()
    }
}

impl TimerQueue {
    /// Empty queue at time zero
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    #[must_use]
    pub fn now(&self) -> Duration {
        *self.now.lock()
    }

    /// Number of tasks waiting to fire
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Deadline of the earliest pending task
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.tasks.lock().keys().next().map(|(deadline, _)| *deadline)
    }

    /// Move time forward by `by`, firing every task that comes due
    ///
    /// Tasks scheduled while advancing fire too if their deadline falls
    /// inside the window. Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut fired = 0;
        while let Some(task) = self.pop_due(target) {
            task();
            fired += 1;
        }
        *self.now.lock() = target;
        fired
    }

    /// Fire every task, however far in the future, up to `limit` tasks
    ///
    /// Returns the number of tasks run. The limit guards against tasks that
    /// reschedule themselves forever.
    pub fn run_until_idle(&self, limit: usize) -> usize {
        let mut fired = 0;
        while fired < limit {
            let Some(deadline) = self.next_deadline() else {
                break;
            };
            let Some(task) = self.pop_due(deadline) else {
                break;
            };
            task();
            fired += 1;
        }
        fired
    }

    fn pop_due(&self, target: Duration) -> Option<TimerTask> {
        let mut tasks = self.tasks.lock();
        let key = *tasks.keys().next()?;
        if key.0 > target {
            return None;
        }
        let task = tasks.remove(&key)?;
        drop(tasks);

        let mut now = self.now.lock();
        if key.0 > *now {
            *now = key.0;
        }
        Some(task)
    }
}

impl Timer for TimerQueue {
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let handle = TimerHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let deadline = self.now() + delay;
        self.tasks.lock().insert((deadline, handle), task);
        handle
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        let mut tasks = self.tasks.lock();
        let key = tasks.keys().find(|(_, h)| *h == handle).copied();
        key.and_then(|key| tasks.remove(&key)).is_some()
    }
}
