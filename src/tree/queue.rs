//! Shared FIFO work queue for the tree builder's worker pool
//!
//! Completion is tracked with an outstanding-task counter kept under the same
//! mutex as the queue. A task is counted when it is pushed and uncounted only
//! after it has finished (including any tasks it pushed), so the counter
//! reaching zero means no task is queued and no worker is mid-task.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

struct QueueState<T> {
    tasks: VecDeque<T>,
    outstanding: usize,
    closed: bool,
}

pub struct WorkQueue<T> {
    state: Mutex<QueueState<T>>,
    work_available: Condvar,
    drained: Condvar,
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                outstanding: 0,
                closed: false,
            }),
            work_available: Condvar::new(),
            drained: Condvar::new(),
        }
    }

    /// Enqueue a task and count it as outstanding
    pub fn push(&self, task: T) {
        let mut state = self.state.lock();
        state.outstanding += 1;
        state.tasks.push_back(task);
        self.work_available.notify_one();
    }

    /// Block until a task is available. Returns `None` once the queue is closed
    /// and empty.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(task) = state.tasks.pop_front() {
                return Some(task);
            }
            if state.closed {
                return None;
            }
            self.work_available.wait(&mut state);
        }
    }

    /// Mark one popped task as finished
    pub fn task_done(&self) {
        let mut state = self.state.lock();
        state.outstanding = state.outstanding.saturating_sub(1);
        if state.outstanding == 0 {
            self.drained.notify_all();
        }
    }

    /// Block until every pushed task has been marked done
    pub fn wait_until_drained(&self) {
        let mut state = self.state.lock();
        while state.outstanding > 0 {
            self.drained.wait(&mut state);
        }
    }

    /// Wake all blocked workers and make further `pop` calls return `None`
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.work_available.notify_all();
    }

    pub fn outstanding(&self) -> usize {
        self.state.lock().outstanding
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks a task done when dropped, so a panicking task cannot leave the
/// builder waiting forever.
pub struct TaskGuard<'a, T> {
    queue: &'a WorkQueue<T>,
}

impl<'a, T> TaskGuard<'a, T> {
    pub fn new(queue: &'a WorkQueue<T>) -> Self {
        Self { queue }
    }
}

impl<T> Drop for TaskGuard<'_, T> {
    fn drop(&mut self) {
        self.queue.task_done();
    }
}

/// Worker pool size: available parallelism minus two, never below two
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(2).max(2))
        .unwrap_or(2)
}
