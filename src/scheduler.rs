//! Cancellable scheduled-task abstraction
//!
//! All time-based behavior in the engine (delayed drag starts, animation
//! completions, auto-scroll ticks) runs through this scheduler instead of
//! platform timers. The clock is virtual and monotonic: the host advances
//! it with [`Scheduler::advance`], which returns the tasks that came due so
//! the engine can process them synchronously. This keeps the whole engine
//! single-threaded and deterministic under test.

use std::time::Duration;

use crate::dom::NodeId;

/// Identity of a scheduled task, used by the engine to route a firing back
/// to the component that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// The configured press delay elapsed; the pending drag may start
    DelayElapsed,
    /// A FLIP animation on this node reached its configured duration
    AnimationDone(NodeId),
    /// Per-ancestor auto-scroll interval tick
    AutoScrollTick(NodeId),
}

/// Handle for cancelling a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHandle(u64);

/// A task that came due during [`Scheduler::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub handle: TaskHandle,
    pub kind: TaskKind,
}

#[derive(Debug, Clone)]
struct Entry {
    handle: TaskHandle,
    kind: TaskKind,
    due: Duration,
    interval: Option<Duration>,
}

/// Virtual-clock task scheduler
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_handle: u64,
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time (since engine creation)
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule a one-shot task `delay` from now
    pub fn schedule_once(&mut self, kind: TaskKind, delay: Duration) -> TaskHandle {
        self.push(kind, delay, None)
    }

    /// Schedule a repeating task firing every `interval`, first after one
    /// full interval
    pub fn schedule_repeating(&mut self, kind: TaskKind, interval: Duration) -> TaskHandle {
        self.push(kind, interval, Some(interval))
    }

    fn push(&mut self, kind: TaskKind, delay: Duration, interval: Option<Duration>) -> TaskHandle {
        self.next_handle += 1;
        let handle = TaskHandle(self.next_handle);
        self.entries.push(Entry {
            handle,
            kind,
            due: self.now + delay,
            interval,
        });
        handle
    }

    /// Cancel by handle. Returns whether the task was still pending.
    /// Cancelling an already-fired or unknown handle is a no-op, so
    /// teardown paths may cancel unconditionally.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Whether any pending task matches the predicate
    pub fn any_scheduled(&self, mut pred: impl FnMut(&TaskKind) -> bool) -> bool {
        self.entries.iter().any(|e| pred(&e.kind))
    }

    pub fn pending_count(&self) -> usize {
        self.entries.len()
    }

    /// Advance the clock by `dt` and collect everything that came due, in
    /// due order. Repeating tasks are re-queued (and may fire several times
    /// within one advance).
    pub fn advance(&mut self, dt: Duration) -> Vec<Fired> {
        let target = self.now + dt;
        let mut fired = Vec::new();

        loop {
            // Earliest due entry within the window; stable on ties
            let next = self
                .entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.due <= target)
                .min_by_key(|(_, e)| e.due)
                .map(|(i, _)| i);

            let Some(idx) = next else {
                break;
            };
            let entry = self.entries.remove(idx);
            self.now = entry.due;
            fired.push(Fired {
                handle: entry.handle,
                kind: entry.kind,
            });
            if let Some(interval) = entry.interval {
                self.entries.push(Entry {
                    due: entry.due + interval,
                    ..entry
                });
            }
        }

        self.now = target;
        fired
    }
}
