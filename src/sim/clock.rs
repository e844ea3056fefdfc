//! Virtual-time scheduler
//!
//! Single-fire, cancellable timers keyed by due time. The host advances the
//! clock; nothing here reads a wall clock, so runs are reproducible.

use std::collections::BTreeMap;

/// Milliseconds on the engine clock.
pub type Millis = u64;

/// Opaque handle for a scheduled timer. Never reused by a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Cancellable single-fire timer queue carrying events of type `E`
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    now: Millis,
    next_seq: u64,
    /// (due, seq) -> event; seq doubles as the handle
    queue: BTreeMap<(Millis, u64), E>,
    /// handle -> due, for O(log n) cancel
    due_by_handle: BTreeMap<u64, Millis>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_seq: 1,
            queue: BTreeMap::new(),
            due_by_handle: BTreeMap::new(),
        }
    }

    /// Current clock time
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Schedule `event` to fire `delay` ms from now
    pub fn schedule(&mut self, delay: Millis, event: E) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        let due = self.now.saturating_add(delay);
        self.queue.insert((due, seq), event);
        self.due_by_handle.insert(seq, due);
        TimerHandle(seq)
    }

    /// Cancel a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.due_by_handle.remove(&handle.0) {
            Some(due) => self.queue.remove(&(due, handle.0)).is_some(),
            None => false,
        }
    }

    /// Whether `handle` is still waiting to fire
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.due_by_handle.contains_key(&handle.0)
    }

    /// Number of outstanding timers
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Cancel everything
    pub fn cancel_all(&mut self) {
        self.queue.clear();
        self.due_by_handle.clear();
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to its
    /// due time. When nothing is due the clock settles at `until`.
    ///
    /// The clock never runs backwards; an `until` in the past only drains
    /// timers that are already overdue.
    pub fn pop_due(&mut self, until: Millis) -> Option<(TimerHandle, E)> {
        let Some(&key) = self.queue.keys().next().filter(|k| k.0 <= until) else {
            self.now = self.now.max(until);
            return None;
        };
        let event = self.queue.remove(&key)?;
        self.due_by_handle.remove(&key.1);
        self.now = self.now.max(key.0);
        Some((TimerHandle(key.1), event))
    }

    /// Move the clock forward without firing anything
    pub fn set_now(&mut self, now: Millis) {
        self.now = self.now.max(now);
    }
}
