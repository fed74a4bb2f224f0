//! Cancellable scheduled-task queue.
//!
//! A min-heap of pending tasks keyed by fire time on the audio clock.
//! Cancellation is by [`TaskId`] identity; cancelled heap entries are
//! discarded lazily when they surface.

use std::collections::{BinaryHeap, HashMap};

/// Identity of a scheduled task, for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug, Clone, Copy)]
struct Entry {
    fire_at: f64,
    id: u64,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // reversed: earliest fire time pops first
        other
            .fire_at
            .total_cmp(&self.fire_at)
            .then(other.id.cmp(&self.id))
    }
}

/// Pending callbacks keyed by fire time, with cancellation by identity.
#[derive(Debug)]
pub struct TimerQueue<T> {
    heap: BinaryHeap<Entry>,
    tasks: HashMap<u64, T>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            tasks: HashMap::new(),
            next_id: 0,
        }
    }

    /// Number of live (uncancelled) tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Schedule a task to fire at the given time (seconds on the caller's
    /// clock).
    pub fn schedule(&mut self, fire_at: f64, task: T) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        self.heap.push(Entry { fire_at, id });
        self.tasks.insert(id, task);
        TaskId(id)
    }

    /// Cancel a task in any state; returns it if it had not yet fired.
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        self.tasks.remove(&id.0)
    }

    /// True if the task is scheduled and has not fired or been cancelled.
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id.0)
    }

    /// Pop the next task due at or before `now`, skipping cancelled entries.
    pub fn pop_due(&mut self, now: f64) -> Option<(TaskId, T)> {
        while let Some(&Entry { fire_at, id }) = self.heap.peek() {
            if !self.tasks.contains_key(&id) {
                // cancelled; discard the stale heap entry
                self.heap.pop();
                continue;
            }
            if fire_at > now {
                return None;
            }
            self.heap.pop();
            if let Some(task) = self.tasks.remove(&id) {
                return Some((TaskId(id), task));
            }
        }
        None
    }

    /// Drop every pending task.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_time_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(3.0, "c");
        queue.schedule(1.0, "a");
        queue.schedule(2.0, "b");

        assert!(queue.pop_due(0.5).is_none());
        assert_eq!(queue.pop_due(10.0).unwrap().1, "a");
        assert_eq!(queue.pop_due(10.0).unwrap().1, "b");
        assert_eq!(queue.pop_due(10.0).unwrap().1, "c");
        assert!(queue.pop_due(10.0).is_none());
    }

    #[test]
    fn test_pop_due_respects_now() {
        let mut queue = TimerQueue::new();
        queue.schedule(1.0, 1);
        queue.schedule(2.0, 2);
        assert_eq!(queue.pop_due(1.5).unwrap().1, 1);
        assert!(queue.pop_due(1.5).is_none());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_cancellation_in_any_state() {
        let mut queue = TimerQueue::new();
        let a = queue.schedule(1.0, "a");
        let b = queue.schedule(2.0, "b");

        assert_eq!(queue.cancel(a), Some("a"));
        assert!(!queue.is_pending(a));
        // double-cancel is harmless
        assert_eq!(queue.cancel(a), None);

        // the cancelled entry never surfaces
        assert_eq!(queue.pop_due(10.0).unwrap().0, b);
        assert!(queue.pop_due(10.0).is_none());

        // cancelling after firing is also harmless
        assert_eq!(queue.cancel(b), None);
    }

    #[test]
    fn test_clear() {
        let mut queue = TimerQueue::new();
        queue.schedule(1.0, 1);
        queue.schedule(2.0, 2);
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.pop_due(10.0).is_none());
    }

    #[test]
    fn test_equal_fire_times_keep_schedule_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(1.0, "first");
        queue.schedule(1.0, "second");
        assert_eq!(queue.pop_due(1.0).unwrap().1, "first");
        assert_eq!(queue.pop_due(1.0).unwrap().1, "second");
    }
}
