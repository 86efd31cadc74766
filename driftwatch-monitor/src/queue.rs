//! Bounded change-event queue between the watcher and the scheduler.
//!
//! The external watcher pushes through a [`ChangeProducer`]; the
//! scheduler drains batches. The bound plus an explicit overflow
//! policy turn event bursts into backpressure instead of unbounded
//! memory growth.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use crossbeam_channel::{bounded, Receiver, Sender};

use driftwatch_core::config::OverflowPolicy;
use driftwatch_core::types::ChangeEvent;

pub struct ChangeQueue {
    inner: Mutex<VecDeque<ChangeEvent>>,
    not_full: Condvar,
    capacity: usize,
    policy: OverflowPolicy,
    // Capacity-1 wakeup channel the scheduler selects over. Coalesces:
    // one pending wakeup is enough, the scheduler drains in batches.
    notify_tx: Sender<()>,
    notify_rx: Receiver<()>,
}

fn lock_inner(queue: &ChangeQueue) -> MutexGuard<'_, VecDeque<ChangeEvent>> {
    // A poisoned queue mutex only means a producer panicked mid-push;
    // the deque itself is still coherent.
    queue.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ChangeQueue {
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Arc<Self> {
        let (notify_tx, notify_rx) = bounded(1);
        Arc::new(Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity.min(1_024))),
            not_full: Condvar::new(),
            capacity,
            policy,
            notify_tx,
            notify_rx,
        })
    }

    /// Clonable producer handle for the external change source.
    pub fn producer(self: &Arc<Self>) -> ChangeProducer {
        ChangeProducer {
            queue: Arc::clone(self),
        }
    }

    /// Enqueue one event, applying the overflow policy when full.
    pub fn push(&self, event: ChangeEvent) {
        let mut guard = lock_inner(self);
        while guard.len() >= self.capacity {
            match self.policy {
                OverflowPolicy::DropOldest => {
                    guard.pop_front();
                }
                OverflowPolicy::Block => {
                    guard = self
                        .not_full
                        .wait(guard)
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                }
            }
        }
        guard.push_back(event);
        drop(guard);
        let _ = self.notify_tx.try_send(());
    }

    /// Remove and return up to `max` events, oldest first.
    pub fn drain(&self, max: usize) -> Vec<ChangeEvent> {
        let mut guard = lock_inner(self);
        let take = guard.len().min(max);
        let drained: Vec<ChangeEvent> = guard.drain(..take).collect();
        drop(guard);
        self.not_full.notify_all();
        drained
    }

    /// Put a deferred batch back at the queue head, preserving order.
    /// Deliberately does not wake the scheduler: a deferred batch
    /// waits for the next tick.
    pub fn requeue_front(&self, events: Vec<ChangeEvent>) {
        let mut guard = lock_inner(self);
        for event in events.into_iter().rev() {
            guard.push_front(event);
        }
    }

    pub fn len(&self) -> usize {
        lock_inner(self).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wakeup channel for the scheduler's select loop.
    pub fn notify(&self) -> &Receiver<()> {
        &self.notify_rx
    }
}

/// Producer half handed to the external watcher.
#[derive(Clone)]
pub struct ChangeProducer {
    queue: Arc<ChangeQueue>,
}

impl ChangeProducer {
    pub fn push(&self, event: ChangeEvent) {
        self.queue.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftwatch_core::types::ChangeKind;

    fn event(path: &str) -> ChangeEvent {
        ChangeEvent::new(path, ChangeKind::Modified)
    }

    #[test]
    fn drop_oldest_evicts_the_head() {
        let queue = ChangeQueue::new(2, OverflowPolicy::DropOldest);
        queue.push(event("a"));
        queue.push(event("b"));
        queue.push(event("c"));

        let drained = queue.drain(10);
        let paths: Vec<_> = drained
            .iter()
            .map(|e| e.path.display().to_string())
            .collect();
        assert_eq!(paths, vec!["b", "c"]);
    }

    #[test]
    fn drain_respects_max_and_order() {
        let queue = ChangeQueue::new(8, OverflowPolicy::DropOldest);
        for name in ["a", "b", "c"] {
            queue.push(event(name));
        }
        let first = queue.drain(2);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].path.display().to_string(), "a");
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn requeue_front_restores_order() {
        let queue = ChangeQueue::new(8, OverflowPolicy::DropOldest);
        queue.push(event("c"));
        let deferred = vec![event("a"), event("b")];
        queue.requeue_front(deferred);

        let drained = queue.drain(10);
        let paths: Vec<_> = drained
            .iter()
            .map(|e| e.path.display().to_string())
            .collect();
        assert_eq!(paths, vec!["a", "b", "c"]);
    }

    #[test]
    fn push_signals_the_notify_channel_once() {
        let queue = ChangeQueue::new(8, OverflowPolicy::DropOldest);
        queue.push(event("a"));
        queue.push(event("b"));
        // Coalesced: exactly one pending wakeup.
        assert!(queue.notify().try_recv().is_ok());
        assert!(queue.notify().try_recv().is_err());
    }

    #[test]
    fn blocking_producer_resumes_after_drain() {
        let queue = ChangeQueue::new(1, OverflowPolicy::Block);
        queue.push(event("a"));

        let q = Arc::clone(&queue);
        let producer = std::thread::spawn(move || {
            q.push(event("b"));
        });

        // Give the producer a moment to block on the full queue.
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert_eq!(queue.drain(1).len(), 1);
        producer.join().unwrap();
        assert_eq!(queue.len(), 1);
    }
}
