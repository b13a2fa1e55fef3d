//! Deferred work and cross-thread posting for the service loop.
//!
//! Two queues: a `crossbeam_channel` pair lets other threads (the IPC
//! server thread, the audio transport threads) post work into the loop
//! without touching its state directly, and a same-thread deferred queue
//! lets loop-owned code schedule a follow-up for the next tick instead of
//! recursing into itself mid-dispatch.

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::collections::VecDeque;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Cross-thread posting into the loop. `priority` jobs are drained before
/// `normal` ones on every tick, ahead of the next timer/fd pass.
pub struct PostQueue {
    priority_tx: Sender<Job>,
    priority_rx: Receiver<Job>,
    normal_tx: Sender<Job>,
    normal_rx: Receiver<Job>,
}

impl Default for PostQueue {
    fn default() -> Self {
        let (priority_tx, priority_rx) = crossbeam_channel::unbounded();
        let (normal_tx, normal_rx) = crossbeam_channel::unbounded();
        Self { priority_tx, priority_rx, normal_tx, normal_rx }
    }
}

impl PostQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> PostHandle {
        PostHandle { priority_tx: self.priority_tx.clone(), normal_tx: self.normal_tx.clone() }
    }

    /// Drain both queues, priority first, running each job in order. Bounds
    /// the number drained per tick so a flood of posts can't starve timers
    /// and fd polling indefinitely.
    pub fn drain(&self, max_per_tick: usize) {
        for _ in 0..max_per_tick {
            match self.priority_rx.try_recv() {
                Ok(job) => job(),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        for _ in 0..max_per_tick {
            match self.normal_rx.try_recv() {
                Ok(job) => job(),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
    }
}

/// Cloneable handle other threads hold to post into the loop.
#[derive(Clone)]
pub struct PostHandle {
    priority_tx: Sender<Job>,
    normal_tx: Sender<Job>,
}

impl PostHandle {
    pub fn post_priority(&self, job: impl FnOnce() + Send + 'static) {
        let _ = self.priority_tx.send(Box::new(job));
    }

    pub fn post(&self, job: impl FnOnce() + Send + 'static) {
        let _ = self.normal_tx.send(Box::new(job));
    }
}

/// Same-thread "run this on the next tick" queue, for loop-owned code that
/// wants to defer work rather than recurse (e.g. a profile SM requeuing an
/// event after its own dispatch returns).
#[derive(Default)]
pub struct DeferredQueue<T> {
    items: VecDeque<T>,
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self { items: VecDeque::new() }
    }

    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
    }

    pub fn drain(&mut self) -> std::collections::vec_deque::Drain<'_, T> {
        self.items.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn priority_jobs_run_before_normal_jobs() {
        let queue = PostQueue::new();
        let handle = queue.handle();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let o1 = order.clone();
        handle.post(move || o1.lock().unwrap().push("normal"));
        let o2 = order.clone();
        handle.post_priority(move || o2.lock().unwrap().push("priority"));

        queue.drain(16);
        assert_eq!(*order.lock().unwrap(), vec!["priority", "normal"]);
    }

    #[test]
    fn drain_is_bounded_per_tick() {
        let queue = PostQueue::new();
        let handle = queue.handle();
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            let c = count.clone();
            handle.post(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }
        queue.drain(3);
        assert_eq!(count.load(Ordering::SeqCst), 3);
        queue.drain(100);
        assert_eq!(count.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn deferred_queue_preserves_order() {
        let mut q = DeferredQueue::new();
        q.push(1);
        q.push(2);
        let drained: Vec<_> = q.drain().collect();
        assert_eq!(drained, vec![1, 2]);
        assert!(q.is_empty());
    }
}
