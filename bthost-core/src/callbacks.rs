//! Bounded-slot callback registry.
//!
//! Every profile service fans events out to a small, fixed number of
//! subscribers (one per connected client instance). Registration and
//! unregistration can happen from inside a callback itself — a client
//! disconnecting mid-event is the common case — so iteration takes a
//! snapshot under a reentrant lock rather than holding a normal mutex
//! across the callback invocation, which would deadlock the moment a
//! callback tries to unregister.

use std::sync::Arc;

use parking_lot::ReentrantMutex;
use std::cell::RefCell;

use crate::error::{BtError, BtResult};

/// Registry capacity: a slot-exhausted registry returns `BtError::Busy`
/// rather than growing unbounded, since an unbounded subscriber list would
/// let a leaking client starve memory.
pub const MAX_SUBSCRIBERS: usize = 16;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SubscriberId(u32);

impl SubscriberId {
    pub fn raw(&self) -> u32 {
        self.0
    }
}

struct Slot<F> {
    id: SubscriberId,
    callback: F,
}

/// A bounded set of subscribers to events of type `E`. `F` is the callback
/// type, typically `Box<dyn Fn(&E) + Send>`.
pub struct CallbackRegistry<F> {
    inner: ReentrantMutex<RefCell<Inner<F>>>,
}

struct Inner<F> {
    next_id: u32,
    slots: Vec<Slot<F>>,
}

impl<F> Default for CallbackRegistry<F> {
    fn default() -> Self {
        Self { inner: ReentrantMutex::new(RefCell::new(Inner { next_id: 1, slots: Vec::new() })) }
    }
}

impl<F> CallbackRegistry<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, callback: F) -> BtResult<SubscriberId> {
        let guard = self.inner.lock();
        let mut inner = guard.borrow_mut();
        if inner.slots.len() >= MAX_SUBSCRIBERS {
            return Err(BtError::Busy);
        }
        let id = SubscriberId(inner.next_id);
        inner.next_id += 1;
        inner.slots.push(Slot { id, callback });
        Ok(id)
    }

    /// Safe to call from inside a callback currently being invoked by
    /// `for_each` on this same thread — the reentrant lock lets it back in,
    /// and `for_each` iterates a snapshot so this mutation is never observed
    /// mid-pass: it cannot panic, deadlock, or cause the removed callback
    /// to be invoked again.
    pub fn unregister(&self, id: SubscriberId) {
        let guard = self.inner.lock();
        guard.borrow_mut().slots.retain(|s| s.id != id);
    }

    pub fn len(&self) -> usize {
        let guard = self.inner.lock();
        let len = guard.borrow().slots.len();
        len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<F: Clone> CallbackRegistry<F> {
    /// Snapshot the current subscriber list and invoke `f` on each,
    /// releasing the lock before each call so a callback is free to
    /// register or unregister, including itself, without deadlocking.
    pub fn for_each(&self, mut f: impl FnMut(SubscriberId, &F)) {
        let snapshot: Vec<(SubscriberId, F)> = {
            let guard = self.inner.lock();
            let snapshot = guard.borrow().slots.iter().map(|s| (s.id, s.callback.clone())).collect();
            snapshot
        };
        for (id, callback) in &snapshot {
            f(*id, callback);
        }
    }
}

pub type SharedRegistry<F> = Arc<CallbackRegistry<F>>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone)]
    struct Counter(Arc<AtomicUsize>);

    #[test]
    fn registry_rejects_past_capacity() {
        let registry: CallbackRegistry<Counter> = CallbackRegistry::new();
        for _ in 0..MAX_SUBSCRIBERS {
            registry.register(Counter(Arc::new(AtomicUsize::new(0)))).unwrap();
        }
        assert!(matches!(registry.register(Counter(Arc::new(AtomicUsize::new(0)))), Err(BtError::Busy)));
    }

    #[test]
    fn unregister_during_iteration_does_not_deadlock_or_reinvoke() {
        let registry: Arc<CallbackRegistry<Counter>> = Arc::new(CallbackRegistry::new());
        let fire_count = Arc::new(AtomicUsize::new(0));

        let reg_for_cb = registry.clone();
        let fire_for_cb = fire_count.clone();
        let self_id = std::cell::Cell::new(None);
        let id = registry
            .register(Counter(Arc::new(AtomicUsize::new(0))))
            .unwrap();
        self_id.set(Some(id));

        registry.for_each(|sid, _c| {
            fire_for_cb.fetch_add(1, Ordering::SeqCst);
            if sid == self_id.get().unwrap() {
                reg_for_cb.unregister(sid);
            }
        });

        assert_eq!(fire_count.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn snapshot_iteration_ignores_registrations_made_mid_pass() {
        let registry: Arc<CallbackRegistry<Counter>> = Arc::new(CallbackRegistry::new());
        let seen = Arc::new(AtomicUsize::new(0));
        let reg = registry.clone();
        registry.register(Counter(Arc::new(AtomicUsize::new(0)))).unwrap();

        let seen_cb = seen.clone();
        registry.for_each(move |_, _| {
            seen_cb.fetch_add(1, Ordering::SeqCst);
            let _ = reg.register(Counter(Arc::new(AtomicUsize::new(0))));
        });

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 2);
    }
}
