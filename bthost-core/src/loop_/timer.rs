//! Timer bookkeeping for the service loop: a flat list of armed deadlines,
//! checked once per tick. The profile count this service hosts is small
//! enough that a sorted-scan beats the bookkeeping overhead of a real
//! timer wheel.

use std::time::{Duration, Instant};

/// Opaque handle returned by `TimerSet::arm`, used to `cancel` the same
/// timer later. Carries no meaning beyond equality — callers that need to
/// know *which* timer fired inspect the `tag` passed back on expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct ArmedTimer<T> {
    id: TimerId,
    deadline: Instant,
    tag: T,
}

/// A set of armed, cancellable, one-shot timers tagged with a caller-defined
/// value `T` (typically a profile event). Re-arming the same logical timer
/// is the caller's job: cancel the old id, then arm a new one, pairing each
/// pending-operation bit with its own arm/cancel lifecycle.
pub struct TimerSet<T> {
    next_id: u64,
    armed: Vec<ArmedTimer<T>>,
}

impl<T> Default for TimerSet<T> {
    fn default() -> Self {
        Self { next_id: 1, armed: Vec::new() }
    }
}

impl<T> TimerSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, after: Duration, tag: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.armed.push(ArmedTimer { id, deadline: Instant::now() + after, tag });
        id
    }

    /// Cancel a previously armed timer. No-op if it already fired or was
    /// never armed — callers are not required to track liveness themselves.
    pub fn cancel(&mut self, id: TimerId) {
        self.armed.retain(|t| t.id != id);
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.armed.iter().any(|t| t.id == id)
    }

    /// Remove and return every timer whose deadline has passed, in the
    /// order they were armed.
    pub fn expire(&mut self, now: Instant) -> Vec<T> {
        let mut expired = Vec::new();
        let mut remaining = Vec::with_capacity(self.armed.len());
        for t in self.armed.drain(..) {
            if t.deadline <= now {
                expired.push(t.tag);
            } else {
                remaining.push(t);
            }
        }
        self.armed = remaining;
        expired
    }

    /// Duration until the nearest deadline, or `None` if nothing is armed —
    /// used as the service loop's poll timeout so it doesn't busy-spin.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        self.armed
            .iter()
            .map(|t| t.deadline.saturating_duration_since(now))
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_timers_fire_once() {
        let mut timers = TimerSet::new();
        let id = timers.arm(Duration::from_millis(0), "a");
        assert!(timers.is_armed(id));
        let fired = timers.expire(Instant::now() + Duration::from_millis(1));
        assert_eq!(fired, vec!["a"]);
        assert!(!timers.is_armed(id));
        assert!(timers.expire(Instant::now()).is_empty());
    }

    #[test]
    fn cancel_prevents_later_expiry() {
        let mut timers = TimerSet::new();
        let id = timers.arm(Duration::from_millis(0), "a");
        timers.cancel(id);
        assert!(timers.expire(Instant::now() + Duration::from_millis(1)).is_empty());
    }

    #[test]
    fn independent_flags_have_independent_timers() {
        let mut timers = TimerSet::new();
        let start = timers.arm(Duration::from_millis(0), "start");
        let stop = timers.arm(Duration::from_millis(0), "stop");
        timers.cancel(start);
        let fired = timers.expire(Instant::now() + Duration::from_millis(1));
        assert_eq!(fired, vec!["stop"]);
        let _ = stop;
    }
}
