//! The single-threaded cooperative service loop.
//!
//! One thread owns every profile state machine, the audio transports and
//! the HCI command path. Everything else — the IPC server thread, audio
//! transport I/O threads — talks to it only through `PostHandle`. A tick
//! drains a priority channel, then a normal channel, then runs time-based
//! work, with fd polling folded in for this service's loop-owned fds
//! (audio pipes, the PAN tap device).

pub mod poll;
pub mod timer;
pub mod work;

use std::time::{Duration, Instant};

pub use poll::{Interest, Poller, Readiness};
pub use timer::{TimerId, TimerSet};
pub use work::{DeferredQueue, PostHandle, PostQueue};

/// Upper bound on how long a single `wait` call blocks even with nothing
/// armed, so a loop with no timers and no watched fds still notices a
/// `stop()` call promptly.
const MAX_POLL_WAIT: Duration = Duration::from_millis(250);
const MAX_POSTS_PER_TICK: usize = 64;

/// One cooperative scheduler. `T` is the caller's tag type threaded through
/// both timers and fd readiness — in `bthost-core` this is `LoopSource`,
/// identifying which profile or transport a wakeup belongs to.
pub struct ServiceLoop<T: Clone> {
    posts: PostQueue,
    timers: TimerSet<T>,
    poller: Poller<T>,
    stopped: bool,
}

/// What woke the loop up on a given tick.
pub enum Wakeup<T> {
    Timer(T),
    Ready(Readiness<T>),
}

impl<T: Clone> Default for ServiceLoop<T> {
    fn default() -> Self {
        Self {
            posts: PostQueue::new(),
            timers: TimerSet::new(),
            poller: Poller::new(),
            stopped: false,
        }
    }
}

impl<T: Clone> ServiceLoop<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post_handle(&self) -> PostHandle {
        self.posts.handle()
    }

    pub fn timers(&mut self) -> &mut TimerSet<T> {
        &mut self.timers
    }

    pub fn poller(&mut self) -> &mut Poller<T> {
        &mut self.poller
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Run until `stop()` is called, invoking `on_wakeup` for every timer
    /// firing and every fd readiness event, draining posted jobs (which run
    /// themselves, so they take no callback) before each poll.
    pub fn run(&mut self, mut on_wakeup: impl FnMut(Wakeup<T>)) {
        while !self.stopped {
            self.tick(&mut on_wakeup);
        }
    }

    /// Execute exactly one iteration: drain posts, poll ready fds, expire
    /// timers. Exposed separately so tests can step the loop deterministically.
    pub fn tick(&mut self, on_wakeup: &mut impl FnMut(Wakeup<T>)) {
        self.posts.drain(MAX_POSTS_PER_TICK);

        let now = Instant::now();
        let timeout = self.timers.next_deadline(now).map(|d| d.min(MAX_POLL_WAIT)).unwrap_or(MAX_POLL_WAIT);

        match self.poller.wait(Some(timeout)) {
            Ok(ready) => {
                for r in ready {
                    on_wakeup(Wakeup::Ready(r));
                }
            }
            Err(e) => {
                log::warn!(target: "loop", "poll failed: {}", e);
            }
        }

        for tag in self.timers.expire(Instant::now()) {
            on_wakeup(Wakeup::Timer(tag));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_wakeup_fires_through_run_loop() {
        let mut svc: ServiceLoop<&str> = ServiceLoop::new();
        svc.timers().arm(Duration::from_millis(1), "fired");

        let mut fired = Vec::new();
        loop {
            svc.tick(&mut |w| {
                if let Wakeup::Timer(tag) = w {
                    fired.push(tag);
                }
            });
            if !fired.is_empty() {
                break;
            }
        }
        assert_eq!(fired, vec!["fired"]);
    }

    #[test]
    fn posted_job_runs_before_next_tick_returns() {
        let svc: ServiceLoop<&str> = ServiceLoop::new();
        let handle = svc.post_handle();
        let ran = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let r = ran.clone();
        handle.post(move || r.store(true, std::sync::atomic::Ordering::SeqCst));

        let mut svc = svc;
        svc.tick(&mut |_| {});
        assert!(ran.load(std::sync::atomic::Ordering::SeqCst));
    }
}
