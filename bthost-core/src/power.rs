//! Host-OS power-state hook (supplemented from `original_source/`'s `sal`
//! wake-lock calls). Kept to a trait with a no-op default since the actual
//! platform integration (suspend blockers, wake locks) is host-OS specific
//! and out of scope here — profiles that need to keep the host awake while
//! a stream is active call through this instead of reaching for a specific
//! OS API directly, so a future platform backend is a single impl away.
use std::sync::atomic::{AtomicUsize, Ordering};

pub trait PowerManager: Send + Sync {
    fn acquire_wake_lock(&self, reason: &str);
    fn release_wake_lock(&self, reason: &str);
}

/// Reference-counts lock acquisitions without touching any OS API.
#[derive(Default)]
pub struct NoopPowerManager {
    held: AtomicUsize,
}

impl NoopPowerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held_count(&self) -> usize {
        self.held.load(Ordering::SeqCst)
    }
}

impl PowerManager for NoopPowerManager {
    fn acquire_wake_lock(&self, reason: &str) {
        log::debug!(target: "power", "wake lock acquired: {}", reason);
        self.held.fetch_add(1, Ordering::SeqCst);
    }

    fn release_wake_lock(&self, reason: &str) {
        log::debug!(target: "power", "wake lock released: {}", reason);
        self.held.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_and_release_balance() {
        let pm = NoopPowerManager::new();
        pm.acquire_wake_lock("a2dp-stream");
        pm.acquire_wake_lock("hfp-sco");
        assert_eq!(pm.held_count(), 2);
        pm.release_wake_lock("a2dp-stream");
        assert_eq!(pm.held_count(), 1);
    }
}
