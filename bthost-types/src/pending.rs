//! The independent pending-operation bitmask shared by every profile SM.

bitflags::bitflags! {
    /// Outstanding asynchronous operations on a profile state machine.
    ///
    /// Each bit is armed and cleared independently: setting a bit always
    /// pairs with arming its timer, clearing always pairs with cancelling
    /// it. Do not collapse these into a single "mode" enum —
    /// several bits are legitimately set at once (e.g. stop pending while a
    /// start is still pending, per the delay-start race).
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct PendingFlags: u8 {
        const START          = 1 << 0;
        const STOP           = 1 << 1;
        const OFFLOAD_START  = 1 << 2;
        const OFFLOAD_STOP   = 1 << 3;
        const DISCONNECT     = 1 << 4;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_independent() {
        let mut f = PendingFlags::empty();
        f.insert(PendingFlags::START);
        f.insert(PendingFlags::STOP);
        assert!(f.contains(PendingFlags::START));
        assert!(f.contains(PendingFlags::STOP));
        f.remove(PendingFlags::START);
        assert!(!f.contains(PendingFlags::START));
        assert!(f.contains(PendingFlags::STOP));
    }
}
