//! A2DP per-device state machine, carrying the full connect → open →
//! stream → offload → close lifecycle plus the delay-start race and
//! offload timeout edge cases.

use std::time::Duration;

use bthost_types::addr::BdAddr;
use bthost_types::event::A2dpEvent;
use bthost_types::pending::PendingFlags;

use crate::error::BtResult;
use crate::hsm::State;
use crate::loop_::{TimerId, TimerSet};
use crate::sal::Stack;

/// These are exact engineering constants for the connect/start/offload
/// lifecycle, not tuning knobs — do not collapse them into one shared
/// timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(6);
pub const START_TIMEOUT: Duration = Duration::from_secs(5);
pub const OFFLOAD_TIMEOUT: Duration = Duration::from_millis(500);
pub const DELAY_START_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum A2dpState {
    Idle,
    Opening,
    Open,
    Starting,
    Streaming,
    Closing,
}

/// Mutable state threaded through every transition: the peer address, the
/// pending-operation bitmask, and the armed timer ids that pair with it.
pub struct A2dpCtx {
    pub addr: BdAddr,
    pub stack: Box<dyn Stack>,
    pub pending: PendingFlags,
    pub timers: TimerSet<A2dpEvent>,
    /// Set when `DelayStreamStartReq` arrives while still `Opening`: start
    /// is deferred until `Open` is reached instead of being dropped.
    pub delayed_start: bool,
    /// Codec config received for this device. `StreamStartReq` is ignored
    /// in `Open` until this is set.
    pub audio_ready: bool,
    /// Set when an `OffloadTimeout` fires, standing in for the start-fail
    /// notification back to the client; the service layer reads and clears
    /// this rather than the state machine calling out directly.
    pub audio_start_failed: bool,
    connect_timer: Option<TimerId>,
    start_timer: Option<TimerId>,
    offload_timer: Option<TimerId>,
    delay_start_timer: Option<TimerId>,
}

impl A2dpCtx {
    pub fn new(addr: BdAddr, stack: Box<dyn Stack>) -> Self {
        Self {
            addr,
            stack,
            pending: PendingFlags::empty(),
            timers: TimerSet::new(),
            delayed_start: false,
            audio_ready: false,
            audio_start_failed: false,
            connect_timer: None,
            start_timer: None,
            offload_timer: None,
            delay_start_timer: None,
        }
    }

    fn arm_connect(&mut self) {
        self.connect_timer = Some(self.timers.arm(CONNECT_TIMEOUT, A2dpEvent::ConnectTimeout));
    }

    fn cancel_connect(&mut self) {
        if let Some(id) = self.connect_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn arm_start(&mut self) {
        self.pending.insert(PendingFlags::START);
        self.start_timer = Some(self.timers.arm(START_TIMEOUT, A2dpEvent::StartTimeout));
    }

    fn cancel_start(&mut self) {
        self.pending.remove(PendingFlags::START);
        if let Some(id) = self.start_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn arm_offload(&mut self) {
        self.pending.insert(PendingFlags::OFFLOAD_START);
        self.offload_timer = Some(self.timers.arm(OFFLOAD_TIMEOUT, A2dpEvent::OffloadTimeout));
    }

    fn cancel_offload(&mut self) {
        self.pending.remove(PendingFlags::OFFLOAD_START);
        if let Some(id) = self.offload_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn arm_delay_start(&mut self) {
        self.delay_start_timer = Some(self.timers.arm(DELAY_START_TIMEOUT, A2dpEvent::DelayStartTimeout));
    }

    fn cancel_delay_start(&mut self) {
        if let Some(id) = self.delay_start_timer.take() {
            self.timers.cancel(id);
        }
    }
}

impl State<A2dpCtx, A2dpEvent> for A2dpState {
    fn enter(&self, ctx: &mut A2dpCtx) {
        match self {
            A2dpState::Opening => {
                let _ = ctx.stack.connect(ctx.addr);
                ctx.arm_connect();
            }
            A2dpState::Starting => {
                ctx.arm_start();
            }
            A2dpState::Closing => {
                let _ = ctx.stack.disconnect(ctx.addr);
            }
            A2dpState::Idle | A2dpState::Open | A2dpState::Streaming => {}
        }
    }

    fn exit(&self, ctx: &mut A2dpCtx) {
        match self {
            A2dpState::Opening => ctx.cancel_connect(),
            A2dpState::Starting => ctx.cancel_start(),
            A2dpState::Open => {
                ctx.cancel_delay_start();
                ctx.cancel_offload();
            }
            A2dpState::Streaming => ctx.cancel_offload(),
            _ => {}
        }
    }

    fn process_event(&self, ctx: &mut A2dpCtx, event: &A2dpEvent) -> Option<Self> {
        match (self, event) {
            (A2dpState::Idle, A2dpEvent::ConnectReq) => Some(A2dpState::Opening),

            (A2dpState::Opening, A2dpEvent::Connected) => Some(A2dpState::Open),
            (A2dpState::Opening, A2dpEvent::ConnectTimeout) => Some(A2dpState::Idle),
            // A start request that arrives before the peer confirms the
            // connection is remembered, not dropped.
            (A2dpState::Opening, A2dpEvent::DelayStreamStartReq) => {
                ctx.delayed_start = true;
                None
            }

            (A2dpState::Open, A2dpEvent::CodecConfig) => {
                ctx.audio_ready = true;
                None
            }
            // Ignored while audio_ready is false: no codec config yet.
            (A2dpState::Open, A2dpEvent::StreamStartReq) => {
                if ctx.audio_ready {
                    Some(A2dpState::Starting)
                } else {
                    None
                }
            }
            (A2dpState::Open, A2dpEvent::DisconnectReq) => Some(A2dpState::Closing),
            (A2dpState::Open, A2dpEvent::Disconnected) => Some(A2dpState::Idle),
            (A2dpState::Open, A2dpEvent::DelayStartTimeout) => Some(A2dpState::Starting),

            (A2dpState::Starting, A2dpEvent::StreamStarted) => Some(A2dpState::Streaming),
            (A2dpState::Starting, A2dpEvent::StartTimeout) => Some(A2dpState::Open),
            (A2dpState::Starting, A2dpEvent::Disconnected) => Some(A2dpState::Idle),

            // The request sets the pending bit, arms the timer and sends
            // the VSC; the reply (or its timeout) clears the bit.
            (A2dpState::Open | A2dpState::Streaming, A2dpEvent::OffloadStartReq(cmd)) => {
                ctx.arm_offload();
                let _ = ctx.stack.send_vsc(cmd);
                None
            }
            (A2dpState::Open | A2dpState::Streaming, A2dpEvent::OffloadStartEvt) => {
                ctx.cancel_offload();
                None
            }
            (A2dpState::Open, A2dpEvent::OffloadTimeout) => {
                ctx.cancel_offload();
                ctx.audio_start_failed = true;
                None
            }
            (A2dpState::Streaming, A2dpEvent::OffloadTimeout) => {
                ctx.cancel_offload();
                ctx.audio_start_failed = true;
                Some(A2dpState::Open)
            }

            // Delay-start race: a start request arrives while a suspend is
            // still in flight. Drop back to Opened, arm the delay-start
            // timer, and let its expiry re-issue the start.
            (A2dpState::Streaming, A2dpEvent::StreamStartReq) if ctx.pending.contains(PendingFlags::STOP) => {
                ctx.arm_delay_start();
                Some(A2dpState::Open)
            }
            (A2dpState::Streaming, A2dpEvent::StreamSuspendReq) => {
                ctx.pending.insert(PendingFlags::STOP);
                None
            }
            (A2dpState::Streaming, A2dpEvent::StreamSuspended) => {
                ctx.pending.remove(PendingFlags::STOP);
                Some(A2dpState::Open)
            }
            // Disconnect precedence: tear the stream down first and defer
            // the actual disconnect until it closes.
            (A2dpState::Streaming, A2dpEvent::DisconnectReq) => {
                ctx.pending.insert(PendingFlags::DISCONNECT);
                None
            }
            (A2dpState::Streaming, A2dpEvent::StreamClosed) => {
                let was_disconnecting = ctx.pending.contains(PendingFlags::DISCONNECT);
                ctx.pending.remove(PendingFlags::DISCONNECT);
                Some(if was_disconnecting { A2dpState::Closing } else { A2dpState::Idle })
            }
            (A2dpState::Streaming, A2dpEvent::Disconnected) => Some(A2dpState::Idle),

            (A2dpState::Closing, A2dpEvent::Disconnected) => Some(A2dpState::Idle),

            _ => None,
        }
    }
}

/// Whether a start request deferred during `Opening` should now be
/// replayed — called after reaching `Open` from `Opening`.
pub fn take_delayed_start(ctx: &mut A2dpCtx) -> bool {
    std::mem::replace(&mut ctx.delayed_start, false)
}

pub fn dispatch_offload_start(ctx: &mut A2dpCtx, ocf_params: Vec<u8>) -> BtResult<()> {
    use bthost_types::hci::HciVscCommand;
    let cmd = HciVscCommand::new(0x3f, 0x01c0, ocf_params);
    ctx.stack.send_vsc(&cmd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hsm::StateMachine;
    use crate::sal::MockStack;

    fn ctx() -> A2dpCtx {
        A2dpCtx::new(BdAddr::new([1, 2, 3, 4, 5, 6]), Box::new(MockStack::new()))
    }

    fn opened(ctx: &mut A2dpCtx) -> StateMachine<A2dpState> {
        let mut sm = StateMachine::new(A2dpState::Idle, ctx);
        sm.dispatch(ctx, &A2dpEvent::ConnectReq);
        sm.dispatch(ctx, &A2dpEvent::Connected);
        sm
    }

    #[test]
    fn connect_req_transitions_idle_to_opening_and_sends_stack_connect() {
        let mut ctx = ctx();
        let mut sm = StateMachine::new(A2dpState::Idle, &mut ctx);
        assert!(sm.dispatch(&mut ctx, &A2dpEvent::ConnectReq));
        assert_eq!(*sm.current(), A2dpState::Opening);
        assert!(!ctx.pending.contains(PendingFlags::START));
    }

    #[test]
    fn connect_timeout_returns_to_idle() {
        let mut ctx = ctx();
        let mut sm = StateMachine::new(A2dpState::Idle, &mut ctx);
        sm.dispatch(&mut ctx, &A2dpEvent::ConnectReq);
        assert!(sm.dispatch(&mut ctx, &A2dpEvent::ConnectTimeout));
        assert_eq!(*sm.current(), A2dpState::Idle);
    }

    #[test]
    fn delay_start_during_opening_is_remembered_not_dropped() {
        let mut ctx = ctx();
        let mut sm = StateMachine::new(A2dpState::Idle, &mut ctx);
        sm.dispatch(&mut ctx, &A2dpEvent::ConnectReq);
        assert!(!sm.dispatch(&mut ctx, &A2dpEvent::DelayStreamStartReq));
        assert!(ctx.delayed_start);

        sm.dispatch(&mut ctx, &A2dpEvent::Connected);
        assert_eq!(*sm.current(), A2dpState::Open);
        assert!(take_delayed_start(&mut ctx));
        assert!(!ctx.delayed_start);
    }

    #[test]
    fn stream_start_is_ignored_until_audio_ready() {
        let mut ctx = ctx();
        let mut sm = opened(&mut ctx);
        assert!(!sm.dispatch(&mut ctx, &A2dpEvent::StreamStartReq));
        assert_eq!(*sm.current(), A2dpState::Open);

        sm.dispatch(&mut ctx, &A2dpEvent::CodecConfig);
        assert!(ctx.audio_ready);
        assert!(sm.dispatch(&mut ctx, &A2dpEvent::StreamStartReq));
        assert_eq!(*sm.current(), A2dpState::Starting);
        assert!(ctx.pending.contains(PendingFlags::START));
    }

    #[test]
    fn start_timeout_falls_back_to_open_and_clears_pending() {
        let mut ctx = ctx();
        let mut sm = opened(&mut ctx);
        sm.dispatch(&mut ctx, &A2dpEvent::CodecConfig);
        sm.dispatch(&mut ctx, &A2dpEvent::StreamStartReq);
        assert!(sm.dispatch(&mut ctx, &A2dpEvent::StartTimeout));
        assert_eq!(*sm.current(), A2dpState::Open);
        assert!(!ctx.pending.contains(PendingFlags::START));
    }

    fn streaming(ctx: &mut A2dpCtx) -> StateMachine<A2dpState> {
        let mut sm = opened(ctx);
        sm.dispatch(ctx, &A2dpEvent::CodecConfig);
        sm.dispatch(ctx, &A2dpEvent::StreamStartReq);
        sm.dispatch(ctx, &A2dpEvent::StreamStarted);
        sm
    }

    /// Offload start requested in Opened; no reply arrives before the
    /// 500 ms offload timer fires.
    #[test]
    fn offload_timeout_in_opened_notifies_failure_and_stays_opened() {
        let mut ctx = ctx();
        let mut sm = opened(&mut ctx);
        sm.dispatch(&mut ctx, &A2dpEvent::CodecConfig);

        let cmd = bthost_types::hci::HciVscCommand::new(0x3f, 0x01c0, vec![0, 0, 0]);
        assert!(!sm.dispatch(&mut ctx, &A2dpEvent::OffloadStartReq(cmd)));
        assert!(ctx.pending.contains(PendingFlags::OFFLOAD_START));

        assert!(!sm.dispatch(&mut ctx, &A2dpEvent::OffloadTimeout));
        assert_eq!(*sm.current(), A2dpState::Open);
        assert!(!ctx.pending.contains(PendingFlags::OFFLOAD_START));
        assert!(ctx.audio_start_failed);
    }

    #[test]
    fn offload_timeout_while_streaming_tears_stream_down_to_open() {
        let mut ctx = ctx();
        let mut sm = streaming(&mut ctx);
        assert_eq!(*sm.current(), A2dpState::Streaming);

        let cmd = bthost_types::hci::HciVscCommand::new(0x3f, 0x01c0, vec![0, 0, 0]);
        sm.dispatch(&mut ctx, &A2dpEvent::OffloadStartReq(cmd));
        assert!(sm.dispatch(&mut ctx, &A2dpEvent::OffloadTimeout));
        assert_eq!(*sm.current(), A2dpState::Open);
        assert!(!ctx.pending.contains(PendingFlags::OFFLOAD_START));
    }

    /// A start request races a suspend already in flight.
    #[test]
    fn delay_start_races_pending_suspend() {
        let mut ctx = ctx();
        let mut sm = streaming(&mut ctx);

        assert!(!sm.dispatch(&mut ctx, &A2dpEvent::StreamSuspendReq));
        assert!(ctx.pending.contains(PendingFlags::STOP));
        assert_eq!(*sm.current(), A2dpState::Streaming);

        assert!(sm.dispatch(&mut ctx, &A2dpEvent::StreamStartReq));
        assert_eq!(*sm.current(), A2dpState::Open);

        assert!(sm.dispatch(&mut ctx, &A2dpEvent::DelayStartTimeout));
        assert_eq!(*sm.current(), A2dpState::Starting);
        assert!(ctx.pending.contains(PendingFlags::START));
    }

    #[test]
    fn disconnect_while_streaming_defers_until_stream_closes() {
        let mut ctx = ctx();
        let mut sm = streaming(&mut ctx);

        assert!(!sm.dispatch(&mut ctx, &A2dpEvent::DisconnectReq));
        assert_eq!(*sm.current(), A2dpState::Streaming);
        assert!(ctx.pending.contains(PendingFlags::DISCONNECT));

        assert!(sm.dispatch(&mut ctx, &A2dpEvent::StreamClosed));
        assert_eq!(*sm.current(), A2dpState::Closing);
        assert!(!ctx.pending.contains(PendingFlags::DISCONNECT));
    }

    #[test]
    fn stream_closed_without_pending_disconnect_goes_idle() {
        let mut ctx = ctx();
        let mut sm = streaming(&mut ctx);
        assert!(sm.dispatch(&mut ctx, &A2dpEvent::StreamClosed));
        assert_eq!(*sm.current(), A2dpState::Idle);
    }
}
