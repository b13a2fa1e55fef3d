//! HFP-AG per-device state machine: SLC (service-level connection) and SCO
//! audio lifecycle, gated by the web-chat blocker on the audio path.

use std::time::Duration;

use bthost_types::addr::BdAddr;
use bthost_types::event::HfpEvent;
use bthost_types::pending::PendingFlags;

use crate::hsm::State;
use crate::loop_::{TimerId, TimerSet};
use crate::sal::Stack;

use super::webchat::WebchatBlocker;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const RETRY_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HfpAgState {
    Idle,
    Connecting,
    Connected,
    AudioConnecting,
    AudioConnected,
}

pub struct HfpAgCtx {
    pub addr: BdAddr,
    pub stack: Box<dyn Stack>,
    pub pending: PendingFlags,
    pub timers: TimerSet<HfpEvent>,
    pub webchat: WebchatBlocker,
    /// Set by the caller from a monotonic microsecond clock before every
    /// dispatch; the webchat blocker and call-indicator timestamps are
    /// otherwise untestable without injecting time.
    pub now_us: u64,
    connect_timer: Option<TimerId>,
    retry_timer: Option<TimerId>,
}

impl HfpAgCtx {
    pub fn new(addr: BdAddr, stack: Box<dyn Stack>) -> Self {
        Self {
            addr,
            stack,
            pending: PendingFlags::empty(),
            timers: TimerSet::new(),
            webchat: WebchatBlocker::new(),
            now_us: 0,
            connect_timer: None,
            retry_timer: None,
        }
    }
}

impl State<HfpAgCtx, HfpEvent> for HfpAgState {
    fn enter(&self, ctx: &mut HfpAgCtx) {
        match self {
            HfpAgState::Connecting => {
                let _ = ctx.stack.connect(ctx.addr);
                ctx.pending.insert(PendingFlags::START);
                ctx.connect_timer = Some(ctx.timers.arm(CONNECT_TIMEOUT, HfpEvent::ConnectTimeout));
            }
            HfpAgState::Idle | HfpAgState::Connected | HfpAgState::AudioConnecting | HfpAgState::AudioConnected => {}
        }
    }

    fn exit(&self, ctx: &mut HfpAgCtx) {
        if matches!(self, HfpAgState::Connecting) {
            ctx.pending.remove(PendingFlags::START);
            if let Some(id) = ctx.connect_timer.take() {
                ctx.timers.cancel(id);
            }
        }
    }

    fn process_event(&self, ctx: &mut HfpAgCtx, event: &HfpEvent) -> Option<Self> {
        match (self, event) {
            (HfpAgState::Idle, HfpEvent::ConnectReq) => Some(HfpAgState::Connecting),

            (HfpAgState::Connecting, HfpEvent::Connected) => Some(HfpAgState::Connected),
            (HfpAgState::Connecting, HfpEvent::ConnectTimeout) => {
                ctx.retry_timer = Some(ctx.timers.arm(RETRY_BACKOFF, HfpEvent::RetryTimeout));
                Some(HfpAgState::Idle)
            }
            (HfpAgState::Idle, HfpEvent::RetryTimeout) => Some(HfpAgState::Connecting),

            (HfpAgState::Connected, HfpEvent::CallSetupChanged(setup)) => {
                ctx.webchat.note_callsetup(*setup, ctx.now_us);
                None
            }
            (HfpAgState::Connected, HfpEvent::CallIndicatorChanged(indicator)) => {
                if matches!(indicator, bthost_types::hfp::CallIndicator::InProgress) {
                    ctx.webchat.note_call_in_progress(ctx.now_us);
                }
                None
            }
            (HfpAgState::Connected, HfpEvent::StartVirtualCallReq) => {
                ctx.webchat.note_local_dial_request(ctx.now_us);
                None
            }
            (HfpAgState::Connected, HfpEvent::StackAudioReq) => {
                if ctx.webchat.should_block_audio_req(ctx.now_us) {
                    None
                } else {
                    Some(HfpAgState::AudioConnecting)
                }
            }
            (HfpAgState::Connected, HfpEvent::AudioConnectReq) => Some(HfpAgState::AudioConnecting),
            (HfpAgState::Connected, HfpEvent::DisconnectReq) => Some(HfpAgState::Idle),
            (HfpAgState::Connected, HfpEvent::Disconnected) => Some(HfpAgState::Idle),

            (HfpAgState::AudioConnecting, HfpEvent::AudioConnected) => Some(HfpAgState::AudioConnected),
            (HfpAgState::AudioConnecting, HfpEvent::Disconnected) => Some(HfpAgState::Idle),

            (HfpAgState::AudioConnected, HfpEvent::AudioDisconnectReq) => Some(HfpAgState::Connected),
            (HfpAgState::AudioConnected, HfpEvent::AudioDisconnected) => Some(HfpAgState::Connected),
            (HfpAgState::AudioConnected, HfpEvent::Disconnected) => Some(HfpAgState::Idle),

            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hsm::StateMachine;
    use crate::sal::MockStack;
    use bthost_types::hfp::{CallIndicator, CallSetupIndicator};

    fn ctx() -> HfpAgCtx {
        HfpAgCtx::new(BdAddr::new([9; 6]), Box::new(MockStack::new()))
    }

    fn connected(ctx: &mut HfpAgCtx) -> StateMachine<HfpAgState> {
        let mut sm = StateMachine::new(HfpAgState::Idle, ctx);
        sm.dispatch(ctx, &HfpEvent::ConnectReq);
        sm.dispatch(ctx, &HfpEvent::Connected);
        sm
    }

    #[test]
    fn webchat_blocker_suppresses_audio_req_transition() {
        let mut ctx = ctx();
        let mut sm = connected(&mut ctx);

        ctx.now_us = 1_000_000;
        sm.dispatch(&mut ctx, &HfpEvent::CallSetupChanged(CallSetupIndicator::OutgoingAlerting));
        ctx.now_us = 1_050_000;
        sm.dispatch(&mut ctx, &HfpEvent::CallIndicatorChanged(CallIndicator::InProgress));

        ctx.now_us = 1_050_001;
        assert!(!sm.dispatch(&mut ctx, &HfpEvent::StackAudioReq));
        assert_eq!(*sm.current(), HfpAgState::Connected);
    }

    #[test]
    fn genuine_local_dial_allows_audio_req_through() {
        let mut ctx = ctx();
        let mut sm = connected(&mut ctx);

        ctx.now_us = 900_000;
        sm.dispatch(&mut ctx, &HfpEvent::StartVirtualCallReq);
        ctx.now_us = 1_000_000;
        sm.dispatch(&mut ctx, &HfpEvent::CallSetupChanged(CallSetupIndicator::Outgoing));
        ctx.now_us = 1_050_000;
        sm.dispatch(&mut ctx, &HfpEvent::CallIndicatorChanged(CallIndicator::InProgress));

        ctx.now_us = 1_050_001;
        assert!(sm.dispatch(&mut ctx, &HfpEvent::StackAudioReq));
        assert_eq!(*sm.current(), HfpAgState::AudioConnecting);
    }

    #[test]
    fn connect_timeout_arms_retry_and_returns_to_idle() {
        let mut ctx = ctx();
        let mut sm = StateMachine::new(HfpAgState::Idle, &mut ctx);
        sm.dispatch(&mut ctx, &HfpEvent::ConnectReq);
        assert!(sm.dispatch(&mut ctx, &HfpEvent::ConnectTimeout));
        assert_eq!(*sm.current(), HfpAgState::Idle);
        assert!(ctx.retry_timer.is_some());
    }
}
