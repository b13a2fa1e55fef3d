//! HFP-HF per-device state machine: the client-role mirror of HFP-AG,
//! minus the web-chat blocker (that heuristic only makes sense on the side
//! that owns the call indicators).

use std::time::Duration;

use bthost_types::addr::BdAddr;
use bthost_types::event::HfpEvent;
use bthost_types::pending::PendingFlags;

use crate::hsm::State;
use crate::loop_::{TimerId, TimerSet};
use crate::sal::Stack;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HfpHfState {
    Idle,
    Connecting,
    Connected,
    AudioConnecting,
    AudioConnected,
}

pub struct HfpHfCtx {
    pub addr: BdAddr,
    pub stack: Box<dyn Stack>,
    pub pending: PendingFlags,
    pub timers: TimerSet<HfpEvent>,
    connect_timer: Option<TimerId>,
}

impl HfpHfCtx {
    pub fn new(addr: BdAddr, stack: Box<dyn Stack>) -> Self {
        Self { addr, stack, pending: PendingFlags::empty(), timers: TimerSet::new(), connect_timer: None }
    }
}

impl State<HfpHfCtx, HfpEvent> for HfpHfState {
    fn enter(&self, ctx: &mut HfpHfCtx) {
        if let HfpHfState::Connecting = self {
            let _ = ctx.stack.connect(ctx.addr);
            ctx.pending.insert(PendingFlags::START);
            ctx.connect_timer = Some(ctx.timers.arm(CONNECT_TIMEOUT, HfpEvent::ConnectTimeout));
        }
    }

    fn exit(&self, ctx: &mut HfpHfCtx) {
        if let HfpHfState::Connecting = self {
            ctx.pending.remove(PendingFlags::START);
            if let Some(id) = ctx.connect_timer.take() {
                ctx.timers.cancel(id);
            }
        }
    }

    fn process_event(&self, _ctx: &mut HfpHfCtx, event: &HfpEvent) -> Option<Self> {
        match (self, event) {
            (HfpHfState::Idle, HfpEvent::ConnectReq) => Some(HfpHfState::Connecting),
            (HfpHfState::Connecting, HfpEvent::Connected) => Some(HfpHfState::Connected),
            (HfpHfState::Connecting, HfpEvent::ConnectTimeout) => Some(HfpHfState::Idle),
            (HfpHfState::Connected, HfpEvent::AudioConnectReq) => Some(HfpHfState::AudioConnecting),
            (HfpHfState::Connected, HfpEvent::DisconnectReq) => Some(HfpHfState::Idle),
            (HfpHfState::Connected, HfpEvent::Disconnected) => Some(HfpHfState::Idle),
            (HfpHfState::AudioConnecting, HfpEvent::AudioConnected) => Some(HfpHfState::AudioConnected),
            (HfpHfState::AudioConnecting, HfpEvent::Disconnected) => Some(HfpHfState::Idle),
            (HfpHfState::AudioConnected, HfpEvent::AudioDisconnectReq) => Some(HfpHfState::Connected),
            (HfpHfState::AudioConnected, HfpEvent::AudioDisconnected) => Some(HfpHfState::Connected),
            (HfpHfState::AudioConnected, HfpEvent::Disconnected) => Some(HfpHfState::Idle),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hsm::StateMachine;
    use crate::sal::MockStack;

    #[test]
    fn connect_then_audio_connect_reaches_audio_connected() {
        let mut ctx = HfpHfCtx::new(BdAddr::new([7; 6]), Box::new(MockStack::new()));
        let mut sm = StateMachine::new(HfpHfState::Idle, &mut ctx);
        sm.dispatch(&mut ctx, &HfpEvent::ConnectReq);
        sm.dispatch(&mut ctx, &HfpEvent::Connected);
        sm.dispatch(&mut ctx, &HfpEvent::AudioConnectReq);
        assert!(sm.dispatch(&mut ctx, &HfpEvent::AudioConnected));
        assert_eq!(*sm.current(), HfpHfState::AudioConnected);
    }
}
