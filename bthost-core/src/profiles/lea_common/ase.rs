//! The Audio Stream Endpoint (ASE) state machine shared by the LE Audio
//! client and server profiles. Every LE Audio content service (CCP, MCP,
//! TBS, VMICP/VMICS — see the `lea_client`/`lea_server` modules) is a thin
//! GATT-characteristic router in front of one or more ASEs; none of them
//! reimplement stream setup.

use bthost_types::event::A2dpEvent;

use crate::hsm::State;

/// ASE states using the LE Audio Unicast Client/Server profile's standard
/// abbreviated state names, reused here since every content service funnels
/// through the same codec-configure/QoS-configure/enable/streaming
/// lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AseState {
    Idle,
    CodecConfigured,
    QosConfigured,
    Enabling,
    Streaming,
    Disabling,
    Releasing,
}

pub struct AseCtx {
    pub ase_id: u8,
}

/// Re-using `A2dpEvent` as the ASE event vocabulary since the unicast
/// lifecycle is the same shape as A2DP's (config → start → stream →
/// suspend → close); a dedicated `LeaEvent` would just rename variants.
impl State<AseCtx, A2dpEvent> for AseState {
    fn process_event(&self, _ctx: &mut AseCtx, event: &A2dpEvent) -> Option<Self> {
        match (self, event) {
            (AseState::Idle, A2dpEvent::CodecConfig) => Some(AseState::CodecConfigured),
            (AseState::CodecConfigured, A2dpEvent::ConnectReq) => Some(AseState::QosConfigured),
            (AseState::QosConfigured, A2dpEvent::StreamStartReq) => Some(AseState::Enabling),
            (AseState::Enabling, A2dpEvent::StreamStarted) => Some(AseState::Streaming),
            (AseState::Streaming, A2dpEvent::StreamSuspendReq) => Some(AseState::Disabling),
            (AseState::Disabling, A2dpEvent::StreamSuspended) => Some(AseState::QosConfigured),
            (_, A2dpEvent::StreamClosed) => Some(AseState::Releasing),
            (AseState::Releasing, A2dpEvent::Disconnected) => Some(AseState::Idle),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hsm::StateMachine;

    #[test]
    fn full_lifecycle_reaches_streaming_then_releases() {
        let mut ctx = AseCtx { ase_id: 1 };
        let mut sm = StateMachine::new(AseState::Idle, &mut ctx);
        sm.dispatch(&mut ctx, &A2dpEvent::CodecConfig);
        sm.dispatch(&mut ctx, &A2dpEvent::ConnectReq);
        sm.dispatch(&mut ctx, &A2dpEvent::StreamStartReq);
        sm.dispatch(&mut ctx, &A2dpEvent::StreamStarted);
        assert_eq!(*sm.current(), AseState::Streaming);
        sm.dispatch(&mut ctx, &A2dpEvent::StreamClosed);
        assert_eq!(*sm.current(), AseState::Releasing);
    }
}
