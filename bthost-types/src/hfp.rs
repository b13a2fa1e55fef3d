//! HFP call-state model shared between the AG and HF state machines.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallIndicator {
    NoCall,
    InProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallSetupIndicator {
    None,
    IncomingRinging,
    Outgoing,
    OutgoingAlerting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallHeldIndicator {
    None,
    HeldAndActive,
    HeldOnly,
}

/// Timestamped call-indicator snapshot, microsecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CallIndicatorState {
    pub call: Option<(CallIndicator, u64)>,
    pub callsetup: Option<(CallSetupIndicator, u64)>,
    pub callheld: Option<(CallHeldIndicator, u64)>,
}

impl CallIndicatorState {
    pub fn set_call(&mut self, value: CallIndicator, now_us: u64) {
        self.call = Some((value, now_us));
    }

    pub fn set_callsetup(&mut self, value: CallSetupIndicator, now_us: u64) {
        self.callsetup = Some((value, now_us));
    }

    pub fn set_callheld(&mut self, value: CallHeldIndicator, now_us: u64) {
        self.callheld = Some((value, now_us));
    }

    pub fn call_value(&self) -> CallIndicator {
        self.call.map(|(v, _)| v).unwrap_or(CallIndicator::NoCall)
    }

    pub fn callsetup_value(&self) -> CallSetupIndicator {
        self.callsetup
            .map(|(v, _)| v)
            .unwrap_or(CallSetupIndicator::None)
    }
}

/// Window, in microseconds, during which an IN_PROGRESS transition that
/// followed an outgoing/alerting callsetup counts as a "recent dial" for
/// the web-chat blocker.
pub const WEBCHAT_DIAL_GAP_US: u64 = 300_000_000;
/// How long SCO stays blocked once a call is marked webchat-suspect.
pub const WEBCHAT_BLOCK_DURATION_US: u64 = 500_000_000;
/// A locally-originated dial within this window waives the block.
pub const WEBCHAT_LOCAL_DIAL_WAIVER_US: u64 = 10_000_000;
