//! The "web-chat blocker" heuristic.
//!
//! Some handsets route a web-chat app's call audio through the AG's
//! `+CIEV` call indicators without ever dialing locally, then immediately
//! request SCO. Granting that SCO request steals the mic/speaker from
//! whatever's already using them on the phone side. The heuristic: if
//! `call` flips to in-progress within a short window of `callsetup` having
//! gone outgoing, and the AG never saw a local dial request in that
//! window, treat the upcoming audio request as web-chat-originated and
//! block it for a fixed duration.

use bthost_types::hfp::{
    CallIndicatorState, CallSetupIndicator, WEBCHAT_BLOCK_DURATION_US, WEBCHAT_DIAL_GAP_US,
    WEBCHAT_LOCAL_DIAL_WAIVER_US,
};

#[derive(Default)]
pub struct WebchatBlocker {
    indicators: CallIndicatorState,
    local_dial_at_us: Option<u64>,
    block_until_us: Option<u64>,
}

impl WebchatBlocker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The HF requested a locally-originated call via `ATD`/`AT+BLDN` —
    /// waives the blocker for any call that follows within the waiver
    /// window, since that one *is* a genuine local dial.
    pub fn note_local_dial_request(&mut self, now_us: u64) {
        self.local_dial_at_us = Some(now_us);
    }

    pub fn note_callsetup(&mut self, value: CallSetupIndicator, now_us: u64) {
        self.indicators.set_callsetup(value, now_us);
    }

    /// Evaluate whether the in-progress transition just observed should
    /// start a block window, and record it if so.
    pub fn note_call_in_progress(&mut self, now_us: u64) {
        self.indicators.set_call(bthost_types::hfp::CallIndicator::InProgress, now_us);

        let recent_outgoing_dial = self
            .indicators
            .callsetup
            .map(|(v, ts)| {
                matches!(v, CallSetupIndicator::Outgoing | CallSetupIndicator::OutgoingAlerting)
                    && now_us.saturating_sub(ts) < WEBCHAT_DIAL_GAP_US
            })
            .unwrap_or(false);

        let waived = self
            .local_dial_at_us
            .map(|ts| now_us.saturating_sub(ts) < WEBCHAT_LOCAL_DIAL_WAIVER_US)
            .unwrap_or(false);

        if recent_outgoing_dial && !waived {
            self.block_until_us = Some(now_us + WEBCHAT_BLOCK_DURATION_US);
        }
    }

    pub fn should_block_audio_req(&self, now_us: u64) -> bool {
        self.block_until_us.map(|until| now_us < until).unwrap_or(false)
    }
}
