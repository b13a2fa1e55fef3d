//! Server-side LE Audio content services: MCS, TBS and VMICS. Each exposes
//! the GATT characteristic values a connected client reads/subscribes to;
//! state changes are driven locally (by the media/telephony app this
//! service fronts) rather than by remote requests.

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MediaState {
    #[default]
    Inactive,
    Playing,
    Paused,
}

#[derive(Default)]
pub struct Mcs {
    pub state: MediaState,
}

impl Mcs {
    pub fn set_state(&mut self, state: MediaState) {
        self.state = state;
    }

    pub fn current(&self) -> MediaState {
        self.state
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Incoming,
    Active,
}

#[derive(Default)]
pub struct Tbs {
    pub call_state: Option<CallState>,
}

impl Tbs {
    pub fn set_call_state(&mut self, state: CallState) {
        self.call_state = Some(state);
    }

    pub fn current(&self) -> CallState {
        self.call_state.unwrap_or(CallState::Idle)
    }
}

#[derive(Default)]
pub struct Vmics {
    pub volume: u8,
    pub muted: bool,
}

impl Vmics {
    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume;
    }
}
