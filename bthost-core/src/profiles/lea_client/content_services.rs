//! Thin per-content-service routers over the shared ASE state machine
//! (supplemented from `original_source/`'s LE Audio content service list:
//! CCP, MCP and VMICP on the client side).
//!
//! None of these own stream state themselves — they validate the
//! operation is meaningful for their characteristic set and then forward
//! it to the ASE the caller names.

use crate::error::{BtError, BtResult};

/// Call Control Profile client: accept/terminate/hold operations against a
/// remote Telephone Bearer Service.
#[derive(Default)]
pub struct Ccp {
    pub bearer_ase: Option<u8>,
}

impl Ccp {
    pub fn accept_call(&self) -> BtResult<u8> {
        self.bearer_ase.ok_or(BtError::NotFound)
    }

    pub fn terminate_call(&self) -> BtResult<u8> {
        self.bearer_ase.ok_or(BtError::NotFound)
    }
}

/// Media Control Profile client: play/pause/seek against a remote Media
/// Control Service.
#[derive(Default)]
pub struct Mcp {
    pub media_ase: Option<u8>,
    pub playing: bool,
}

impl Mcp {
    pub fn play(&mut self) -> BtResult<()> {
        self.media_ase.ok_or(BtError::NotFound)?;
        self.playing = true;
        Ok(())
    }

    pub fn pause(&mut self) -> BtResult<()> {
        self.media_ase.ok_or(BtError::NotFound)?;
        self.playing = false;
        Ok(())
    }
}

/// Volume/Microphone Control Profile client.
#[derive(Default)]
pub struct Vmicp {
    pub volume: u8,
    pub muted: bool,
}

impl Vmicp {
    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume;
    }

    pub fn set_mute(&mut self, muted: bool) {
        self.muted = muted;
    }
}
