//! Serial port profile service: one RFCOMM-like byte stream per connected
//! peer, buffered in memory until the caller drains it.

use std::collections::HashMap;

use bthost_types::addr::BdAddr;

use crate::error::{BtError, BtResult};

#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub enum SppState {
    #[default]
    Idle,
    Connecting,
    Connected,
}

#[derive(Default)]
struct SppLink {
    state: SppState,
    rx_buf: Vec<u8>,
}

#[derive(Default)]
pub struct SppService {
    links: HashMap<BdAddr, SppLink>,
}

impl SppService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, addr: BdAddr) {
        self.links.entry(addr).or_default().state = SppState::Connecting;
    }

    pub fn mark_connected(&mut self, addr: BdAddr) -> BtResult<()> {
        self.links.get_mut(&addr).ok_or(BtError::NotFound)?.state = SppState::Connected;
        Ok(())
    }

    pub fn disconnect(&mut self, addr: BdAddr) {
        self.links.remove(&addr);
    }

    pub fn state_of(&self, addr: BdAddr) -> SppState {
        self.links.get(&addr).map(|l| l.state).unwrap_or(SppState::Idle)
    }

    pub fn on_data(&mut self, addr: BdAddr, bytes: &[u8]) -> BtResult<()> {
        let link = self.links.get_mut(&addr).ok_or(BtError::NotFound)?;
        if link.state != SppState::Connected {
            return Err(BtError::NotEnabled);
        }
        link.rx_buf.extend_from_slice(bytes);
        Ok(())
    }

    pub fn drain(&mut self, addr: BdAddr) -> Vec<u8> {
        self.links.get_mut(&addr).map(|l| std::mem::take(&mut l.rx_buf)).unwrap_or_default()
    }
}
