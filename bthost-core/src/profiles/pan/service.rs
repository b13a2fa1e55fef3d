//! PAN (Personal Area Network) profile service: bridges a peer's Bluetooth
//! NAP/PANU connection to a host tap device. The local tap MAC is derived
//! from the adapter's Bluetooth address with its octets reversed, since the
//! tap driver expects network byte order.

use std::collections::HashMap;

use bthost_types::addr::BdAddr;

use crate::error::{BtError, BtResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanState {
    Idle,
    Connecting,
    Connected,
}

struct PanLink {
    state: PanState,
}

pub struct PanService {
    local_addr: BdAddr,
    links: HashMap<BdAddr, PanLink>,
}

impl PanService {
    pub fn new(local_addr: BdAddr) -> Self {
        Self { local_addr, links: HashMap::new() }
    }

    /// The tap device MAC this service hands to the kernel when it brings
    /// the interface up.
    pub fn tap_device_mac(&self) -> [u8; 6] {
        self.local_addr.byte_swapped()
    }

    pub fn connect(&mut self, peer: BdAddr) -> BtResult<()> {
        if self.links.contains_key(&peer) {
            return Err(BtError::Busy);
        }
        self.links.insert(peer, PanLink { state: PanState::Connecting });
        Ok(())
    }

    pub fn mark_connected(&mut self, peer: BdAddr) -> BtResult<()> {
        let link = self.links.get_mut(&peer).ok_or(BtError::NotFound)?;
        link.state = PanState::Connected;
        Ok(())
    }

    pub fn disconnect(&mut self, peer: BdAddr) {
        self.links.remove(&peer);
    }

    pub fn state_of(&self, peer: BdAddr) -> Option<PanState> {
        self.links.get(&peer).map(|l| l.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tap_mac_is_byte_reversed_local_address() {
        let svc = PanService::new(BdAddr::new([1, 2, 3, 4, 5, 6]));
        assert_eq!(svc.tap_device_mac(), [6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn connect_then_mark_connected_updates_state() {
        let mut svc = PanService::new(BdAddr::ANY);
        let peer = BdAddr::new([9; 6]);
        svc.connect(peer).unwrap();
        assert_eq!(svc.state_of(peer), Some(PanState::Connecting));
        svc.mark_connected(peer).unwrap();
        assert_eq!(svc.state_of(peer), Some(PanState::Connected));
    }
}
