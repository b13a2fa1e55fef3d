//! HID host profile service: per-device connection tracking plus a small
//! report-forwarding path (control and interrupt channel reports are
//! treated alike here — this side doesn't distinguish HIDP PDU types
//! beyond connect/disconnect/report).

use std::collections::HashMap;

use bthost_types::addr::BdAddr;

use crate::error::{BtError, BtResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HidState {
    Idle,
    Connecting,
    Connected,
}

struct HidDevice {
    state: HidState,
    last_report: Option<Vec<u8>>,
}

pub struct HidService {
    devices: HashMap<BdAddr, HidDevice>,
}

impl Default for HidService {
    fn default() -> Self {
        Self { devices: HashMap::new() }
    }
}

impl HidService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, addr: BdAddr) -> BtResult<()> {
        if self.devices.contains_key(&addr) {
            return Err(BtError::Busy);
        }
        self.devices.insert(addr, HidDevice { state: HidState::Connecting, last_report: None });
        Ok(())
    }

    pub fn mark_connected(&mut self, addr: BdAddr) -> BtResult<()> {
        let dev = self.devices.get_mut(&addr).ok_or(BtError::NotFound)?;
        dev.state = HidState::Connected;
        Ok(())
    }

    pub fn on_report(&mut self, addr: BdAddr, report: Vec<u8>) -> BtResult<()> {
        let dev = self.devices.get_mut(&addr).ok_or(BtError::NotFound)?;
        if dev.state != HidState::Connected {
            return Err(BtError::NotEnabled);
        }
        dev.last_report = Some(report);
        Ok(())
    }

    pub fn last_report(&self, addr: BdAddr) -> Option<&[u8]> {
        self.devices.get(&addr).and_then(|d| d.last_report.as_deref())
    }

    pub fn disconnect(&mut self, addr: BdAddr) {
        self.devices.remove(&addr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_before_connected_is_rejected() {
        let mut svc = HidService::new();
        let addr = BdAddr::new([1; 6]);
        svc.connect(addr).unwrap();
        assert!(matches!(svc.on_report(addr, vec![1]), Err(BtError::NotEnabled)));
    }

    #[test]
    fn report_after_connected_is_stored() {
        let mut svc = HidService::new();
        let addr = BdAddr::new([2; 6]);
        svc.connect(addr).unwrap();
        svc.mark_connected(addr).unwrap();
        svc.on_report(addr, vec![1, 2, 3]).unwrap();
        assert_eq!(svc.last_report(addr), Some(&[1, 2, 3][..]));
    }
}
