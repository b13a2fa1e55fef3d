//! LE scanner profile service: a bounded recent-results cache keyed by
//! peer address, overwritten in place as repeat advertisements arrive
//! rather than growing without bound for the lifetime of a scan session.

use std::collections::HashMap;

use bthost_types::addr::BdAddr;

pub struct ScanResult {
    pub rssi: i8,
    pub adv_data: Vec<u8>,
}

#[derive(Default)]
pub struct ScannerService {
    scanning: bool,
    results: HashMap<BdAddr, ScanResult>,
}

impl ScannerService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_scan(&mut self) {
        self.scanning = true;
        self.results.clear();
    }

    pub fn stop_scan(&mut self) {
        self.scanning = false;
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub fn on_advertisement(&mut self, addr: BdAddr, rssi: i8, adv_data: Vec<u8>) {
        if !self.scanning {
            return;
        }
        self.results.insert(addr, ScanResult { rssi, adv_data });
    }

    pub fn result_for(&self, addr: BdAddr) -> Option<&ScanResult> {
        self.results.get(&addr)
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advertisements_are_ignored_while_not_scanning() {
        let mut svc = ScannerService::new();
        svc.on_advertisement(BdAddr::new([1; 6]), -50, vec![]);
        assert_eq!(svc.result_count(), 0);
    }

    #[test]
    fn repeat_advertisement_overwrites_rather_than_grows() {
        let mut svc = ScannerService::new();
        svc.start_scan();
        let addr = BdAddr::new([1; 6]);
        svc.on_advertisement(addr, -50, vec![1]);
        svc.on_advertisement(addr, -40, vec![2]);
        assert_eq!(svc.result_count(), 1);
        assert_eq!(svc.result_for(addr).unwrap().rssi, -40);
    }

    #[test]
    fn stop_scan_stops_ingesting_but_keeps_prior_results() {
        let mut svc = ScannerService::new();
        svc.start_scan();
        svc.on_advertisement(BdAddr::new([1; 6]), -50, vec![]);
        svc.stop_scan();
        svc.on_advertisement(BdAddr::new([2; 6]), -50, vec![]);
        assert_eq!(svc.result_count(), 1);
    }
}
