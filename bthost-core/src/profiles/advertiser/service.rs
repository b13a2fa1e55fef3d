//! LE advertiser profile service: a small set of advertising sets, each
//! owned by the app id that created it, enabled/disabled independently.

use std::collections::HashMap;

use bthost_types::packet::AppId;

use crate::error::{BtError, BtResult};

pub struct AdvertisingSet {
    pub owner: AppId,
    pub adv_data: Vec<u8>,
    pub enabled: bool,
}

#[derive(Default)]
pub struct AdvertiserService {
    sets: HashMap<u8, AdvertisingSet>,
    next_handle: u8,
}

impl AdvertiserService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_set(&mut self, owner: AppId, adv_data: Vec<u8>) -> u8 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.sets.insert(handle, AdvertisingSet { owner, adv_data, enabled: false });
        handle
    }

    pub fn enable(&mut self, handle: u8) -> BtResult<()> {
        self.sets.get_mut(&handle).ok_or(BtError::NotFound)?.enabled = true;
        Ok(())
    }

    pub fn disable(&mut self, handle: u8) -> BtResult<()> {
        self.sets.get_mut(&handle).ok_or(BtError::NotFound)?.enabled = false;
        Ok(())
    }

    pub fn remove_set(&mut self, handle: u8) {
        self.sets.remove(&handle);
    }

    pub fn is_enabled(&self, handle: u8) -> bool {
        self.sets.get(&handle).map(|s| s.enabled).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_set_starts_disabled() {
        let mut svc = AdvertiserService::new();
        let handle = svc.create_set(AppId(1), vec![0x02, 0x01, 0x06]);
        assert!(!svc.is_enabled(handle));
        svc.enable(handle).unwrap();
        assert!(svc.is_enabled(handle));
    }

    #[test]
    fn enabling_unknown_handle_is_not_found() {
        let mut svc = AdvertiserService::new();
        assert!(matches!(svc.enable(99), Err(BtError::NotFound)));
    }
}
