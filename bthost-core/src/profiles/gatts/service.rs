//! GATT server profile service: registered services/characteristics per
//! app id, and the subscriber list for each characteristic's
//! notifications.

use std::collections::HashMap;

use bthost_types::addr::BdAddr;
use bthost_types::packet::AppId;

use crate::error::{BtError, BtResult};

pub struct CharacteristicValue {
    pub value: Vec<u8>,
    pub subscribers: Vec<BdAddr>,
}

#[derive(Default)]
pub struct GattServerService {
    characteristics: HashMap<(AppId, u16), CharacteristicValue>,
}

impl GattServerService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_characteristic(&mut self, app: AppId, handle: u16, initial: Vec<u8>) {
        self.characteristics.insert((app, handle), CharacteristicValue { value: initial, subscribers: Vec::new() });
    }

    pub fn write(&mut self, app: AppId, handle: u16, value: Vec<u8>) -> BtResult<()> {
        let c = self.characteristics.get_mut(&(app, handle)).ok_or(BtError::NotFound)?;
        c.value = value;
        Ok(())
    }

    pub fn subscribe(&mut self, app: AppId, handle: u16, addr: BdAddr) -> BtResult<()> {
        let c = self.characteristics.get_mut(&(app, handle)).ok_or(BtError::NotFound)?;
        if !c.subscribers.contains(&addr) {
            c.subscribers.push(addr);
        }
        Ok(())
    }

    pub fn read(&self, app: AppId, handle: u16) -> BtResult<&[u8]> {
        self.characteristics.get(&(app, handle)).map(|c| c.value.as_slice()).ok_or(BtError::NotFound)
    }

    pub fn subscribers(&self, app: AppId, handle: u16) -> BtResult<&[BdAddr]> {
        self.characteristics.get(&(app, handle)).map(|c| c.subscribers.as_slice()).ok_or(BtError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let mut svc = GattServerService::new();
        let app = AppId(1);
        svc.add_characteristic(app, 10, vec![0]);
        svc.write(app, 10, vec![1, 2, 3]).unwrap();
        assert_eq!(svc.read(app, 10).unwrap(), &[1, 2, 3]);
    }

    #[test]
    fn duplicate_subscription_is_not_double_counted() {
        let mut svc = GattServerService::new();
        let app = AppId(1);
        svc.add_characteristic(app, 10, vec![]);
        let addr = BdAddr::new([1; 6]);
        svc.subscribe(app, 10, addr).unwrap();
        svc.subscribe(app, 10, addr).unwrap();
        assert_eq!(svc.subscribers(app, 10).unwrap().len(), 1);
    }
}
