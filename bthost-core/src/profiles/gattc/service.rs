//! GATT client profile service.
//!
//! Each client instance's remote list starts empty and gains an entry the
//! moment `create_connect` is called for a new peer, independent of whether
//! the connection ever completes — callers that want "connected peers only"
//! filter on `RemoteDevice::connected`.

use std::collections::HashMap;

use bthost_types::addr::BdAddr;
use bthost_types::packet::InstanceId;

use crate::error::{BtError, BtResult};

pub struct RemoteDevice {
    pub addr: BdAddr,
    pub connected: bool,
}

#[derive(Default)]
struct ClientInstance {
    remotes: HashMap<BdAddr, RemoteDevice>,
}

#[derive(Default)]
pub struct GattClientService {
    instances: HashMap<InstanceId, ClientInstance>,
}

impl GattClientService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, instance: InstanceId) {
        self.instances.entry(instance).or_default();
    }

    pub fn create_connect(&mut self, instance: InstanceId, addr: BdAddr) -> BtResult<()> {
        let inst = self.instances.get_mut(&instance).ok_or(BtError::NotFound)?;
        inst.remotes.entry(addr).or_insert(RemoteDevice { addr, connected: false });
        Ok(())
    }

    pub fn mark_connected(&mut self, instance: InstanceId, addr: BdAddr) -> BtResult<()> {
        let inst = self.instances.get_mut(&instance).ok_or(BtError::NotFound)?;
        let remote = inst.remotes.get_mut(&addr).ok_or(BtError::NotFound)?;
        remote.connected = true;
        Ok(())
    }

    pub fn remote_list(&self, instance: InstanceId) -> BtResult<Vec<&RemoteDevice>> {
        let inst = self.instances.get(&instance).ok_or(BtError::NotFound)?;
        Ok(inst.remotes.values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_connect_adds_to_remote_list_before_connection_completes() {
        let mut svc = GattClientService::new();
        let instance = InstanceId(1);
        svc.register(instance);
        let addr = BdAddr::new([1; 6]);
        svc.create_connect(instance, addr).unwrap();

        let remotes = svc.remote_list(instance).unwrap();
        assert_eq!(remotes.len(), 1);
        assert!(!remotes[0].connected);
    }

    #[test]
    fn remote_list_on_unregistered_instance_is_not_found() {
        let svc = GattClientService::new();
        assert!(matches!(svc.remote_list(InstanceId(42)), Err(BtError::NotFound)));
    }
}
