//! Per-client instance records and app-id allocation.
//!
//! One `Instance` exists per client connection that has completed
//! `Register`; it owns the set of app ids that client has been handed (one
//! per GATT server, advertising set, etc. it creates) and the subscriber
//! id it was given in each profile's callback registry.

use std::collections::{HashMap, HashSet};

use bthost_types::packet::{AppId, InstanceId};
use bthost_types::profile::ProfileId;

use crate::callbacks::SubscriberId;
use crate::error::{BtError, BtResult};

pub struct Instance {
    pub id: InstanceId,
    pub name: String,
    app_ids: HashSet<AppId>,
    subscriptions: HashMap<ProfileId, SubscriberId>,
}

impl Instance {
    fn new(id: InstanceId, name: String) -> Self {
        Self { id, name, app_ids: HashSet::new(), subscriptions: HashMap::new() }
    }

    pub fn owns_app(&self, app: AppId) -> bool {
        self.app_ids.contains(&app)
    }

    pub fn subscription(&self, profile: ProfileId) -> Option<SubscriberId> {
        self.subscriptions.get(&profile).copied()
    }
}

/// Allocates instance and app ids and owns the instance table.
#[derive(Default)]
pub struct InstanceManager {
    next_instance_id: u32,
    next_app_id: u32,
    instances: HashMap<InstanceId, Instance>,
}

impl InstanceManager {
    pub fn new() -> Self {
        Self { next_instance_id: 1, next_app_id: 1, instances: HashMap::new() }
    }

    pub fn register(&mut self, name: String) -> InstanceId {
        let id = InstanceId(self.next_instance_id);
        self.next_instance_id += 1;
        self.instances.insert(id, Instance::new(id, name));
        id
    }

    pub fn unregister(&mut self, id: InstanceId) {
        self.instances.remove(&id);
    }

    pub fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.instances.get_mut(&id)
    }

    pub fn allocate_app_id(&mut self, instance: InstanceId) -> BtResult<AppId> {
        let app = AppId(self.next_app_id);
        self.next_app_id += 1;
        let inst = self.instances.get_mut(&instance).ok_or(BtError::NotFound)?;
        inst.app_ids.insert(app);
        Ok(app)
    }

    pub fn record_subscription(&mut self, instance: InstanceId, profile: ProfileId, sub: SubscriberId) -> BtResult<()> {
        let inst = self.instances.get_mut(&instance).ok_or(BtError::NotFound)?;
        inst.subscriptions.insert(profile, sub);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
