//! HFP-AG profile service: per-device map and client fan-out, mirroring
//! `a2dp::service` but routing through the HFP-AG state machine.

use std::collections::HashMap;

use bthost_types::addr::BdAddr;
use bthost_types::event::HfpEvent;
use bthost_types::packet::EventBody;

use crate::callbacks::{CallbackRegistry, SubscriberId};
use crate::error::{BtError, BtResult};
use crate::hsm::StateMachine;
use crate::sal::Stack;

use super::state_machine::{HfpAgCtx, HfpAgState};

type EventCallback = std::sync::Arc<dyn Fn(BdAddr, &EventBody) + Send + Sync>;

struct Device {
    sm: StateMachine<HfpAgState>,
    ctx: HfpAgCtx,
}

pub struct HfpAgService {
    devices: HashMap<BdAddr, Device>,
    subscribers: CallbackRegistry<EventCallback>,
    stack_factory: Box<dyn Fn() -> Box<dyn Stack> + Send>,
}

impl HfpAgService {
    pub fn new(stack_factory: Box<dyn Fn() -> Box<dyn Stack> + Send>) -> Self {
        Self { devices: HashMap::new(), subscribers: CallbackRegistry::new(), stack_factory }
    }

    pub fn subscribe(&self, callback: EventCallback) -> BtResult<SubscriberId> {
        self.subscribers.register(callback)
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers.unregister(id);
    }

    pub fn connect(&mut self, addr: BdAddr) -> BtResult<()> {
        if self.devices.contains_key(&addr) {
            return Err(BtError::Busy);
        }
        let mut ctx = HfpAgCtx::new(addr, (self.stack_factory)());
        let sm = StateMachine::new(HfpAgState::Idle, &mut ctx);
        self.devices.insert(addr, Device { sm, ctx });
        self.dispatch(addr, 0, &HfpEvent::ConnectReq)
    }

    /// `now_us` is the caller's monotonic clock reading, threaded into the
    /// device context before dispatch so the web-chat blocker can time
    /// itself against real elapsed time.
    pub fn dispatch(&mut self, addr: BdAddr, now_us: u64, event: &HfpEvent) -> BtResult<()> {
        let transitioned = {
            let device = self.devices.get_mut(&addr).ok_or(BtError::NotFound)?;
            device.ctx.now_us = now_us;
            device.sm.dispatch(&mut device.ctx, event)
        };

        if transitioned {
            self.fan_out(addr, event);
        }
        let device = self.devices.get(&addr).ok_or(BtError::NotFound)?;
        if matches!(device.sm.current(), HfpAgState::Idle) && device.sm.previous().is_some() {
            if matches!(event, HfpEvent::Disconnected | HfpEvent::DisconnectReq) {
                self.devices.remove(&addr);
            }
        }
        Ok(())
    }

    fn fan_out(&self, addr: BdAddr, event: &HfpEvent) {
        let body = match event {
            HfpEvent::Connected => Some(EventBody::Connected { addr }),
            HfpEvent::Disconnected => Some(EventBody::Disconnected { addr }),
            _ => None,
        };
        if let Some(body) = body {
            self.subscribers.for_each(|_, cb| cb(addr, &body));
        }
    }

    pub fn state_of(&self, addr: BdAddr) -> Option<&HfpAgState> {
        self.devices.get(&addr).map(|d| d.sm.current())
    }
}
