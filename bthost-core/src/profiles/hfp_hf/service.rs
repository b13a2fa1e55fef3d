use std::collections::HashMap;

use bthost_types::addr::BdAddr;
use bthost_types::event::HfpEvent;

use crate::error::{BtError, BtResult};
use crate::hsm::StateMachine;
use crate::sal::Stack;

use super::state_machine::{HfpHfCtx, HfpHfState};

struct Device {
    sm: StateMachine<HfpHfState>,
    ctx: HfpHfCtx,
}

pub struct HfpHfService {
    devices: HashMap<BdAddr, Device>,
    stack_factory: Box<dyn Fn() -> Box<dyn Stack> + Send>,
}

impl HfpHfService {
    pub fn new(stack_factory: Box<dyn Fn() -> Box<dyn Stack> + Send>) -> Self {
        Self { devices: HashMap::new(), stack_factory }
    }

    pub fn connect(&mut self, addr: BdAddr) -> BtResult<()> {
        if self.devices.contains_key(&addr) {
            return Err(BtError::Busy);
        }
        let mut ctx = HfpHfCtx::new(addr, (self.stack_factory)());
        let sm = StateMachine::new(HfpHfState::Idle, &mut ctx);
        self.devices.insert(addr, Device { sm, ctx });
        self.dispatch(addr, &HfpEvent::ConnectReq)
    }

    pub fn dispatch(&mut self, addr: BdAddr, event: &HfpEvent) -> BtResult<()> {
        let device = self.devices.get_mut(&addr).ok_or(BtError::NotFound)?;
        device.sm.dispatch(&mut device.ctx, event);
        Ok(())
    }

    pub fn state_of(&self, addr: BdAddr) -> Option<&HfpHfState> {
        self.devices.get(&addr).map(|d| d.sm.current())
    }
}
