//! LE Audio server profile service: one ASE per connected client plus the
//! MCS/TBS/VMICS content services the client reads values from.

use std::collections::HashMap;

use bthost_types::addr::BdAddr;
use bthost_types::event::A2dpEvent;

use crate::error::{BtError, BtResult};
use crate::hsm::StateMachine;
use crate::profiles::lea_common::{AseCtx, AseState};

use super::content_services::{Mcs, Tbs, Vmics};

struct Client {
    sm: StateMachine<AseState>,
    ctx: AseCtx,
}

pub struct LeaServerService {
    clients: HashMap<BdAddr, Client>,
    next_ase_id: u8,
    pub mcs: Mcs,
    pub tbs: Tbs,
    pub vmics: Vmics,
}

impl Default for LeaServerService {
    fn default() -> Self {
        Self {
            clients: HashMap::new(),
            next_ase_id: 1,
            mcs: Mcs::default(),
            tbs: Tbs::default(),
            vmics: Vmics::default(),
        }
    }
}

impl LeaServerService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, addr: BdAddr) -> BtResult<()> {
        if self.clients.contains_key(&addr) {
            return Err(BtError::Busy);
        }
        let ase_id = self.next_ase_id;
        self.next_ase_id += 1;
        let mut ctx = AseCtx { ase_id };
        let sm = StateMachine::new(AseState::Idle, &mut ctx);
        self.clients.insert(addr, Client { sm, ctx });
        Ok(())
    }

    pub fn dispatch(&mut self, addr: BdAddr, event: &A2dpEvent) -> BtResult<()> {
        let client = self.clients.get_mut(&addr).ok_or(BtError::NotFound)?;
        client.sm.dispatch(&mut client.ctx, event);
        Ok(())
    }

    pub fn state_of(&self, addr: BdAddr) -> Option<AseState> {
        self.clients.get(&addr).map(|c| *c.sm.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::content_services::MediaState;

    #[test]
    fn accept_creates_ase_in_idle() {
        let mut svc = LeaServerService::new();
        let addr = BdAddr::new([1; 6]);
        svc.accept(addr).unwrap();
        assert_eq!(svc.state_of(addr), Some(AseState::Idle));
    }

    #[test]
    fn mcs_state_is_independent_of_per_client_ase_state() {
        let mut svc = LeaServerService::new();
        svc.mcs.set_state(MediaState::Playing);
        assert_eq!(svc.mcs.current(), MediaState::Playing);
    }
}
