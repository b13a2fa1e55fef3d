//! LE Audio client profile service: one ASE state machine per connected
//! peer, with the content services (CCP/MCP/VMICP) bound to it on connect.

use std::collections::HashMap;

use bthost_types::addr::BdAddr;
use bthost_types::event::A2dpEvent;

use crate::error::{BtError, BtResult};
use crate::hsm::StateMachine;
use crate::profiles::lea_common::{AseCtx, AseState};

use super::content_services::{Ccp, Mcp, Vmicp};

struct Peer {
    sm: StateMachine<AseState>,
    ctx: AseCtx,
    pub ccp: Ccp,
    pub mcp: Mcp,
    pub vmicp: Vmicp,
}

pub struct LeaClientService {
    peers: HashMap<BdAddr, Peer>,
    next_ase_id: u8,
}

impl Default for LeaClientService {
    fn default() -> Self {
        Self { peers: HashMap::new(), next_ase_id: 1 }
    }
}

impl LeaClientService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, addr: BdAddr) -> BtResult<()> {
        if self.peers.contains_key(&addr) {
            return Err(BtError::Busy);
        }
        let ase_id = self.next_ase_id;
        self.next_ase_id += 1;
        let mut ctx = AseCtx { ase_id };
        let sm = StateMachine::new(AseState::Idle, &mut ctx);
        self.peers.insert(
            addr,
            Peer {
                sm,
                ctx,
                ccp: Ccp { bearer_ase: Some(ase_id) },
                mcp: Mcp { media_ase: Some(ase_id), playing: false },
                vmicp: Vmicp::default(),
            },
        );
        Ok(())
    }

    pub fn dispatch(&mut self, addr: BdAddr, event: &A2dpEvent) -> BtResult<()> {
        let peer = self.peers.get_mut(&addr).ok_or(BtError::NotFound)?;
        peer.sm.dispatch(&mut peer.ctx, event);
        Ok(())
    }

    pub fn mcp_mut(&mut self, addr: BdAddr) -> BtResult<&mut Mcp> {
        Ok(&mut self.peers.get_mut(&addr).ok_or(BtError::NotFound)?.mcp)
    }

    pub fn state_of(&self, addr: BdAddr) -> Option<AseState> {
        self.peers.get(&addr).map(|p| *p.sm.current())
    }
}
