//! Stack Abstraction Layer: the boundary between a profile's state machine
//! and the underlying Bluetooth stack it drives. Profiles never call the
//! stack directly — they go through this trait, so tests can swap in
//! `MockStack` and script the stack's responses instead of needing a real
//! controller.

use bthost_types::addr::BdAddr;
use bthost_types::hci::HciVscCommand;

use crate::error::BtResult;

pub trait Stack: Send {
    fn connect(&mut self, addr: BdAddr) -> BtResult<()>;
    fn disconnect(&mut self, addr: BdAddr) -> BtResult<()>;
    fn send_vsc(&mut self, cmd: &HciVscCommand) -> BtResult<()>;
}

/// Records every call made against it, for assertion in profile-SM tests.
#[derive(Default)]
pub struct MockStack {
    pub connect_calls: Vec<BdAddr>,
    pub disconnect_calls: Vec<BdAddr>,
    pub vsc_calls: Vec<HciVscCommand>,
    pub fail_connect: bool,
}

impl MockStack {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stack for MockStack {
    fn connect(&mut self, addr: BdAddr) -> BtResult<()> {
        self.connect_calls.push(addr);
        if self.fail_connect {
            return Err(crate::error::BtError::Stack("mock connect failure".into()));
        }
        Ok(())
    }

    fn disconnect(&mut self, addr: BdAddr) -> BtResult<()> {
        self.disconnect_calls.push(addr);
        Ok(())
    }

    fn send_vsc(&mut self, cmd: &HciVscCommand) -> BtResult<()> {
        self.vsc_calls.push(cmd.clone());
        Ok(())
    }
}
