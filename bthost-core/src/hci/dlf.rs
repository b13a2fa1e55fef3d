//! Connection-manager side of the LE Dynamic Latency Filter (DLF) VSC,
//! exercised by every LE-capable profile on connection setup.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use bthost_types::addr::BdAddr;
use bthost_types::hci::{HciVscCommand, MAX_DLF_LINKS};

use crate::error::{BtError, BtResult};
use crate::hci::vsc;

struct DlfLink {
    enabled_at: Instant,
}

/// Tracks which LE links currently have DLF enabled, enforcing the
/// controller's concurrent-link cap.
#[derive(Default)]
pub struct DlfManager {
    links: HashMap<BdAddr, DlfLink>,
}

impl DlfManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the enable command for `addr`, or `BtError::Busy` once
    /// `MAX_DLF_LINKS` concurrent links are already enabled — the caller
    /// queues rather than enabling unconditionally.
    pub fn enable(&mut self, addr: BdAddr, cis_handle: u16) -> BtResult<HciVscCommand> {
        if !self.links.contains_key(&addr) && self.links.len() >= MAX_DLF_LINKS {
            return Err(BtError::Busy);
        }
        let (cmd, _) = vsc::lea_offload_start(cis_handle, 0);
        self.links.insert(addr, DlfLink { enabled_at: Instant::now() });
        Ok(cmd)
    }

    pub fn disable(&mut self, addr: BdAddr) {
        self.links.remove(&addr);
    }

    pub fn is_enabled(&self, addr: &BdAddr) -> bool {
        self.links.contains_key(addr)
    }

    pub fn active_count(&self) -> usize {
        self.links.len()
    }

    /// Links that have been enabled past the acknowledgement timeout
    /// without the controller confirming — the caller should treat these
    /// as failed and disable them.
    pub fn timed_out(&self, now: Instant, timeout: Duration) -> Vec<BdAddr> {
        self.links
            .iter()
            .filter(|(_, link)| now.duration_since(link.enabled_at) >= timeout)
            .map(|(addr, _)| *addr)
            .collect()
    }
}
