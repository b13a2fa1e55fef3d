//! Vendor-specific HCI command layouts.

use serde::{Deserialize, Serialize};

/// A raw, not-yet-sent vendor-specific HCI command, as handed to the
/// offload handshake by the profile requesting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HciVscCommand {
    pub ogf: u8,
    pub ocf: u16,
    pub params: Vec<u8>,
}

impl HciVscCommand {
    pub fn new(ogf: u8, ocf: u16, params: Vec<u8>) -> Self {
        Self { ogf, ocf, params }
    }

    /// Serialize as `{ogf:1, ocf:2 (LE), len:1, params}`, the layout every
    /// VSC builder writes into its caller-provided buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + self.params.len());
        buf.push(self.ogf);
        buf.extend_from_slice(&self.ocf.to_le_bytes());
        buf.push(self.params.len() as u8);
        buf.extend_from_slice(&self.params);
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }
        let ogf = bytes[0];
        let ocf = u16::from_le_bytes([bytes[1], bytes[2]]);
        let len = bytes[3] as usize;
        let params = bytes.get(4..4 + len)?.to_vec();
        Some(Self { ogf, ocf, params })
    }
}

/// Result of sending a VSC down to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HciVscStatus {
    Success,
    Failure,
}

/// Which subsystem a VSC result demultiplexes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VscKind {
    A2dpOffloadStart,
    A2dpOffloadStop,
    HfpOffloadStart,
    HfpOffloadStop,
    LeaOffloadStart,
    LeaOffloadStop,
    AclBandwidthSet,
    AclBandwidthClear,
    LeDlfEnable,
    LeDlfDisable,
}

/// Maximum DLF link records the connection manager tracks concurrently.
pub const MAX_DLF_LINKS: usize = 8;
/// DLF enable acknowledgement timeout: 1600 * 0.625ms slots ~= 1 second.
pub const DLF_TIMEOUT_MS: u64 = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vsc_command_roundtrips_bytes() {
        let cmd = HciVscCommand::new(0x3f, 0x01a2, vec![1, 2, 3]);
        let bytes = cmd.to_bytes();
        assert_eq!(HciVscCommand::from_bytes(&bytes), Some(cmd));
    }

    #[test]
    fn from_bytes_rejects_truncated_buffer() {
        assert_eq!(HciVscCommand::from_bytes(&[0x3f, 0x01]), None);
    }
}
