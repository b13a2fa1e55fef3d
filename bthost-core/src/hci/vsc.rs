//! Vendor-specific HCI command (VSC) builders for the offload/bandwidth
//! handshakes each profile state machine drives.

use bthost_types::hci::{HciVscCommand, VscKind};

/// Vendor OGF shared by every command this module builds.
const OGF_VENDOR: u8 = 0x3f;

mod ocf {
    pub const A2DP_OFFLOAD_START: u16 = 0x01c0;
    pub const A2DP_OFFLOAD_STOP: u16 = 0x01c1;
    pub const HFP_OFFLOAD_START: u16 = 0x01c2;
    pub const HFP_OFFLOAD_STOP: u16 = 0x01c3;
    pub const LEA_OFFLOAD_START: u16 = 0x01c4;
    pub const LEA_OFFLOAD_STOP: u16 = 0x01c5;
    pub const ACL_BANDWIDTH_SET: u16 = 0x01d0;
    pub const ACL_BANDWIDTH_CLEAR: u16 = 0x01d1;
    pub const LE_DLF_ENABLE: u16 = 0x01e0;
    pub const LE_DLF_DISABLE: u16 = 0x01e1;
}

fn build(ocf: u16, kind: VscKind, params: Vec<u8>) -> (HciVscCommand, VscKind) {
    (HciVscCommand::new(OGF_VENDOR, ocf, params), kind)
}

/// `connection_handle` little-endian, `codec_type` byte, `max_latency` LE16.
pub fn a2dp_offload_start(connection_handle: u16, codec_type: u8, max_latency_ms: u16) -> (HciVscCommand, VscKind) {
    let mut params = Vec::with_capacity(5);
    params.extend_from_slice(&connection_handle.to_le_bytes());
    params.push(codec_type);
    params.extend_from_slice(&max_latency_ms.to_le_bytes());
    build(ocf::A2DP_OFFLOAD_START, VscKind::A2dpOffloadStart, params)
}

pub fn a2dp_offload_stop(connection_handle: u16) -> (HciVscCommand, VscKind) {
    build(ocf::A2DP_OFFLOAD_STOP, VscKind::A2dpOffloadStop, connection_handle.to_le_bytes().to_vec())
}

pub fn hfp_offload_start(sco_handle: u16, wbs: bool) -> (HciVscCommand, VscKind) {
    let mut params = sco_handle.to_le_bytes().to_vec();
    params.push(wbs as u8);
    build(ocf::HFP_OFFLOAD_START, VscKind::HfpOffloadStart, params)
}

pub fn hfp_offload_stop(sco_handle: u16) -> (HciVscCommand, VscKind) {
    build(ocf::HFP_OFFLOAD_STOP, VscKind::HfpOffloadStop, sco_handle.to_le_bytes().to_vec())
}

pub fn lea_offload_start(cis_handle: u16, codec_type: u8) -> (HciVscCommand, VscKind) {
    let mut params = cis_handle.to_le_bytes().to_vec();
    params.push(codec_type);
    build(ocf::LEA_OFFLOAD_START, VscKind::LeaOffloadStart, params)
}

pub fn lea_offload_stop(cis_handle: u16) -> (HciVscCommand, VscKind) {
    build(ocf::LEA_OFFLOAD_STOP, VscKind::LeaOffloadStop, cis_handle.to_le_bytes().to_vec())
}

/// Reserve controller bandwidth ahead of an offloaded stream start, so the
/// scheduler won't starve it once the offload path is live.
pub fn acl_bandwidth_set(connection_handle: u16, bandwidth_kbps: u32) -> (HciVscCommand, VscKind) {
    let mut params = connection_handle.to_le_bytes().to_vec();
    params.extend_from_slice(&bandwidth_kbps.to_le_bytes());
    build(ocf::ACL_BANDWIDTH_SET, VscKind::AclBandwidthSet, params)
}

pub fn acl_bandwidth_clear(connection_handle: u16) -> (HciVscCommand, VscKind) {
    build(ocf::ACL_BANDWIDTH_CLEAR, VscKind::AclBandwidthClear, connection_handle.to_le_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a2dp_offload_start_lays_out_connection_handle_then_codec_then_latency() {
        let (cmd, kind) = a2dp_offload_start(0x0042, 2, 40);
        assert_eq!(kind, VscKind::A2dpOffloadStart);
        assert_eq!(cmd.ogf, OGF_VENDOR);
        assert_eq!(cmd.ocf, ocf::A2DP_OFFLOAD_START);
        assert_eq!(cmd.params, vec![0x42, 0x00, 2, 40, 0]);
    }

    #[test]
    fn hfp_offload_start_encodes_wbs_flag() {
        let (cmd, _) = hfp_offload_start(0x0010, true);
        assert_eq!(cmd.params, vec![0x10, 0x00, 1]);
    }
}
