//! Profile identifiers.

use serde::{Deserialize, Serialize};

/// Every profile the service can host. Used both to key the instance table
/// and as the "domain" component of an IPC opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfileId {
    A2dpSink,
    A2dpSource,
    HfpAg,
    HfpHf,
    Pan,
    Hid,
    LeaClient,
    LeaServer,
    Gattc,
    Gatts,
    Advertiser,
    Scanner,
    Spp,
}

impl ProfileId {
    pub const ALL: &'static [ProfileId] = &[
        ProfileId::A2dpSink,
        ProfileId::A2dpSource,
        ProfileId::HfpAg,
        ProfileId::HfpHf,
        ProfileId::Pan,
        ProfileId::Hid,
        ProfileId::LeaClient,
        ProfileId::LeaServer,
        ProfileId::Gattc,
        ProfileId::Gatts,
        ProfileId::Advertiser,
        ProfileId::Scanner,
        ProfileId::Spp,
    ];

    /// Stable small integer, used as the high byte of an IPC opcode.
    pub fn domain_byte(self) -> u8 {
        match self {
            ProfileId::A2dpSink => 1,
            ProfileId::A2dpSource => 2,
            ProfileId::HfpAg => 3,
            ProfileId::HfpHf => 4,
            ProfileId::Pan => 5,
            ProfileId::Hid => 6,
            ProfileId::LeaClient => 7,
            ProfileId::LeaServer => 8,
            ProfileId::Gattc => 9,
            ProfileId::Gatts => 10,
            ProfileId::Advertiser => 11,
            ProfileId::Scanner => 12,
            ProfileId::Spp => 13,
        }
    }
}
