//! AT-command company-ID table, supplemented from `original_source/`: the
//! AG side needs to recognize a handful of vendor AT commands (battery
//! level reports, codec negotiation hints) by their Bluetooth SIG company
//! identifier prefix even though it doesn't implement vendor-specific
//! behavior for most of them.

/// A recognized `AT+XAPL`/`AT+IPHONEACCEV`-style vendor prefix and the SIG
/// company id it's associated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorAtCommand {
    pub company_id: u16,
    pub prefix: &'static str,
}

/// Company IDs per the Bluetooth SIG assigned-numbers list, limited to the
/// vendors whose AT extensions this AG recognizes.
pub const KNOWN_VENDOR_COMMANDS: &[VendorAtCommand] = &[
    VendorAtCommand { company_id: 0x004C, prefix: "+XAPL" },
    VendorAtCommand { company_id: 0x004C, prefix: "+IPHONEACCEV" },
    VendorAtCommand { company_id: 0x000F, prefix: "+XEVENT" },
];

pub fn lookup(prefix: &str) -> Option<VendorAtCommand> {
    KNOWN_VENDOR_COMMANDS.iter().copied().find(|c| c.prefix == prefix)
}
