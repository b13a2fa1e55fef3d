//! Per-profile state machines and services, one submodule per Bluetooth
//! profile the host can run, plus `lea_common` which the two LE Audio
//! submodules share.

pub mod a2dp;
pub mod advertiser;
pub mod gattc;
pub mod gatts;
pub mod hfp_ag;
pub mod hfp_hf;
pub mod hid;
pub mod lea_client;
pub mod lea_common;
pub mod lea_server;
pub mod pan;
pub mod scanner;
pub mod spp;
