//! IPC message dispatcher between the client library and the host service:
//! length-delimited framing, the server's per-domain request dispatch, and
//! the blocking client that speaks it.

pub mod client;
pub mod framing;
pub mod server;

pub use client::BtClient;
pub use server::{IpcServer, Services};
