pub mod service;

pub use service::{ScanResult, ScannerService};
