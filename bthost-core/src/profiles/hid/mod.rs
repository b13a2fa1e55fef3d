pub mod service;

pub use service::{HidService, HidState};
