pub mod service;

pub use service::{AdvertiserService, AdvertisingSet};
