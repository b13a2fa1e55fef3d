pub mod service;

pub use service::{CharacteristicValue, GattServerService};
