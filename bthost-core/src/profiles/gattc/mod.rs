pub mod service;

pub use service::{GattClientService, RemoteDevice};
