pub mod service;

pub use service::{SppService, SppState};
