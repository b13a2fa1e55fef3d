pub mod service;

pub use service::{PanService, PanState};
