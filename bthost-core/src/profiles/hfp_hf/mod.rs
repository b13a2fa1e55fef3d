pub mod service;
pub mod state_machine;

pub use service::HfpHfService;
pub use state_machine::{HfpHfCtx, HfpHfState};
