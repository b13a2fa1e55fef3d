pub mod service;
pub mod state_machine;

pub use service::A2dpService;
pub use state_machine::{A2dpCtx, A2dpState};
