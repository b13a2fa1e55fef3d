pub mod at_table;
pub mod service;
pub mod state_machine;
pub mod webchat;

pub use service::HfpAgService;
pub use state_machine::{HfpAgCtx, HfpAgState};
