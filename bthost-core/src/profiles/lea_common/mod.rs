pub mod ase;

pub use ase::{AseCtx, AseState};
