//! Export functionality for display boards and daily rosters.

mod board;
mod roster;

pub use board::*;
pub use roster::*;
