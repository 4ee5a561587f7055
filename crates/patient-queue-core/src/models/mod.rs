//! Domain models for the patient queue.

mod department;
mod patient;
mod registration;
mod stats;

pub use department::*;
pub use patient::*;
pub use registration::*;
pub use stats::*;
