//! Domain models for the pharmacy inventory core.

mod clinic;
mod drug;
mod search;

pub use clinic::*;
pub use drug::*;
pub use search::*;
