//! Code grammar for the pharmacy inventory.
//!
//! Handles:
//! - NDC normalization (digits only, separators stripped)
//! - Lot codes (drawer letter plus optional Left/Right position)
//! - Free-text dosage strings ("5mg", "2.5 mL", "10mg/5ml")
//! - Composite QR codes (`{lot}-{MMDDYY}-{MED}-{dose}[-{seq}]`)
//!
//! Everything here is pure and total: malformed input degrades to a safe
//! default instead of returning an error.

mod dosage;
mod lot;
mod ndc;
mod qr;

pub use dosage::*;
pub use lot::*;
pub use ndc::*;
pub use qr::*;
