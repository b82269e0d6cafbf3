//! Utility modules shared by the analyzer and sniff implementations.

pub mod allowance;

#[doc(inline)]
pub use allowance::{AllowCheck, Allowances};
