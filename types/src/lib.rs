//! Fundamental types for the GIVpower ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! holder addresses, timestamps, rounds and the 18-decimal amount units.

pub mod address;
pub mod amount;
pub mod error;
pub mod time;

pub use address::HolderAddress;
pub use amount::{format_ether, parse_ether, DECIMALS, SCALE};
pub use error::TypesError;
pub use time::{Round, Timestamp, DAY_SECS};
