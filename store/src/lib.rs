//! Abstract storage traits for the GIVpower ledger.
//!
//! Storage backends implement [`PowerStore`]; the ledger crates depend only on
//! the trait and serialize their own records.

pub mod error;
pub mod power;

pub use error::StoreError;
pub use power::PowerStore;
