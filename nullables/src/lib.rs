//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the ledger (clock, storage, the wrapped
//! token, the reward distributor) is abstracted behind a trait. This crate
//! provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests and simulations.

pub mod clock;
pub mod distributor;
pub mod store;
pub mod token;

pub use clock::NullClock;
pub use distributor::NullDistributor;
pub use store::NullStore;
pub use token::NullToken;
