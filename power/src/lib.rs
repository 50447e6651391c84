//! GIVpower: a non-transferable ledger of wrapped tokens and lock bonuses.
//!
//! Holders wrap an underlying token one-for-one and may lock wrapped
//! principal for a number of fixed-length rounds. A lock immediately credits
//! a bonus so that the locked amount counts as
//! `calculate_power(amount, rounds) = amount × √(rounds + 1)`. The bonus is
//! removed again when the lock is released after its target round.
//!
//! Balances feed the reward accrual engine as stake, so locking boosts a
//! holder's share of streamed rewards.
//!
//! This crate handles:
//! - The round clock and the integer square-root power curve
//! - Lock book keyed by `(holder, until_round)` with a round index
//! - Wrap / unwrap / lock / batch unlock with settlement before every change
//! - Refusal of transfers and allowances
//! - Events, configuration and persistence through a `PowerStore`

pub mod config;
pub mod error;
pub mod event;
pub mod ledger;
pub mod lock;
pub mod math;
pub mod persist;
pub mod round;
pub mod token;

pub use config::{PowerConfig, TokenMetadata};
pub use error::{ErrorKind, PowerError};
pub use event::{EventBus, LedgerEvent};
pub use ledger::{LockReceipt, PowerLedger, UnlockReport, UnlockedLock};
pub use lock::{HolderLocks, LockBook, LockEntry};
pub use math::{calculate_power, isqrt, lock_bonus, SQRT_SCALE};
pub use round::RoundClock;
pub use token::UnderlyingToken;
