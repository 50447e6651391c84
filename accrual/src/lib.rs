//! Reward accrual: the proportional-stake reward distributor.
//!
//! Rewards stream at `reward_rate` raw units per second until `period_finish`
//! and are shared among holders in proportion to their balance. A global
//! accumulator (`reward_per_token_stored`, scaled by `SCALE`) records how much
//! one whole unit of balance has earned since genesis; each holder remembers
//! the accumulator value it was last settled at.
//!
//! `earned(h) = balance(h) × (reward_per_token − paid(h)) / SCALE + rewards(h)`
//!
//! This crate handles:
//! - Reward-per-token and earned computation
//! - Settlement ahead of every balance change (plan, then commit)
//! - Balance/supply storage shared with the power ledger
//! - Reward funding (`notify_reward_amount`) and claims (`get_reward`)
//! - Unipool snapshots for upgrade compatibility

pub mod distributor;
pub mod engine;
pub mod error;
pub mod math;
pub mod snapshot;
pub mod state;

pub use distributor::RewardDistributor;
pub use engine::{BalanceChange, RewardAccrual, RewardSnapshot, Settlement};
pub use error::AccrualError;
pub use snapshot::UnipoolSnapshot;
pub use state::{GlobalRewardState, HolderRewardState};
