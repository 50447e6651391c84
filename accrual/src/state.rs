//! Global and per-holder reward state.

use givpower_types::{HolderAddress, Timestamp};
use serde::{Deserialize, Serialize};

/// Process-wide reward distribution state.
///
/// Field-for-field the storage of the original Unipool distributor, so an
/// upgraded deployment can import it unchanged (see [`crate::UnipoolSnapshot`]).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalRewardState {
    /// Where claimed rewards are allocated.
    pub token_distro: HolderAddress,
    /// Length of a reward period in seconds.
    pub duration: u64,
    /// The only caller allowed to fund a reward period.
    pub reward_distribution: HolderAddress,
    /// When the current reward period stops accruing.
    pub period_finish: Timestamp,
    /// Raw reward units streamed per second during the period.
    pub reward_rate: u128,
    /// Last time the accumulator was brought current (never past `period_finish`).
    pub last_update_time: Timestamp,
    /// Reward per whole unit of balance since genesis, scaled by `SCALE`.
    pub reward_per_token_stored: u128,
    /// Sum of every holder balance.
    pub total_supply: u128,
}

impl GlobalRewardState {
    pub fn new(token_distro: HolderAddress, reward_distribution: HolderAddress, duration: u64) -> Self {
        Self {
            token_distro,
            duration,
            reward_distribution,
            period_finish: Timestamp::EPOCH,
            reward_rate: 0,
            last_update_time: Timestamp::EPOCH,
            reward_per_token_stored: 0,
            total_supply: 0,
        }
    }

    /// `min(now, period_finish)`. Rewards stop accruing after the period ends.
    pub fn last_time_reward_applicable(&self, now: Timestamp) -> Timestamp {
        now.min(self.period_finish)
    }

    /// Whether a reward period is still streaming at `now`.
    pub fn period_active(&self, now: Timestamp) -> bool {
        now < self.period_finish
    }
}

/// Reward bookkeeping and balance for a single holder.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderRewardState {
    /// Ledger balance (principal plus active lock bonuses).
    pub balance: u128,
    /// Accumulator value at the holder's last settlement.
    pub user_reward_per_token_paid: u128,
    /// Rewards earned up to the last settlement and not yet claimed.
    pub rewards: u128,
}

impl HolderRewardState {
    pub fn is_empty(&self) -> bool {
        self.balance == 0 && self.rewards == 0
    }
}
