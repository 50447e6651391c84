//! Unipool storage snapshots.
//!
//! An upgraded deployment must read the distributor's existing storage and
//! reproduce it exactly. The snapshot is that storage as plain data: the
//! eight global slots plus `(balance, userRewardPerTokenPaid, rewards)` for
//! every holder.

use crate::error::AccrualError;
use crate::state::{GlobalRewardState, HolderRewardState};
use givpower_types::{HolderAddress, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnipoolSnapshot {
    pub token_distro: HolderAddress,
    pub duration: u64,
    pub reward_distribution: HolderAddress,
    pub period_finish: Timestamp,
    pub reward_rate: u128,
    pub last_update_time: Timestamp,
    pub reward_per_token_stored: u128,
    pub total_supply: u128,
    #[serde(default)]
    pub holders: BTreeMap<HolderAddress, HolderRewardState>,
}

impl UnipoolSnapshot {
    /// Check the snapshot is internally consistent: holder balances must sum
    /// to the total supply and a reward period must have a length.
    pub fn validate(&self) -> Result<(), AccrualError> {
        if self.duration == 0 {
            return Err(AccrualError::InvalidDuration);
        }
        let mut sum: u128 = 0;
        for state in self.holders.values() {
            sum = sum.checked_add(state.balance).ok_or(AccrualError::Overflow)?;
        }
        if sum != self.total_supply {
            return Err(AccrualError::SupplyMismatch {
                sum,
                total_supply: self.total_supply,
            });
        }
        Ok(())
    }

    pub(crate) fn from_parts(
        global: &GlobalRewardState,
        holders: &BTreeMap<HolderAddress, HolderRewardState>,
    ) -> Self {
        Self {
            token_distro: global.token_distro,
            duration: global.duration,
            reward_distribution: global.reward_distribution,
            period_finish: global.period_finish,
            reward_rate: global.reward_rate,
            last_update_time: global.last_update_time,
            reward_per_token_stored: global.reward_per_token_stored,
            total_supply: global.total_supply,
            holders: holders.clone(),
        }
    }

    pub(crate) fn into_parts(self) -> (GlobalRewardState, BTreeMap<HolderAddress, HolderRewardState>) {
        let global = GlobalRewardState {
            token_distro: self.token_distro,
            duration: self.duration,
            reward_distribution: self.reward_distribution,
            period_finish: self.period_finish,
            reward_rate: self.reward_rate,
            last_update_time: self.last_update_time,
            reward_per_token_stored: self.reward_per_token_stored,
            total_supply: self.total_supply,
        };
        (global, self.holders)
    }
}
