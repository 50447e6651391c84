//! Core reward accrual engine.

use crate::distributor::RewardDistributor;
use crate::error::AccrualError;
use crate::math::{mul3_div, mul_div};
use crate::snapshot::UnipoolSnapshot;
use crate::state::{GlobalRewardState, HolderRewardState};
use givpower_types::{HolderAddress, Timestamp, SCALE};
use std::collections::BTreeMap;

/// Settlement computed against the current state but not yet written.
///
/// Produced by [`RewardAccrual::plan_settlement`]; a plan is only valid
/// against the state it was computed from, so commit it before any other
/// mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    reward_per_token_stored: u128,
    last_update_time: Timestamp,
    holder: Option<(HolderAddress, HolderRewardState)>,
}

impl Settlement {
    pub fn reward_per_token_stored(&self) -> u128 {
        self.reward_per_token_stored
    }

    pub fn last_update_time(&self) -> Timestamp {
        self.last_update_time
    }

    /// The holder's settled state, if a holder was named.
    pub fn holder_state(&self) -> Option<&HolderRewardState> {
        self.holder.as_ref().map(|(_, state)| state)
    }
}

/// Accumulator values after a settlement was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardSnapshot {
    pub reward_per_token_stored: u128,
    pub last_update_time: Timestamp,
    /// Pending rewards of the settled holder, if one was named.
    pub holder_rewards: Option<u128>,
}

/// A settled balance change ready to be committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceChange {
    holder: HolderAddress,
    settlement: Settlement,
    new_balance: u128,
    new_total_supply: u128,
}

impl BalanceChange {
    pub fn holder(&self) -> &HolderAddress {
        &self.holder
    }

    pub fn new_balance(&self) -> u128 {
        self.new_balance
    }

    pub fn new_total_supply(&self) -> u128 {
        self.new_total_supply
    }
}

/// The reward accrual engine.
///
/// Owns the balance and supply storage. Every balance mutation goes through a
/// [`BalanceChange`], which carries the holder's settlement, so rewards are
/// always accrued over the interval during which the previous balance applied.
#[derive(Clone, Debug)]
pub struct RewardAccrual {
    owner: HolderAddress,
    global: GlobalRewardState,
    holders: BTreeMap<HolderAddress, HolderRewardState>,
}

impl RewardAccrual {
    /// Create an empty distributor with no funded reward period.
    pub fn new(
        owner: HolderAddress,
        token_distro: HolderAddress,
        reward_distribution: HolderAddress,
        duration: u64,
    ) -> Result<Self, AccrualError> {
        if duration == 0 {
            return Err(AccrualError::InvalidDuration);
        }
        Ok(Self {
            owner,
            global: GlobalRewardState::new(token_distro, reward_distribution, duration),
            holders: BTreeMap::new(),
        })
    }

    /// Rebuild a distributor from existing Unipool storage, field for field.
    pub fn from_snapshot(owner: HolderAddress, snapshot: UnipoolSnapshot) -> Result<Self, AccrualError> {
        snapshot.validate()?;
        let (global, holders) = snapshot.into_parts();
        Ok(Self {
            owner,
            global,
            holders,
        })
    }

    /// Export the Unipool-compatible storage view.
    pub fn snapshot(&self) -> UnipoolSnapshot {
        UnipoolSnapshot::from_parts(&self.global, &self.holders)
    }

    pub fn owner(&self) -> &HolderAddress {
        &self.owner
    }

    pub fn global(&self) -> &GlobalRewardState {
        &self.global
    }

    pub fn holder(&self, holder: &HolderAddress) -> Option<&HolderRewardState> {
        self.holders.get(holder)
    }

    pub fn holders(&self) -> impl Iterator<Item = (&HolderAddress, &HolderRewardState)> {
        self.holders.iter()
    }

    pub fn balance_of(&self, holder: &HolderAddress) -> u128 {
        self.holders.get(holder).map(|h| h.balance).unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.global.total_supply
    }

    /// Whether `total_supply` equals the sum of every holder balance.
    pub fn supply_matches_balances(&self) -> bool {
        let mut sum: u128 = 0;
        for state in self.holders.values() {
            match sum.checked_add(state.balance) {
                Some(s) => sum = s,
                None => return false,
            }
        }
        sum == self.global.total_supply
    }

    pub fn last_time_reward_applicable(&self, now: Timestamp) -> Timestamp {
        self.global.last_time_reward_applicable(now)
    }

    /// Current value of the reward-per-token accumulator.
    ///
    /// With zero supply the stored value is returned unchanged.
    pub fn reward_per_token(&self, now: Timestamp) -> Result<u128, AccrualError> {
        let g = &self.global;
        if g.total_supply == 0 {
            return Ok(g.reward_per_token_stored);
        }
        let elapsed = g.last_update_time.elapsed_since(g.last_time_reward_applicable(now));
        let increment = mul3_div(elapsed as u128, g.reward_rate, SCALE, g.total_supply)?;
        g.reward_per_token_stored
            .checked_add(increment)
            .ok_or(AccrualError::Overflow)
    }

    /// Rewards earned by `holder` up to `now`, including unclaimed ones.
    pub fn earned(&self, holder: &HolderAddress, now: Timestamp) -> Result<u128, AccrualError> {
        let rpt = self.reward_per_token(now)?;
        let state = self.holders.get(holder).cloned().unwrap_or_default();
        earned_at(&state, rpt)
    }

    /// Compute a settlement without writing it.
    ///
    /// With `holder = None` only the global accumulator is brought current.
    pub fn plan_settlement(
        &self,
        holder: Option<&HolderAddress>,
        now: Timestamp,
    ) -> Result<Settlement, AccrualError> {
        let reward_per_token_stored = self.reward_per_token(now)?;
        let holder = match holder {
            Some(addr) => {
                let mut state = self.holders.get(addr).cloned().unwrap_or_default();
                state.rewards = earned_at(&state, reward_per_token_stored)?;
                state.user_reward_per_token_paid = reward_per_token_stored;
                Some((*addr, state))
            }
            None => None,
        };
        Ok(Settlement {
            reward_per_token_stored,
            last_update_time: self.global.last_time_reward_applicable(now),
            holder,
        })
    }

    /// Write a previously planned settlement.
    pub fn apply_settlement(&mut self, settlement: Settlement) -> RewardSnapshot {
        self.global.reward_per_token_stored = settlement.reward_per_token_stored;
        self.global.last_update_time = settlement.last_update_time;
        let holder_rewards = settlement.holder.map(|(addr, state)| {
            let rewards = state.rewards;
            // Don't materialize records for holders that never held anything.
            if self.holders.contains_key(&addr) || !state.is_empty() {
                self.holders.insert(addr, state);
            }
            rewards
        });
        RewardSnapshot {
            reward_per_token_stored: settlement.reward_per_token_stored,
            last_update_time: settlement.last_update_time,
            holder_rewards,
        }
    }

    /// Settle `holder` (or only the globals) at `now`.
    pub fn update_reward(
        &mut self,
        holder: Option<&HolderAddress>,
        now: Timestamp,
    ) -> Result<RewardSnapshot, AccrualError> {
        let settlement = self.plan_settlement(holder, now)?;
        Ok(self.apply_settlement(settlement))
    }

    /// Plan crediting `amount` to `holder`'s balance and the total supply.
    pub fn plan_stake(
        &self,
        holder: &HolderAddress,
        amount: u128,
        now: Timestamp,
    ) -> Result<BalanceChange, AccrualError> {
        if amount == 0 {
            return Err(AccrualError::ZeroAmount);
        }
        let settlement = self.plan_settlement(Some(holder), now)?;
        let current = settlement.holder_state().map(|s| s.balance).unwrap_or(0);
        let new_balance = current.checked_add(amount).ok_or(AccrualError::Overflow)?;
        let new_total_supply = self
            .global
            .total_supply
            .checked_add(amount)
            .ok_or(AccrualError::Overflow)?;
        Ok(BalanceChange {
            holder: *holder,
            settlement,
            new_balance,
            new_total_supply,
        })
    }

    /// Plan debiting `amount` from `holder`'s balance and the total supply.
    pub fn plan_withdraw(
        &self,
        holder: &HolderAddress,
        amount: u128,
        now: Timestamp,
    ) -> Result<BalanceChange, AccrualError> {
        if amount == 0 {
            return Err(AccrualError::ZeroAmount);
        }
        let settlement = self.plan_settlement(Some(holder), now)?;
        let current = settlement.holder_state().map(|s| s.balance).unwrap_or(0);
        let new_balance = current
            .checked_sub(amount)
            .ok_or(AccrualError::InsufficientBalance {
                needed: amount,
                available: current,
            })?;
        let new_total_supply = self
            .global
            .total_supply
            .checked_sub(amount)
            .ok_or(AccrualError::Overflow)?;
        Ok(BalanceChange {
            holder: *holder,
            settlement,
            new_balance,
            new_total_supply,
        })
    }

    /// Commit a planned balance change: settlement first, then the balance.
    pub fn commit(&mut self, change: BalanceChange) -> RewardSnapshot {
        let mut state = change.settlement.holder_state().cloned().unwrap_or_default();
        state.balance = change.new_balance;
        let snapshot = self.apply_settlement(change.settlement);
        self.holders.insert(change.holder, state);
        self.global.total_supply = change.new_total_supply;
        snapshot
    }

    /// Settle and credit in one step.
    pub fn stake(
        &mut self,
        holder: &HolderAddress,
        amount: u128,
        now: Timestamp,
    ) -> Result<RewardSnapshot, AccrualError> {
        let change = self.plan_stake(holder, amount, now)?;
        Ok(self.commit(change))
    }

    /// Settle and debit in one step.
    pub fn withdraw(
        &mut self,
        holder: &HolderAddress,
        amount: u128,
        now: Timestamp,
    ) -> Result<RewardSnapshot, AccrualError> {
        let change = self.plan_withdraw(holder, amount, now)?;
        Ok(self.commit(change))
    }

    /// Fund a reward period of `duration` seconds starting at `now`.
    ///
    /// Rewards still owed from an unfinished period roll into the new rate.
    pub fn notify_reward_amount(
        &mut self,
        caller: &HolderAddress,
        reward: u128,
        now: Timestamp,
    ) -> Result<u128, AccrualError> {
        if *caller != self.global.reward_distribution {
            return Err(AccrualError::Unauthorized(caller.to_string()));
        }
        let duration = self.global.duration as u128;
        if duration == 0 {
            return Err(AccrualError::InvalidDuration);
        }
        let settlement = self.plan_settlement(None, now)?;

        let new_rate = if now >= self.global.period_finish {
            reward / duration
        } else {
            let remaining = now.elapsed_since(self.global.period_finish) as u128;
            let leftover = remaining
                .checked_mul(self.global.reward_rate)
                .ok_or(AccrualError::Overflow)?;
            reward.checked_add(leftover).ok_or(AccrualError::Overflow)? / duration
        };
        let period_finish = now
            .checked_add_secs(self.global.duration)
            .ok_or(AccrualError::Overflow)?;

        self.apply_settlement(settlement);
        self.global.reward_rate = new_rate;
        self.global.last_update_time = now;
        self.global.period_finish = period_finish;
        Ok(new_rate)
    }

    /// Pay out `holder`'s pending rewards through `distributor`.
    ///
    /// Returns the amount paid (zero if nothing was pending). Nothing is
    /// written when the distributor rejects the allocation.
    pub fn get_reward(
        &mut self,
        holder: &HolderAddress,
        now: Timestamp,
        distributor: &mut dyn RewardDistributor,
    ) -> Result<u128, AccrualError> {
        let settlement = self.plan_settlement(Some(holder), now)?;
        let reward = settlement.holder_state().map(|s| s.rewards).unwrap_or(0);
        if reward > 0 {
            distributor
                .allocate(holder, reward)
                .map_err(AccrualError::Distributor)?;
        }
        self.apply_settlement(settlement);
        if reward > 0 {
            if let Some(state) = self.holders.get_mut(holder) {
                state.rewards = 0;
            }
        }
        Ok(reward)
    }

    /// Change the reward period length. Only allowed between periods.
    pub fn set_duration(
        &mut self,
        caller: &HolderAddress,
        duration: u64,
        now: Timestamp,
    ) -> Result<(), AccrualError> {
        if *caller != self.owner {
            return Err(AccrualError::Unauthorized(caller.to_string()));
        }
        if duration == 0 {
            return Err(AccrualError::InvalidDuration);
        }
        if self.global.period_active(now) {
            return Err(AccrualError::PeriodNotFinished);
        }
        self.global.duration = duration;
        Ok(())
    }

    /// Change who may fund reward periods.
    pub fn set_reward_distribution(
        &mut self,
        caller: &HolderAddress,
        reward_distribution: HolderAddress,
    ) -> Result<(), AccrualError> {
        if *caller != self.owner {
            return Err(AccrualError::Unauthorized(caller.to_string()));
        }
        self.global.reward_distribution = reward_distribution;
        Ok(())
    }
}

fn earned_at(state: &HolderRewardState, reward_per_token: u128) -> Result<u128, AccrualError> {
    let delta = reward_per_token
        .checked_sub(state.user_reward_per_token_paid)
        .ok_or(AccrualError::Overflow)?;
    mul_div(state.balance, delta, SCALE)?
        .checked_add(state.rewards)
        .ok_or(AccrualError::Overflow)
}
