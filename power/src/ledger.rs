//! The power ledger.
//!
//! Wraps an underlying token one-for-one into a non-transferable balance and
//! lets holders lock wrapped principal for a number of rounds in exchange for
//! an immediate bonus. Balances (principal plus active bonuses) are the stake
//! in the reward accrual engine, so every mutation settles the holder's
//! rewards before touching the balance.
//!
//! Every fallible operation computes its full effect first and only writes
//! after the last check (including the custody call) has succeeded.

use crate::config::{PowerConfig, TokenMetadata};
use crate::error::PowerError;
use crate::event::{EventBus, LedgerEvent};
use crate::lock::{HolderLocks, LockBook, LockEntry};
use crate::math::lock_bonus;
use crate::round::RoundClock;
use crate::token::UnderlyingToken;
use givpower_accrual::{RewardAccrual, RewardDistributor, UnipoolSnapshot};
use givpower_types::{HolderAddress, Round, Timestamp};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Outcome of a successful `lock`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockReceipt {
    pub until_round: Round,
    /// Principal plus bonus of this lock.
    pub power: u128,
    pub bonus: u128,
}

/// A lock released by `unlock`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnlockedLock {
    pub holder: HolderAddress,
    pub amount: u128,
    pub bonus: u128,
}

/// Per-holder outcome of a batch `unlock`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UnlockReport {
    pub unlocked: Vec<UnlockedLock>,
    /// Holders with no lock maturing at the requested round.
    pub skipped: Vec<HolderAddress>,
    pub failed: Vec<(HolderAddress, PowerError)>,
}

#[derive(Debug)]
pub struct PowerLedger {
    accrual: RewardAccrual,
    clock: RoundClock,
    max_lock_rounds: u64,
    metadata: TokenMetadata,
    principal: BTreeMap<HolderAddress, u128>,
    locks: LockBook,
    journal: Vec<LedgerEvent>,
    bus: EventBus,
}

impl PowerLedger {
    /// A fresh ledger with no holders and no funded reward period.
    pub fn new(config: &PowerConfig) -> Result<Self, PowerError> {
        config.validate()?;
        let accrual = RewardAccrual::new(
            config.owner,
            config.token_distro,
            config.reward_distribution,
            config.reward_duration,
        )?;
        Ok(Self::from_parts(
            accrual,
            config.round_clock()?,
            config.max_lock_rounds,
            config.metadata.clone(),
            BTreeMap::new(),
            LockBook::new(),
        ))
    }

    /// Layer the power book over an existing Unipool distributor.
    ///
    /// Every imported field is kept as is. Existing balances become wrapped
    /// principal with no locks. The reward duration comes from the snapshot,
    /// not from `config`.
    pub fn upgrade(config: &PowerConfig, snapshot: UnipoolSnapshot) -> Result<Self, PowerError> {
        config.validate()?;
        let holders = snapshot.holders.len();
        let accrual = RewardAccrual::from_snapshot(config.owner, snapshot)?;
        let principal = accrual
            .holders()
            .filter(|(_, state)| state.balance > 0)
            .map(|(holder, state)| (*holder, state.balance))
            .collect();
        info!(
            holders,
            total_supply = %accrual.total_supply(),
            "upgraded Unipool distributor to power ledger"
        );
        Ok(Self::from_parts(
            accrual,
            config.round_clock()?,
            config.max_lock_rounds,
            config.metadata.clone(),
            principal,
            LockBook::new(),
        ))
    }

    pub(crate) fn from_parts(
        accrual: RewardAccrual,
        clock: RoundClock,
        max_lock_rounds: u64,
        metadata: TokenMetadata,
        principal: BTreeMap<HolderAddress, u128>,
        locks: LockBook,
    ) -> Self {
        Self {
            accrual,
            clock,
            max_lock_rounds,
            metadata,
            principal,
            locks,
            journal: Vec::new(),
            bus: EventBus::new(),
        }
    }

    // ── Wrapping ──────────────────────────────────────────────────────

    /// Pull `amount` of the underlying token into custody and credit it.
    pub fn wrap(
        &mut self,
        holder: &HolderAddress,
        amount: u128,
        now: Timestamp,
        token: &mut dyn UnderlyingToken,
    ) -> Result<(), PowerError> {
        if amount == 0 {
            return Err(PowerError::ZeroAmount);
        }
        let change = self.accrual.plan_stake(holder, amount, now)?;
        let principal = self
            .principal_of(holder)
            .checked_add(amount)
            .ok_or(PowerError::Overflow)?;
        token.deposit(holder, amount).map_err(PowerError::Custody)?;

        self.accrual.commit(change);
        self.principal.insert(*holder, principal);
        debug!(holder = %holder, amount = %amount, "wrapped");
        self.emit(LedgerEvent::Staked {
            holder: *holder,
            amount,
        });
        self.emit(LedgerEvent::mint(*holder, amount));
        Ok(())
    }

    /// Debit `amount` of unlocked principal and pay it out of custody.
    pub fn unwrap(
        &mut self,
        holder: &HolderAddress,
        amount: u128,
        now: Timestamp,
        token: &mut dyn UnderlyingToken,
    ) -> Result<(), PowerError> {
        if amount == 0 {
            return Err(PowerError::ZeroAmount);
        }
        let available = self.unlocked_principal(holder);
        if amount > available {
            return Err(PowerError::InsufficientUnlockedPrincipal {
                needed: amount,
                available,
            });
        }
        let change = self.accrual.plan_withdraw(holder, amount, now)?;
        let principal = self.principal_of(holder) - amount;
        token.withdraw(holder, amount).map_err(PowerError::Custody)?;

        self.accrual.commit(change);
        if principal == 0 {
            self.principal.remove(holder);
        } else {
            self.principal.insert(*holder, principal);
        }
        debug!(holder = %holder, amount = %amount, "unwrapped");
        self.emit(LedgerEvent::Withdrawn {
            holder: *holder,
            amount,
        });
        self.emit(LedgerEvent::burn(*holder, amount));
        Ok(())
    }

    // ── Locking ───────────────────────────────────────────────────────

    /// Lock `amount` of unlocked principal until `current_round(now) + rounds`
    /// and credit the power bonus immediately.
    pub fn lock(
        &mut self,
        holder: &HolderAddress,
        amount: u128,
        rounds: u64,
        now: Timestamp,
    ) -> Result<LockReceipt, PowerError> {
        if amount == 0 {
            return Err(PowerError::ZeroAmount);
        }
        if rounds == 0 {
            return Err(PowerError::ZeroRounds);
        }
        if rounds > self.max_lock_rounds {
            return Err(PowerError::TooManyRounds {
                requested: rounds,
                max: self.max_lock_rounds,
            });
        }
        let available = self.unlocked_principal(holder);
        if amount > available {
            return Err(PowerError::InsufficientUnlockedPrincipal {
                needed: amount,
                available,
            });
        }
        let bonus = lock_bonus(amount, rounds)?;
        let until_round = self
            .clock
            .current_round(now)
            .checked_add(rounds)
            .ok_or(PowerError::Overflow)?;
        let plan = self.locks.plan_insert(holder, until_round, amount, bonus)?;

        if bonus > 0 {
            let change = self.accrual.plan_stake(holder, bonus, now)?;
            self.accrual.commit(change);
        } else {
            self.accrual.update_reward(Some(holder), now)?;
        }
        self.locks.commit_insert(plan);

        debug!(
            holder = %holder,
            amount = %amount,
            rounds,
            until_round,
            bonus = %bonus,
            "locked"
        );
        if bonus > 0 {
            self.emit(LedgerEvent::Staked {
                holder: *holder,
                amount: bonus,
            });
            self.emit(LedgerEvent::mint(*holder, bonus));
        }
        self.emit(LedgerEvent::TokenLocked {
            holder: *holder,
            amount,
            rounds,
            until_round,
        });
        Ok(LockReceipt {
            until_round,
            power: amount + bonus,
            bonus,
        })
    }

    /// Release every lock maturing at `until_round` for the given holders.
    ///
    /// Fails as a whole only when the round has not been reached. Holders
    /// without a lock there are skipped; a holder whose release fails is
    /// reported and the batch moves on.
    pub fn unlock(
        &mut self,
        holders: &[HolderAddress],
        until_round: Round,
        now: Timestamp,
    ) -> Result<UnlockReport, PowerError> {
        if !self.clock.has_reached(until_round, now) {
            return Err(PowerError::RoundNotFinished {
                until_round,
                current_round: self.clock.current_round(now),
            });
        }

        let mut report = UnlockReport::default();
        for holder in holders {
            let Some(entry) = self.locks.lock_at(holder, until_round) else {
                warn!(holder = %holder, until_round, "no lock to release");
                report.skipped.push(*holder);
                continue;
            };
            match self.release(holder, until_round, entry, now) {
                Ok(()) => report.unlocked.push(UnlockedLock {
                    holder: *holder,
                    amount: entry.amount,
                    bonus: entry.bonus,
                }),
                Err(err) => {
                    warn!(holder = %holder, until_round, error = %err, "unlock failed");
                    report.failed.push((*holder, err));
                }
            }
        }
        Ok(report)
    }

    fn release(
        &mut self,
        holder: &HolderAddress,
        until_round: Round,
        entry: LockEntry,
        now: Timestamp,
    ) -> Result<(), PowerError> {
        if entry.bonus > 0 {
            let change = self.accrual.plan_withdraw(holder, entry.bonus, now)?;
            self.accrual.commit(change);
        } else {
            self.accrual.update_reward(Some(holder), now)?;
        }
        self.locks.remove(holder, until_round);

        debug!(
            holder = %holder,
            amount = %entry.amount,
            bonus = %entry.bonus,
            until_round,
            "unlocked"
        );
        if entry.bonus > 0 {
            self.emit(LedgerEvent::Withdrawn {
                holder: *holder,
                amount: entry.bonus,
            });
            self.emit(LedgerEvent::burn(*holder, entry.bonus));
        }
        self.emit(LedgerEvent::TokenUnlocked {
            holder: *holder,
            amount: entry.amount,
            until_round,
        });
        Ok(())
    }

    /// Holders with a lock maturing at `until_round`.
    pub fn unlockable_holders(&self, until_round: Round) -> Vec<HolderAddress> {
        self.locks.holders_at(until_round)
    }

    // ── Transfers and allowances ──────────────────────────────────────

    pub fn transfer(
        &mut self,
        _from: &HolderAddress,
        _to: &HolderAddress,
        _amount: u128,
    ) -> Result<(), PowerError> {
        Err(PowerError::NonTransferable)
    }

    pub fn transfer_from(
        &mut self,
        _spender: &HolderAddress,
        _from: &HolderAddress,
        _to: &HolderAddress,
        _amount: u128,
    ) -> Result<(), PowerError> {
        Err(PowerError::NonTransferable)
    }

    pub fn approve(
        &mut self,
        _owner: &HolderAddress,
        _spender: &HolderAddress,
        _amount: u128,
    ) -> Result<(), PowerError> {
        Err(PowerError::NonTransferable)
    }

    pub fn increase_allowance(
        &mut self,
        _owner: &HolderAddress,
        _spender: &HolderAddress,
        _added: u128,
    ) -> Result<(), PowerError> {
        Err(PowerError::NonTransferable)
    }

    pub fn decrease_allowance(
        &mut self,
        _owner: &HolderAddress,
        _spender: &HolderAddress,
        _subtracted: u128,
    ) -> Result<(), PowerError> {
        Err(PowerError::NonTransferable)
    }

    pub fn allowance(&self, _owner: &HolderAddress, _spender: &HolderAddress) -> u128 {
        0
    }

    // ── Rewards ───────────────────────────────────────────────────────

    /// Fund a reward period. Returns the new reward rate.
    pub fn notify_reward_amount(
        &mut self,
        caller: &HolderAddress,
        reward: u128,
        now: Timestamp,
    ) -> Result<u128, PowerError> {
        let rate = self.accrual.notify_reward_amount(caller, reward, now)?;
        info!(
            reward = %reward,
            rate = %rate,
            period_finish = %self.accrual.global().period_finish,
            "reward period funded"
        );
        self.emit(LedgerEvent::RewardAdded { reward });
        Ok(rate)
    }

    /// Allocate `holder`'s pending rewards through `distributor`.
    pub fn get_reward(
        &mut self,
        holder: &HolderAddress,
        now: Timestamp,
        distributor: &mut dyn RewardDistributor,
    ) -> Result<u128, PowerError> {
        let reward = self.accrual.get_reward(holder, now, distributor)?;
        if reward > 0 {
            debug!(holder = %holder, reward = %reward, "reward paid");
            self.emit(LedgerEvent::RewardPaid {
                holder: *holder,
                reward,
            });
        }
        Ok(reward)
    }

    pub fn set_duration(
        &mut self,
        caller: &HolderAddress,
        duration: u64,
        now: Timestamp,
    ) -> Result<(), PowerError> {
        self.accrual.set_duration(caller, duration, now)?;
        Ok(())
    }

    pub fn set_reward_distribution(
        &mut self,
        caller: &HolderAddress,
        reward_distribution: HolderAddress,
    ) -> Result<(), PowerError> {
        self.accrual
            .set_reward_distribution(caller, reward_distribution)?;
        Ok(())
    }

    pub fn earned(&self, holder: &HolderAddress, now: Timestamp) -> Result<u128, PowerError> {
        Ok(self.accrual.earned(holder, now)?)
    }

    pub fn reward_per_token(&self, now: Timestamp) -> Result<u128, PowerError> {
        Ok(self.accrual.reward_per_token(now)?)
    }

    // ── Queries ───────────────────────────────────────────────────────

    pub fn balance_of(&self, holder: &HolderAddress) -> u128 {
        self.accrual.balance_of(holder)
    }

    pub fn total_supply(&self) -> u128 {
        self.accrual.total_supply()
    }

    /// Wrapped underlying tokens, excluding bonuses.
    pub fn principal_of(&self, holder: &HolderAddress) -> u128 {
        self.principal.get(holder).copied().unwrap_or(0)
    }

    /// Principal that is neither locked nor needed to back a lock.
    pub fn unlocked_principal(&self, holder: &HolderAddress) -> u128 {
        self.principal_of(holder)
            .saturating_sub(self.locks.total_locked(holder))
    }

    pub fn user_locks(&self, holder: &HolderAddress) -> Option<&HolderLocks> {
        self.locks.holder(holder)
    }

    pub fn lock_at(&self, holder: &HolderAddress, until_round: Round) -> Option<LockEntry> {
        self.locks.lock_at(holder, until_round)
    }

    pub fn current_round(&self, now: Timestamp) -> Round {
        self.clock.current_round(now)
    }

    pub fn clock(&self) -> &RoundClock {
        &self.clock
    }

    pub fn max_lock_rounds(&self) -> u64 {
        self.max_lock_rounds
    }

    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    pub fn accrual(&self) -> &RewardAccrual {
        &self.accrual
    }

    /// The Unipool-compatible storage view of the reward state.
    pub fn snapshot(&self) -> UnipoolSnapshot {
        self.accrual.snapshot()
    }

    pub(crate) fn lock_book(&self) -> &LockBook {
        &self.locks
    }

    pub(crate) fn principals(&self) -> &BTreeMap<HolderAddress, u128> {
        &self.principal
    }

    /// Check the cross-structure invariants: supply equals the sum of
    /// balances, and every balance is its principal plus its active bonuses
    /// with no more than the principal locked.
    pub fn check_invariants(&self) -> Result<(), String> {
        if !self.accrual.supply_matches_balances() {
            return Err("total supply differs from the sum of balances".into());
        }
        for (holder, state) in self.accrual.holders() {
            let principal = self.principal_of(holder);
            let (locked, bonuses) = match self.locks.holder(holder) {
                Some(locks) => {
                    if !locks.is_consistent() {
                        return Err(format!("{holder}: total_locked out of sync"));
                    }
                    let bonuses = locks
                        .by_round
                        .values()
                        .try_fold(0u128, |acc, e| acc.checked_add(e.bonus))
                        .ok_or_else(|| format!("{holder}: bonus sum overflows"))?;
                    (locks.total_locked, bonuses)
                }
                None => (0, 0),
            };
            if locked > principal {
                return Err(format!("{holder}: locked {locked} exceeds principal {principal}"));
            }
            if principal.checked_add(bonuses) != Some(state.balance) {
                return Err(format!(
                    "{holder}: balance {} != principal {principal} + bonuses {bonuses}",
                    state.balance
                ));
            }
        }
        for holder in self.principal.keys() {
            if self.accrual.holder(holder).is_none() {
                return Err(format!("{holder}: principal without a balance record"));
            }
        }
        Ok(())
    }

    // ── Events ────────────────────────────────────────────────────────

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.bus.subscribe(listener);
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.journal)
    }

    fn emit(&mut self, event: LedgerEvent) {
        self.bus.emit(&event);
        self.journal.push(event);
    }
}
