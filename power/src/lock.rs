//! The lock book.
//!
//! Locks are keyed by `(holder, until_round)`. Locking again for the same
//! target round adds to the existing entry. A round index maps each target
//! round to the holders with a lock maturing there, so keepers can find
//! unlockable holders without scanning every account.

use crate::error::PowerError;
use givpower_types::{HolderAddress, Round};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Principal and bonus locked until a single round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEntry {
    pub amount: u128,
    pub bonus: u128,
}

/// Every active lock of one holder.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderLocks {
    pub total_locked: u128,
    pub by_round: BTreeMap<Round, LockEntry>,
}

impl HolderLocks {
    pub fn is_empty(&self) -> bool {
        self.by_round.is_empty()
    }

    /// Whether `total_locked` equals the sum of every entry's amount.
    pub fn is_consistent(&self) -> bool {
        let mut sum: u128 = 0;
        for entry in self.by_round.values() {
            match sum.checked_add(entry.amount) {
                Some(s) => sum = s,
                None => return false,
            }
        }
        sum == self.total_locked
    }
}

/// A lock addition computed against the current book but not yet written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedLock {
    holder: HolderAddress,
    until_round: Round,
    entry: LockEntry,
    total_locked: u128,
}

#[derive(Clone, Debug, Default)]
pub struct LockBook {
    holders: BTreeMap<HolderAddress, HolderLocks>,
    by_round: BTreeMap<Round, BTreeSet<HolderAddress>>,
}

impl LockBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a book (and its round index) from per-holder locks.
    pub fn from_holders(holders: BTreeMap<HolderAddress, HolderLocks>) -> Self {
        let mut by_round: BTreeMap<Round, BTreeSet<HolderAddress>> = BTreeMap::new();
        for (holder, locks) in &holders {
            for round in locks.by_round.keys() {
                by_round.entry(*round).or_default().insert(*holder);
            }
        }
        let holders = holders.into_iter().filter(|(_, l)| !l.is_empty()).collect();
        Self { holders, by_round }
    }

    pub fn holder(&self, holder: &HolderAddress) -> Option<&HolderLocks> {
        self.holders.get(holder)
    }

    pub fn holders(&self) -> impl Iterator<Item = (&HolderAddress, &HolderLocks)> {
        self.holders.iter()
    }

    pub fn total_locked(&self, holder: &HolderAddress) -> u128 {
        self.holders.get(holder).map(|l| l.total_locked).unwrap_or(0)
    }

    pub fn lock_at(&self, holder: &HolderAddress, until_round: Round) -> Option<LockEntry> {
        self.holders
            .get(holder)
            .and_then(|l| l.by_round.get(&until_round))
            .copied()
    }

    /// Holders with an active lock maturing at `until_round`.
    pub fn holders_at(&self, until_round: Round) -> Vec<HolderAddress> {
        self.by_round
            .get(&until_round)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Compute the book after adding `amount`/`bonus` at `until_round`.
    pub fn plan_insert(
        &self,
        holder: &HolderAddress,
        until_round: Round,
        amount: u128,
        bonus: u128,
    ) -> Result<PlannedLock, PowerError> {
        let existing = self.lock_at(holder, until_round).unwrap_or_default();
        let entry = LockEntry {
            amount: existing
                .amount
                .checked_add(amount)
                .ok_or(PowerError::Overflow)?,
            bonus: existing.bonus.checked_add(bonus).ok_or(PowerError::Overflow)?,
        };
        let total_locked = self
            .total_locked(holder)
            .checked_add(amount)
            .ok_or(PowerError::Overflow)?;
        Ok(PlannedLock {
            holder: *holder,
            until_round,
            entry,
            total_locked,
        })
    }

    pub fn commit_insert(&mut self, plan: PlannedLock) {
        let locks = self.holders.entry(plan.holder).or_default();
        locks.by_round.insert(plan.until_round, plan.entry);
        locks.total_locked = plan.total_locked;
        self.by_round
            .entry(plan.until_round)
            .or_default()
            .insert(plan.holder);
    }

    /// Remove and return the lock at `(holder, until_round)`.
    pub fn remove(&mut self, holder: &HolderAddress, until_round: Round) -> Option<LockEntry> {
        let locks = self.holders.get_mut(holder)?;
        let entry = locks.by_round.remove(&until_round)?;
        locks.total_locked = locks.total_locked.saturating_sub(entry.amount);
        if locks.is_empty() {
            self.holders.remove(holder);
        }
        if let Some(set) = self.by_round.get_mut(&until_round) {
            set.remove(holder);
            if set.is_empty() {
                self.by_round.remove(&until_round);
            }
        }
        Some(entry)
    }
}
