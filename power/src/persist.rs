//! Saving and restoring a ledger through a [`PowerStore`].
//!
//! Each holder is one bincode record (reward bookkeeping, principal, locks).
//! The global reward state and the ledger settings live under metadata keys.

use crate::config::TokenMetadata;
use crate::error::PowerError;
use crate::ledger::PowerLedger;
use crate::lock::{HolderLocks, LockBook};
use crate::round::RoundClock;
use givpower_accrual::{GlobalRewardState, HolderRewardState, RewardAccrual, UnipoolSnapshot};
use givpower_store::PowerStore;
use givpower_types::HolderAddress;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const META_REWARD_GLOBAL: &[u8] = b"reward_global";
const META_LEDGER: &[u8] = b"ledger";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct HolderRecord {
    reward: Option<HolderRewardState>,
    principal: u128,
    locks: HolderLocks,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct LedgerMeta {
    owner: HolderAddress,
    clock: RoundClock,
    max_lock_rounds: u64,
    metadata: TokenMetadata,
}

fn store_err(e: impl ToString) -> PowerError {
    PowerError::Store(e.to_string())
}

impl PowerLedger {
    /// Persist the whole ledger. Records of holders that no longer hold
    /// anything are deleted.
    pub fn save_to_store(&self, store: &dyn PowerStore) -> Result<(), PowerError> {
        let meta = LedgerMeta {
            owner: *self.accrual().owner(),
            clock: *self.clock(),
            max_lock_rounds: self.max_lock_rounds(),
            metadata: self.metadata().clone(),
        };
        let bytes = bincode::serialize(&meta).map_err(store_err)?;
        store.put_meta(META_LEDGER, &bytes).map_err(store_err)?;

        let bytes = bincode::serialize(self.accrual().global()).map_err(store_err)?;
        store.put_meta(META_REWARD_GLOBAL, &bytes).map_err(store_err)?;

        let mut live = BTreeSet::new();
        live.extend(self.accrual().holders().map(|(h, _)| *h));
        live.extend(self.principals().keys().copied());
        live.extend(self.lock_book().holders().map(|(h, _)| *h));

        for holder in &live {
            let record = HolderRecord {
                reward: self.accrual().holder(holder).cloned(),
                principal: self.principal_of(holder),
                locks: self.user_locks(holder).cloned().unwrap_or_default(),
            };
            let bytes = bincode::serialize(&record).map_err(store_err)?;
            store.put_holder_record(holder, &bytes).map_err(store_err)?;
        }

        for (holder, _) in store.iter_holder_records().map_err(store_err)? {
            if !live.contains(&holder) {
                store.delete_holder_record(&holder).map_err(store_err)?;
            }
        }
        Ok(())
    }

    /// Restore a ledger saved with [`PowerLedger::save_to_store`].
    ///
    /// The restored reward state must pass the same consistency check as an
    /// imported Unipool snapshot.
    pub fn load_from_store(store: &dyn PowerStore) -> Result<Self, PowerError> {
        let meta: LedgerMeta = match store.get_meta(META_LEDGER).map_err(store_err)? {
            Some(bytes) => bincode::deserialize(&bytes).map_err(store_err)?,
            None => return Err(PowerError::Store("missing ledger metadata".into())),
        };
        let global: GlobalRewardState =
            match store.get_meta(META_REWARD_GLOBAL).map_err(store_err)? {
                Some(bytes) => bincode::deserialize(&bytes).map_err(store_err)?,
                None => return Err(PowerError::Store("missing reward state".into())),
            };

        let mut rewards = BTreeMap::new();
        let mut principal = BTreeMap::new();
        let mut locks = BTreeMap::new();
        for (holder, bytes) in store.iter_holder_records().map_err(store_err)? {
            let record: HolderRecord = bincode::deserialize(&bytes).map_err(store_err)?;
            if let Some(reward) = record.reward {
                rewards.insert(holder, reward);
            }
            if record.principal > 0 {
                principal.insert(holder, record.principal);
            }
            if !record.locks.is_empty() {
                locks.insert(holder, record.locks);
            }
        }

        let snapshot = UnipoolSnapshot {
            token_distro: global.token_distro,
            duration: global.duration,
            reward_distribution: global.reward_distribution,
            period_finish: global.period_finish,
            reward_rate: global.reward_rate,
            last_update_time: global.last_update_time,
            reward_per_token_stored: global.reward_per_token_stored,
            total_supply: global.total_supply,
            holders: rewards,
        };
        let accrual = RewardAccrual::from_snapshot(meta.owner, snapshot)?;
        let ledger = PowerLedger::from_parts(
            accrual,
            meta.clock,
            meta.max_lock_rounds,
            meta.metadata,
            principal,
            LockBook::from_holders(locks),
        );
        ledger.check_invariants().map_err(PowerError::Store)?;
        Ok(ledger)
    }
}
