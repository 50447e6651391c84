//! Nullable underlying token: in-memory balances and custody.

use givpower_power::UnderlyingToken;
use givpower_types::HolderAddress;
use std::collections::BTreeMap;

/// An in-memory wrapped token.
///
/// Deposits fail when the holder's balance is short, mirroring an ERC-20
/// `transferFrom` revert. `set_paused` makes every movement fail, for
/// exercising custody errors.
#[derive(Debug, Default)]
pub struct NullToken {
    balances: BTreeMap<HolderAddress, u128>,
    custody: u128,
    paused: bool,
}

impl NullToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `holder` out of thin air.
    pub fn mint(&mut self, holder: &HolderAddress, amount: u128) {
        let balance = self.balances.entry(*holder).or_default();
        *balance = balance.saturating_add(amount);
    }

    pub fn balance_of(&self, holder: &HolderAddress) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Tokens currently held on behalf of the ledger.
    pub fn custody(&self) -> u128 {
        self.custody
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }
}

impl UnderlyingToken for NullToken {
    fn deposit(&mut self, from: &HolderAddress, amount: u128) -> Result<(), String> {
        if self.paused {
            return Err("token is paused".into());
        }
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(format!("{from} holds {balance}, cannot deposit {amount}"));
        }
        let custody = self
            .custody
            .checked_add(amount)
            .ok_or_else(|| "custody overflow".to_string())?;
        self.balances.insert(*from, balance - amount);
        self.custody = custody;
        Ok(())
    }

    fn withdraw(&mut self, to: &HolderAddress, amount: u128) -> Result<(), String> {
        if self.paused {
            return Err("token is paused".into());
        }
        if self.custody < amount {
            return Err(format!("custody holds {}, cannot pay {amount}", self.custody));
        }
        self.custody -= amount;
        self.mint(to, amount);
        Ok(())
    }
}
