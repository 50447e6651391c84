//! Custody of the wrapped underlying token.

use givpower_types::HolderAddress;

/// The transferable token the ledger wraps.
///
/// `deposit` pulls tokens from a holder into the ledger's custody and
/// `withdraw` pays them back out. Either may refuse (insufficient funds,
/// missing approval, paused token) with a reason string.
pub trait UnderlyingToken {
    fn deposit(&mut self, from: &HolderAddress, amount: u128) -> Result<(), String>;
    fn withdraw(&mut self, to: &HolderAddress, amount: u128) -> Result<(), String>;
}
