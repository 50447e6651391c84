//! The reward token distributor the accrual engine pays claims through.

use givpower_types::HolderAddress;

/// Receives claimed rewards.
///
/// Implemented by whatever vests or transfers the reward token. A failed
/// allocation leaves the holder's pending reward in place.
pub trait RewardDistributor {
    fn allocate(&mut self, recipient: &HolderAddress, amount: u128) -> Result<(), String>;
}
