//! Nullable reward distributor: records allocations.

use givpower_accrual::RewardDistributor;
use givpower_types::HolderAddress;

/// Records every allocation instead of moving reward tokens.
#[derive(Debug, Default)]
pub struct NullDistributor {
    allocations: Vec<(HolderAddress, u128)>,
    fail_next: bool,
}

impl NullDistributor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocations(&self) -> &[(HolderAddress, u128)] {
        &self.allocations
    }

    /// Sum allocated to `recipient` so far.
    pub fn allocated_to(&self, recipient: &HolderAddress) -> u128 {
        self.allocations
            .iter()
            .filter(|(r, _)| r == recipient)
            .fold(0u128, |acc, (_, a)| acc.saturating_add(*a))
    }

    /// Make the next allocation fail.
    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }
}

impl RewardDistributor for NullDistributor {
    fn allocate(&mut self, recipient: &HolderAddress, amount: u128) -> Result<(), String> {
        if std::mem::take(&mut self.fail_next) {
            return Err("allocation rejected".into());
        }
        self.allocations.push((*recipient, amount));
        Ok(())
    }
}
