#![no_main]

use libfuzzer_sys::fuzz_target;

use givpower_accrual::{RewardAccrual, UnipoolSnapshot};
use givpower_types::{HolderAddress, Timestamp};

// Decoding and importing arbitrary snapshot bytes must never panic, and an
// accepted snapshot must export unchanged.
fuzz_target!(|data: &[u8]| {
    let Ok(snapshot) = bincode::deserialize::<UnipoolSnapshot>(data) else {
        return;
    };
    let Ok(accrual) = RewardAccrual::from_snapshot(HolderAddress::ZERO, snapshot.clone()) else {
        return;
    };
    assert_eq!(accrual.snapshot(), snapshot);
    let _ = accrual.reward_per_token(Timestamp::new(u64::MAX));
    for (holder, _) in accrual.holders() {
        let _ = accrual.earned(holder, Timestamp::new(u64::MAX));
    }
});
