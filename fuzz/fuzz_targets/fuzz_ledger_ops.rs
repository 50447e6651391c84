#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use givpower_nullables::{NullDistributor, NullToken};
use givpower_power::{PowerConfig, PowerLedger};
use givpower_types::{HolderAddress, Timestamp};

#[derive(Arbitrary, Debug)]
enum Op {
    Wrap { holder: u8, amount: u128 },
    Unwrap { holder: u8, amount: u128 },
    Lock { holder: u8, amount: u128, rounds: u8 },
    Unlock { round: u64 },
    Notify { reward: u128 },
    Claim { holder: u8 },
    Advance { secs: u32 },
}

fn holder(n: u8) -> HolderAddress {
    HolderAddress::from_low_u64(u64::from(n % 4) + 1)
}

// Arbitrary operation sequences must never panic and must never break the
// ledger's cross-structure invariants, whether the operations succeed or not.
fuzz_target!(|ops: Vec<Op>| {
    let funder = HolderAddress::from_low_u64(901);
    let config = PowerConfig {
        reward_distribution: funder,
        ..PowerConfig::default()
    };
    let Ok(mut ledger) = PowerLedger::new(&config) else {
        return;
    };
    let mut token = NullToken::new();
    for n in 0..4 {
        token.mint(&holder(n), u128::MAX / 8);
    }
    let mut distro = NullDistributor::new();
    let mut now = 0u64;

    for op in ops {
        let t = Timestamp::new(now);
        match op {
            Op::Wrap { holder: h, amount } => {
                let _ = ledger.wrap(&holder(h), amount, t, &mut token);
            }
            Op::Unwrap { holder: h, amount } => {
                let _ = ledger.unwrap(&holder(h), amount, t, &mut token);
            }
            Op::Lock { holder: h, amount, rounds } => {
                let _ = ledger.lock(&holder(h), amount, u64::from(rounds), t);
            }
            Op::Unlock { round } => {
                let holders = ledger.unlockable_holders(round);
                let _ = ledger.unlock(&holders, round, t);
            }
            Op::Notify { reward } => {
                let _ = ledger.notify_reward_amount(&funder, reward, t);
            }
            Op::Claim { holder: h } => {
                let _ = ledger.get_reward(&holder(h), t, &mut distro);
            }
            Op::Advance { secs } => now = now.saturating_add(u64::from(secs)),
        }
        assert_eq!(ledger.check_invariants(), Ok(()));
    }
});
