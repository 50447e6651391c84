use proptest::prelude::*;

use givpower_nullables::NullToken;
use givpower_power::{calculate_power, isqrt, PowerConfig, PowerLedger};
use givpower_types::{HolderAddress, Timestamp, DAY_SECS, SCALE};

const ROUND: u64 = 14 * DAY_SECS;

#[derive(Clone, Debug)]
enum Op {
    Wrap { holder: u64, amount: u128 },
    Unwrap { holder: u64, amount: u128 },
    Lock { holder: u64, amount: u128, rounds: u64 },
    Unlock { round_back: u64 },
    Fund { reward: u128 },
    Advance { secs: u64 },
}

// Whole tokens keep any non-zero supply at or above SCALE, which bounds the
// accumulator growth per second.
fn whole_tokens() -> impl Strategy<Value = u128> {
    (1u128..1_000).prop_map(|n| n * SCALE)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u64..4, whole_tokens()).prop_map(|(holder, amount)| Op::Wrap { holder, amount }),
        (1u64..4, whole_tokens()).prop_map(|(holder, amount)| Op::Unwrap { holder, amount }),
        (1u64..4, whole_tokens(), 1u64..30)
            .prop_map(|(holder, amount, rounds)| Op::Lock { holder, amount, rounds }),
        (0u64..4).prop_map(|round_back| Op::Unlock { round_back }),
        (0u128..1_000_000 * SCALE).prop_map(|reward| Op::Fund { reward }),
        (0u64..3 * ROUND).prop_map(|secs| Op::Advance { secs }),
    ]
}

fn funder() -> HolderAddress {
    HolderAddress::from_low_u64(901)
}

proptest! {
    /// `isqrt` returns the floor square root.
    #[test]
    fn isqrt_is_floor_root(n in any::<u128>()) {
        let r = isqrt(n);
        prop_assert!(r.checked_mul(r).map_or(false, |sq| sq <= n));
        let next = r + 1;
        prop_assert!(next.checked_mul(next).map_or(true, |sq| sq > n));
    }

    /// Zero rounds leaves the amount unchanged.
    #[test]
    fn zero_rounds_is_identity(amount in any::<u128>()) {
        prop_assert_eq!(calculate_power(amount, 0).unwrap(), amount);
    }

    /// More rounds means strictly more power once the amount is large enough.
    #[test]
    fn power_strictly_increases_with_rounds(
        amount in 1_000_000u128..1_000_000_000 * SCALE,
        rounds in 0u64..10_000,
    ) {
        let a = calculate_power(amount, rounds).unwrap();
        let b = calculate_power(amount, rounds + 1).unwrap();
        prop_assert!(b > a, "power({}, {}) = {} not below {}", amount, rounds, a, b);
    }

    /// Power never decreases with the amount.
    #[test]
    fn power_monotonic_in_amount(
        amount in 0u128..1_000_000_000 * SCALE,
        extra in 0u128..1_000 * SCALE,
        rounds in 0u64..1_000,
    ) {
        prop_assert!(calculate_power(amount + extra, rounds).unwrap() >= calculate_power(amount, rounds).unwrap());
    }

    /// Within 1e-9 relative error of `amount × √(1 + rounds)`.
    #[test]
    fn power_precision(amount in 1_000_000_000_000u128..1_000_000 * SCALE, rounds in 0u64..1_000) {
        let exact = amount as f64 * ((rounds + 1) as f64).sqrt();
        let got = calculate_power(amount, rounds).unwrap() as f64;
        prop_assert!((got / exact - 1.0).abs() <= 1e-9, "relative error too large: {} vs {}", got, exact);
    }

    /// Supply equals the sum of balances, and each balance is principal plus
    /// bonuses, after any sequence of operations. Failed operations are fine;
    /// they must just leave the ledger consistent.
    #[test]
    fn invariants_survive_random_operations(ops in proptest::collection::vec(op(), 1..40)) {
        let config = PowerConfig { reward_distribution: funder(), ..PowerConfig::default() };
        let mut ledger = PowerLedger::new(&config).unwrap();
        let mut token = NullToken::new();
        for n in 1..4 {
            token.mint(&HolderAddress::from_low_u64(n), 10_000 * SCALE);
        }
        let mut now = 0u64;

        for op in ops {
            let t = Timestamp::new(now);
            match op {
                Op::Wrap { holder, amount } => {
                    let _ = ledger.wrap(&HolderAddress::from_low_u64(holder), amount, t, &mut token);
                }
                Op::Unwrap { holder, amount } => {
                    let _ = ledger.unwrap(&HolderAddress::from_low_u64(holder), amount, t, &mut token);
                }
                Op::Lock { holder, amount, rounds } => {
                    let _ = ledger.lock(&HolderAddress::from_low_u64(holder), amount, rounds, t);
                }
                Op::Unlock { round_back } => {
                    let round = ledger.current_round(t).saturating_sub(round_back);
                    let holders = ledger.unlockable_holders(round);
                    let report = ledger.unlock(&holders, round, t).unwrap();
                    prop_assert!(report.failed.is_empty());
                    prop_assert!(report.skipped.is_empty());
                }
                Op::Fund { reward } => {
                    let _ = ledger.notify_reward_amount(&funder(), reward, t);
                }
                Op::Advance { secs } => now += secs,
            }
            prop_assert_eq!(ledger.check_invariants(), Ok(()));
            prop_assert_eq!(token.custody(), principal_sum(&ledger));
        }
    }
}

fn principal_sum(ledger: &PowerLedger) -> u128 {
    (1..4)
        .map(|n| ledger.principal_of(&HolderAddress::from_low_u64(n)))
        .sum()
}
