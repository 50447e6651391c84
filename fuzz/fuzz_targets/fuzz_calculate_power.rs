#![no_main]

use libfuzzer_sys::fuzz_target;

use givpower_power::{calculate_power, isqrt};

// The power curve must never panic, must be the identity at zero rounds, and
// must never grant less than the locked amount.
fuzz_target!(|input: (u128, u64)| {
    let (amount, rounds) = input;

    let r = isqrt(amount);
    assert!(r.checked_mul(r).map_or(false, |sq| sq <= amount));

    if let Ok(power) = calculate_power(amount, rounds) {
        assert!(power >= amount);
        if rounds == 0 {
            assert_eq!(power, amount);
        }
    }
});
