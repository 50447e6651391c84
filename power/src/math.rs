//! The power curve.
//!
//! Locking `amount` for `rounds` rounds yields `amount × √(rounds + 1)` of
//! power, evaluated in fixed point:
//!
//! `power = amount × isqrt((rounds + 1) × SCALE) / isqrt(SCALE)`
//!
//! `isqrt(SCALE)` is exactly `10^9`, so the only rounding is the floor of the
//! scaled root (relative error below `10^-9`) and the final floor division.

use crate::error::PowerError;
use givpower_types::SCALE;
use primitive_types::U256;

/// `isqrt(SCALE)`.
pub const SQRT_SCALE: u128 = 1_000_000_000;

/// `floor(√n)` by Newton's method.
///
/// Starts from a power-of-two overestimate; the iterates then decrease
/// monotonically and the first non-decreasing step marks the floor root.
pub fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let bits = 128 - n.leading_zeros();
    let mut x: u128 = 1 << bits.div_ceil(2);
    loop {
        let next = (x + n / x) / 2;
        if next >= x {
            return x;
        }
        x = next;
    }
}

/// Power granted for locking `amount` over `rounds` rounds.
///
/// `calculate_power(amount, 0) == amount`. Fails only when the result does
/// not fit in `u128`.
pub fn calculate_power(amount: u128, rounds: u64) -> Result<u128, PowerError> {
    let factor = (rounds as u128 + 1)
        .checked_mul(SCALE)
        .ok_or(PowerError::Overflow)?;
    let root = isqrt(factor);
    let power = U256::from(amount)
        .checked_mul(U256::from(root))
        .ok_or(PowerError::Overflow)?
        / U256::from(SQRT_SCALE);
    if power > U256::from(u128::MAX) {
        return Err(PowerError::Overflow);
    }
    Ok(power.low_u128())
}

/// The bonus a lock adds on top of its principal.
pub fn lock_bonus(amount: u128, rounds: u64) -> Result<u128, PowerError> {
    calculate_power(amount, rounds)?
        .checked_sub(amount)
        .ok_or(PowerError::Overflow)
}
