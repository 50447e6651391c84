//! Checked fixed-point helpers.
//!
//! Products are formed in 256 bits so `elapsed × rate × SCALE` cannot wrap;
//! only the final quotient has to fit back into `u128`.

use crate::error::AccrualError;
use primitive_types::U256;

/// Narrow a 256-bit value to `u128`, failing instead of truncating.
pub fn narrow(value: U256) -> Result<u128, AccrualError> {
    if value > U256::from(u128::MAX) {
        return Err(AccrualError::Overflow);
    }
    Ok(value.low_u128())
}

/// `floor(a × b / denom)`.
pub fn mul_div(a: u128, b: u128, denom: u128) -> Result<u128, AccrualError> {
    if denom == 0 {
        return Err(AccrualError::Overflow);
    }
    let num = U256::from(a)
        .checked_mul(U256::from(b))
        .ok_or(AccrualError::Overflow)?;
    narrow(num / U256::from(denom))
}

/// `floor(a × b × c / denom)`.
pub fn mul3_div(a: u128, b: u128, c: u128, denom: u128) -> Result<u128, AccrualError> {
    if denom == 0 {
        return Err(AccrualError::Overflow);
    }
    let num = U256::from(a)
        .checked_mul(U256::from(b))
        .and_then(|ab| ab.checked_mul(U256::from(c)))
        .ok_or(AccrualError::Overflow)?;
    narrow(num / U256::from(denom))
}
