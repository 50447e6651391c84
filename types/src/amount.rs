//! Amount units.
//!
//! Amounts are raw `u128` integers with 18 implied decimals, the same scale as
//! the wrapped token. `SCALE` doubles as the fixed-point unit of the reward
//! accumulator and the power curve.

use crate::error::TypesError;

/// Number of decimals of one whole token.
pub const DECIMALS: u32 = 18;

/// One whole token in raw units (`10^18`).
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Parse a decimal token amount (e.g. `"100"`, `"0.25"`) into raw units.
///
/// More than 18 fractional digits is an error rather than a silent truncation.
pub fn parse_ether(s: &str) -> Result<u128, TypesError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(TypesError::InvalidAmount(s.to_string()));
    }
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if frac.len() > DECIMALS as usize
        || (whole.is_empty() && frac.is_empty())
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !frac.chars().all(|c| c.is_ascii_digit())
    {
        return Err(TypesError::InvalidAmount(s.to_string()));
    }

    let whole_raw: u128 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| TypesError::AmountOverflow(s.to_string()))?
    };
    let frac_raw: u128 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = DECIMALS as usize);
        padded
            .parse()
            .map_err(|_| TypesError::InvalidAmount(s.to_string()))?
    };

    whole_raw
        .checked_mul(SCALE)
        .and_then(|w| w.checked_add(frac_raw))
        .ok_or_else(|| TypesError::AmountOverflow(s.to_string()))
}

/// Render raw units as a decimal token amount without trailing zeros.
pub fn format_ether(raw: u128) -> String {
    let whole = raw / SCALE;
    let frac = raw % SCALE;
    if frac == 0 {
        return whole.to_string();
    }
    let frac_str = format!("{:018}", frac);
    format!("{}.{}", whole, frac_str.trim_end_matches('0'))
}
