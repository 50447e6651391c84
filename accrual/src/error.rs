//! Reward accrual errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccrualError {
    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("caller {0} is not authorized for this action")]
    Unauthorized(String),

    #[error("reward period has not finished yet")]
    PeriodNotFinished,

    #[error("reward duration must be non-zero")]
    InvalidDuration,

    #[error("holder balances sum to {sum}, snapshot total supply is {total_supply}")]
    SupplyMismatch { sum: u128, total_supply: u128 },

    #[error("arithmetic overflow in reward computation")]
    Overflow,

    #[error("reward distributor rejected allocation: {0}")]
    Distributor(String),
}
