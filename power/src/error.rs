//! Power ledger errors.

use givpower_accrual::AccrualError;
use givpower_types::Round;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PowerError {
    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("cannot lock for zero rounds")]
    ZeroRounds,

    #[error("cannot lock for {requested} rounds, maximum is {max}")]
    TooManyRounds { requested: u64, max: u64 },

    #[error("insufficient unlocked principal: need {needed}, available {available}")]
    InsufficientUnlockedPrincipal { needed: u128, available: u128 },

    #[error("round {until_round} has not finished, current round is {current_round}")]
    RoundNotFinished { until_round: Round, current_round: Round },

    #[error("GIVpower is not transferable")]
    NonTransferable,

    #[error("arithmetic overflow in power computation")]
    Overflow,

    #[error("round duration must be non-zero")]
    InvalidRoundDuration,

    #[error("custody of the underlying token failed: {0}")]
    Custody(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Accrual(#[from] AccrualError),
}

/// Coarse error classes callers branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Zero or out-of-domain amount/rounds, or more than the unlocked principal.
    InvalidAmount,
    /// `unlock` before the target round elapsed.
    RoundNotFinished,
    /// Any transfer or allowance mutation.
    NonTransferableOperation,
    /// An intermediate value left the representable range.
    ArithmeticOverflow,
    /// Caller lacks the role the action requires.
    Unauthorized,
    /// Invalid configuration or reward period state.
    Configuration,
    /// An external collaborator (token custody, reward distributor, store) failed.
    Collaborator,
}

impl PowerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PowerError::ZeroAmount
            | PowerError::ZeroRounds
            | PowerError::TooManyRounds { .. }
            | PowerError::InsufficientUnlockedPrincipal { .. } => ErrorKind::InvalidAmount,
            PowerError::RoundNotFinished { .. } => ErrorKind::RoundNotFinished,
            PowerError::NonTransferable => ErrorKind::NonTransferableOperation,
            PowerError::Overflow => ErrorKind::ArithmeticOverflow,
            PowerError::InvalidRoundDuration | PowerError::Config(_) => ErrorKind::Configuration,
            PowerError::Custody(_) | PowerError::Store(_) => ErrorKind::Collaborator,
            PowerError::Accrual(e) => match e {
                AccrualError::ZeroAmount | AccrualError::InsufficientBalance { .. } => {
                    ErrorKind::InvalidAmount
                }
                AccrualError::Unauthorized(_) => ErrorKind::Unauthorized,
                AccrualError::PeriodNotFinished
                | AccrualError::InvalidDuration
                | AccrualError::SupplyMismatch { .. } => ErrorKind::Configuration,
                AccrualError::Overflow => ErrorKind::ArithmeticOverflow,
                AccrualError::Distributor(_) => ErrorKind::Collaborator,
            },
        }
    }
}
