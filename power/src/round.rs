//! The round clock.
//!
//! Rounds are fixed-length buckets counted from the deployment's initial
//! date. `current_round` is a pure function of the timestamp it is given.

use crate::error::PowerError;
use givpower_types::{Round, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundClock {
    initial_date: Timestamp,
    round_duration: u64,
}

impl RoundClock {
    pub fn new(initial_date: Timestamp, round_duration: u64) -> Result<Self, PowerError> {
        if round_duration == 0 {
            return Err(PowerError::InvalidRoundDuration);
        }
        Ok(Self {
            initial_date,
            round_duration,
        })
    }

    pub fn initial_date(&self) -> Timestamp {
        self.initial_date
    }

    pub fn round_duration(&self) -> u64 {
        self.round_duration
    }

    /// `floor((now - initial_date) / round_duration)`, or 0 before the initial date.
    pub fn current_round(&self, now: Timestamp) -> Round {
        self.initial_date.elapsed_since(now) / self.round_duration
    }

    /// Whether `round` has started at `now`.
    ///
    /// A lock "until round r" matures once `r <= current_round(now)`.
    pub fn has_reached(&self, round: Round, now: Timestamp) -> bool {
        round <= self.current_round(now)
    }

    /// First second of `round`.
    pub fn round_start(&self, round: Round) -> Result<Timestamp, PowerError> {
        round
            .checked_mul(self.round_duration)
            .and_then(|offset| self.initial_date.checked_add_secs(offset))
            .ok_or(PowerError::Overflow)
    }

    /// First second after `round`.
    pub fn round_end(&self, round: Round) -> Result<Timestamp, PowerError> {
        let next = round.checked_add(1).ok_or(PowerError::Overflow)?;
        self.round_start(next)
    }
}
