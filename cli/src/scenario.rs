//! Scenario replay against in-memory collaborators.
//!
//! A scenario is a TOML file with an optional start time and a list of
//! `[[step]]` tables. Amounts are decimal token strings ("100", "0.5").
//! Failing steps are recorded and the replay continues.

use anyhow::{Context, Result};
use givpower_nullables::{NullClock, NullDistributor, NullToken};
use givpower_power::{LedgerEvent, PowerConfig, PowerLedger};
use givpower_types::{format_ether, parse_ether, HolderAddress, Round, DAY_SECS};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// Unix time the replay starts at. Defaults to the configured initial date.
    pub start: Option<u64>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Give a holder underlying tokens to wrap.
    Mint { holder: HolderAddress, amount: String },
    Wrap { holder: HolderAddress, amount: String },
    Unwrap { holder: HolderAddress, amount: String },
    Lock {
        holder: HolderAddress,
        amount: String,
        rounds: u64,
    },
    /// Unlock `round` (default: the current round) for the listed holders, or
    /// for every holder with a lock there when the list is empty.
    Unlock {
        #[serde(default)]
        holders: Vec<HolderAddress>,
        round: Option<Round>,
    },
    Advance {
        #[serde(default)]
        days: u64,
        #[serde(default)]
        seconds: u64,
    },
    /// Fund a reward period as the configured reward distribution address.
    Notify { reward: String },
    Claim { holder: HolderAddress },
}

impl Scenario {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing scenario")
    }
}

#[derive(Debug, Serialize)]
pub struct HolderReport {
    pub address: HolderAddress,
    pub balance: String,
    pub principal: String,
    pub unlocked_principal: String,
    pub earned: String,
    pub locks: Vec<LockReport>,
}

#[derive(Debug, Serialize)]
pub struct LockReport {
    pub until_round: Round,
    pub amount: String,
    pub bonus: String,
}

#[derive(Debug, Serialize)]
pub struct StepFailure {
    pub step: usize,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub now: u64,
    pub round: Round,
    pub total_supply: String,
    pub holders: Vec<HolderReport>,
    pub failures: Vec<StepFailure>,
    pub events: Vec<LedgerEvent>,
}

/// Replay `scenario` on a fresh ledger built from `config`.
pub fn run(config: &PowerConfig, scenario: &Scenario) -> Result<SimulationReport> {
    let mut ledger = PowerLedger::new(config).context("building ledger")?;
    let clock = NullClock::new(scenario.start.unwrap_or(config.initial_date));
    let mut token = NullToken::new();
    let mut distro = NullDistributor::new();
    let mut failures = Vec::new();
    let mut seen = Vec::new();

    for (index, step) in scenario.steps.iter().enumerate() {
        let result = apply(&mut ledger, &clock, &mut token, &mut distro, config, step);
        if let Err(err) = result {
            tracing::warn!(step = index, error = %err, "scenario step failed");
            failures.push(StepFailure {
                step: index,
                error: format!("{err:#}"),
            });
        }
        for holder in touched(step) {
            if !seen.contains(&holder) {
                seen.push(holder);
            }
        }
    }

    let now = clock.now();
    seen.sort();
    let mut holders = Vec::new();
    for holder in seen {
        let locks = ledger
            .user_locks(&holder)
            .map(|l| {
                l.by_round
                    .iter()
                    .map(|(round, entry)| LockReport {
                        until_round: *round,
                        amount: format_ether(entry.amount),
                        bonus: format_ether(entry.bonus),
                    })
                    .collect()
            })
            .unwrap_or_default();
        holders.push(HolderReport {
            address: holder,
            balance: format_ether(ledger.balance_of(&holder)),
            principal: format_ether(ledger.principal_of(&holder)),
            unlocked_principal: format_ether(ledger.unlocked_principal(&holder)),
            earned: format_ether(ledger.earned(&holder, now)?),
            locks,
        });
    }

    Ok(SimulationReport {
        now: now.as_secs(),
        round: ledger.current_round(now),
        total_supply: format_ether(ledger.total_supply()),
        holders,
        failures,
        events: ledger.drain_events(),
    })
}

fn apply(
    ledger: &mut PowerLedger,
    clock: &NullClock,
    token: &mut NullToken,
    distro: &mut NullDistributor,
    config: &PowerConfig,
    step: &Step,
) -> Result<()> {
    let now = clock.now();
    match step {
        Step::Mint { holder, amount } => token.mint(holder, amount_of(amount)?),
        Step::Wrap { holder, amount } => ledger.wrap(holder, amount_of(amount)?, now, token)?,
        Step::Unwrap { holder, amount } => {
            ledger.unwrap(holder, amount_of(amount)?, now, token)?
        }
        Step::Lock {
            holder,
            amount,
            rounds,
        } => {
            let receipt = ledger.lock(holder, amount_of(amount)?, *rounds, now)?;
            tracing::info!(
                holder = %holder,
                until_round = receipt.until_round,
                power = %format_ether(receipt.power),
                "locked"
            );
        }
        Step::Unlock { holders, round } => {
            let round = round.unwrap_or_else(|| ledger.current_round(now));
            let holders = if holders.is_empty() {
                ledger.unlockable_holders(round)
            } else {
                holders.clone()
            };
            let report = ledger.unlock(&holders, round, now)?;
            if let Some((holder, err)) = report.failed.into_iter().next() {
                anyhow::bail!("unlocking {holder}: {err}");
            }
        }
        Step::Advance { days, seconds } => {
            clock.advance(days.saturating_mul(DAY_SECS).saturating_add(*seconds));
        }
        Step::Notify { reward } => {
            ledger.notify_reward_amount(&config.reward_distribution, amount_of(reward)?, now)?;
        }
        Step::Claim { holder } => {
            ledger.get_reward(holder, now, distro)?;
        }
    }
    Ok(())
}

fn amount_of(s: &str) -> Result<u128> {
    parse_ether(s).with_context(|| format!("invalid amount {s:?}"))
}

fn touched(step: &Step) -> Vec<HolderAddress> {
    match step {
        Step::Mint { .. } | Step::Advance { .. } | Step::Notify { .. } => Vec::new(),
        Step::Wrap { holder, .. }
        | Step::Unwrap { holder, .. }
        | Step::Lock { holder, .. }
        | Step::Claim { holder } => vec![*holder],
        Step::Unlock { holders, .. } => holders.clone(),
    }
}
