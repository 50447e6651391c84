//! givpower: command-line driver for the GIVpower ledger.

mod scenario;

use anyhow::{Context, Result};
use clap::Parser;
use givpower_power::{calculate_power, PowerConfig};
use givpower_types::{format_ether, parse_ether, Timestamp};
use givpower_utils::{format_duration, init_logging, LogFormat};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "givpower", about = "GIVpower ledger tools")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "GIVPOWER_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "GIVPOWER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "GIVPOWER_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Start of round 0 in unix seconds.
    #[arg(long, env = "GIVPOWER_INITIAL_DATE")]
    initial_date: Option<u64>,

    /// Round length in seconds.
    #[arg(long, env = "GIVPOWER_ROUND_DURATION")]
    round_duration: Option<u64>,

    /// Longest accepted lock, in rounds.
    #[arg(long, env = "GIVPOWER_MAX_LOCK_ROUNDS")]
    max_lock_rounds: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Power granted for locking an amount for a number of rounds.
    Power {
        /// Decimal token amount, e.g. "100" or "0.5".
        #[arg(long)]
        amount: String,

        #[arg(long)]
        rounds: u64,

        /// Print the raw value as a zero-padded 32-byte hex word.
        #[arg(long)]
        hex: bool,
    },
    /// Current round and its time window.
    Round {
        /// Unix time to evaluate at (defaults to now).
        #[arg(long)]
        at: Option<u64>,
    },
    /// Replay a scenario file and print the resulting ledger as JSON.
    Simulate { scenario: PathBuf },
}

fn load_config(cli: &Cli) -> Result<PowerConfig> {
    let mut config = match &cli.config {
        Some(path) => PowerConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PowerConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format.to_string();
    }
    if let Some(date) = cli.initial_date {
        config.initial_date = date;
    }
    if let Some(duration) = cli.round_duration {
        config.round_duration = duration;
    }
    if let Some(max) = cli.max_lock_rounds {
        config.max_lock_rounds = max;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Power { amount, rounds, hex } => {
            let raw = parse_ether(&amount).with_context(|| format!("invalid amount {amount:?}"))?;
            let power = calculate_power(raw, rounds)?;
            if hex {
                println!("0x{power:064x}");
            } else {
                println!("{}", format_ether(power));
            }
        }
        Command::Round { at } => {
            let clock = config.round_clock()?;
            let now = at.map(Timestamp::new).unwrap_or_else(Timestamp::now);
            let round = clock.current_round(now);
            let out = json!({
                "now": now.as_secs(),
                "round": round,
                "round_start": clock.round_start(round)?.as_secs(),
                "round_end": clock.round_end(round)?.as_secs(),
                "round_duration": format_duration(clock.round_duration()),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::Simulate { scenario } => {
            let parsed = scenario::Scenario::from_toml_file(&scenario)?;
            tracing::info!(steps = parsed.steps.len(), "replaying {}", scenario.display());
            let report = scenario::run(&config, &parsed)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
