use givpower_accrual::{HolderRewardState, UnipoolSnapshot};
use givpower_nullables::{NullClock, NullDistributor, NullStore, NullToken};
use givpower_power::{
    calculate_power, lock_bonus, ErrorKind, LedgerEvent, PowerConfig, PowerError, PowerLedger,
};
use givpower_types::{parse_ether, HolderAddress, Timestamp, DAY_SECS, SCALE};
use std::collections::BTreeMap;

const ROUND: u64 = 14 * DAY_SECS;
const GENESIS: u64 = 1_640_361_600;

fn addr(n: u64) -> HolderAddress {
    HolderAddress::from_low_u64(n)
}

fn owner() -> HolderAddress {
    addr(900)
}

fn funder() -> HolderAddress {
    addr(901)
}

fn config() -> PowerConfig {
    PowerConfig {
        initial_date: GENESIS,
        owner: owner(),
        reward_distribution: funder(),
        token_distro: addr(902),
        ..PowerConfig::default()
    }
}

fn ether(s: &str) -> u128 {
    parse_ether(s).unwrap()
}

fn setup() -> (PowerLedger, NullClock, NullToken) {
    let ledger = PowerLedger::new(&config()).unwrap();
    let clock = NullClock::new(GENESIS);
    let mut token = NullToken::new();
    for n in 1..=5 {
        token.mint(&addr(n), ether("1000"));
    }
    (ledger, clock, token)
}

#[test]
fn wraps_locks_unlocks_and_unwraps() {
    let (mut ledger, clock, mut token) = setup();
    let holder = addr(1);
    let lock_amount = ether("100");
    let wrap_amount = 2 * lock_amount;
    let bonus = calculate_power(lock_amount, 1).unwrap() - lock_amount;

    let expected = lock_amount as f64 * (2f64.sqrt() - 1.0);
    assert!((expected / bonus as f64 - 1.0).abs() <= 1e-9);

    ledger.wrap(&holder, wrap_amount, clock.now(), &mut token).unwrap();
    assert_eq!(
        ledger.drain_events(),
        vec![
            LedgerEvent::Staked { holder, amount: wrap_amount },
            LedgerEvent::mint(holder, wrap_amount),
        ]
    );
    assert_eq!(ledger.balance_of(&holder), wrap_amount);

    clock.advance(3 * DAY_SECS);
    let until_round = ledger.current_round(clock.now()) + 1;
    let receipt = ledger.lock(&holder, lock_amount, 1, clock.now()).unwrap();
    assert_eq!(receipt.until_round, until_round);
    assert_eq!(
        ledger.drain_events(),
        vec![
            LedgerEvent::Staked { holder, amount: bonus },
            LedgerEvent::mint(holder, bonus),
            LedgerEvent::TokenLocked { holder, amount: lock_amount, rounds: 1, until_round },
        ]
    );
    assert_eq!(ledger.balance_of(&holder), wrap_amount + bonus);

    ledger
        .unwrap(&holder, wrap_amount - lock_amount, clock.now(), &mut token)
        .unwrap();
    assert_eq!(
        ledger.drain_events(),
        vec![
            LedgerEvent::Withdrawn { holder, amount: wrap_amount - lock_amount },
            LedgerEvent::burn(holder, wrap_amount - lock_amount),
        ]
    );

    clock.advance(2 * ROUND);
    let report = ledger.unlock(&[holder], until_round, clock.now()).unwrap();
    assert_eq!(report.unlocked.len(), 1);
    assert_eq!(
        ledger.drain_events(),
        vec![
            LedgerEvent::Withdrawn { holder, amount: bonus },
            LedgerEvent::burn(holder, bonus),
            LedgerEvent::TokenUnlocked { holder, amount: lock_amount, until_round },
        ]
    );
    assert_eq!(ledger.balance_of(&holder), lock_amount);

    ledger.unwrap(&holder, lock_amount, clock.now(), &mut token).unwrap();
    assert_eq!(ledger.balance_of(&holder), 0);
    assert_eq!(ledger.total_supply(), 0);
    assert_eq!(token.balance_of(&holder), ether("1000"));
    assert_eq!(token.custody(), 0);
    ledger.check_invariants().unwrap();
}

#[test]
fn unlock_waits_for_the_target_round() {
    let (mut ledger, clock, mut token) = setup();
    let holder = addr(1);
    ledger.wrap(&holder, 3 * SCALE, clock.now(), &mut token).unwrap();
    let receipt = ledger.lock(&holder, SCALE, 2, clock.now()).unwrap();
    assert_eq!(ledger.balance_of(&holder), 3 * SCALE + lock_bonus(SCALE, 2).unwrap());

    clock.advance_days(27);
    let err = ledger
        .unlock(&[holder], receipt.until_round, clock.now())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RoundNotFinished);
    assert!(ledger.lock_at(&holder, receipt.until_round).is_some());

    clock.advance_days(1);
    let report = ledger
        .unlock(&[holder], receipt.until_round, clock.now())
        .unwrap();
    assert_eq!(report.unlocked.len(), 1);
    assert_eq!(ledger.balance_of(&holder), 3 * SCALE);
    assert!(ledger.lock_at(&holder, receipt.until_round).is_none());
}

#[test]
fn power_matches_reference_precision() {
    let amount = 10_000_000_000u128;
    let sqrt2 = 14_142_135_623i128;
    let sqrt11 = 33_166_247_903i128;
    assert!((calculate_power(amount, 1).unwrap() as i128 - sqrt2).abs() <= 20);
    assert!((calculate_power(amount, 10).unwrap() as i128 - sqrt11).abs() <= 20);
}

#[test]
fn batch_unlock_reports_each_holder() {
    let (mut ledger, clock, mut token) = setup();
    for n in 1..=3 {
        ledger.wrap(&addr(n), 10 * SCALE, clock.now(), &mut token).unwrap();
    }
    ledger.lock(&addr(1), 5 * SCALE, 2, clock.now()).unwrap();
    ledger.lock(&addr(2), SCALE, 2, clock.now()).unwrap();
    ledger.lock(&addr(3), SCALE, 4, clock.now()).unwrap();
    assert_eq!(ledger.unlockable_holders(2), vec![addr(1), addr(2)]);

    clock.advance(2 * ROUND);
    let holders = ledger.unlockable_holders(2);
    let report = ledger
        .unlock(&[holders[0], addr(3), holders[1], addr(4)], 2, clock.now())
        .unwrap();
    assert_eq!(report.unlocked.len(), 2);
    assert_eq!(report.skipped, vec![addr(3), addr(4)]);
    assert!(report.failed.is_empty());
    assert!(ledger.lock_at(&addr(3), 4).is_some());
    assert_eq!(ledger.total_supply(), 30 * SCALE + lock_bonus(SCALE, 4).unwrap());
    ledger.check_invariants().unwrap();
}

#[test]
fn custody_failure_changes_nothing() {
    let (mut ledger, clock, mut token) = setup();
    ledger.wrap(&addr(1), SCALE, clock.now(), &mut token).unwrap();
    ledger.drain_events();
    token.set_paused(true);

    let err = ledger.unwrap(&addr(1), SCALE, clock.now(), &mut token).unwrap_err();
    assert!(matches!(err, PowerError::Custody(_)));
    assert_eq!(ledger.balance_of(&addr(1)), SCALE);
    assert_eq!(ledger.principal_of(&addr(1)), SCALE);
    assert!(ledger.drain_events().is_empty());

    let err = ledger
        .wrap(&addr(2), ether("2000"), clock.now(), &mut token)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Collaborator);
}

#[test]
fn equal_stakers_split_rewards_evenly() {
    let (mut ledger, clock, mut token) = setup();
    ledger.wrap(&addr(1), 10 * SCALE, clock.now(), &mut token).unwrap();
    ledger.wrap(&addr(2), 10 * SCALE, clock.now(), &mut token).unwrap();
    let budget = ether("1209600");
    ledger.notify_reward_amount(&funder(), budget, clock.now()).unwrap();

    clock.advance(ROUND * 3);
    let a = ledger.earned(&addr(1), clock.now()).unwrap();
    let b = ledger.earned(&addr(2), clock.now()).unwrap();
    assert_eq!(a, b);
    assert!(a + b <= budget);
    assert!(budget - (a + b) <= 2);

    let mut distro = NullDistributor::new();
    assert_eq!(ledger.get_reward(&addr(1), clock.now(), &mut distro).unwrap(), a);
    assert_eq!(distro.allocated_to(&addr(1)), a);

    distro.fail_next();
    let err = ledger.get_reward(&addr(2), clock.now(), &mut distro).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Collaborator);
    assert_eq!(ledger.earned(&addr(2), clock.now()).unwrap(), b);
}

#[test]
fn late_holders_share_only_from_their_first_deposit() {
    let (mut ledger, clock, mut token) = setup();
    ledger.wrap(&addr(1), 10 * SCALE, clock.now(), &mut token).unwrap();
    // One token per second over the round.
    let budget = ether("1209600");
    ledger.notify_reward_amount(&funder(), budget, clock.now()).unwrap();

    clock.advance(ROUND / 4);
    ledger.wrap(&addr(2), 10 * SCALE, clock.now(), &mut token).unwrap();
    assert_eq!(ledger.earned(&addr(2), clock.now()).unwrap(), 0);

    clock.advance(ROUND / 4);
    ledger.wrap(&addr(3), 10 * SCALE, clock.now(), &mut token).unwrap();
    ledger.lock(&addr(3), 10 * SCALE, 3, clock.now()).unwrap();
    assert_eq!(ledger.balance_of(&addr(3)), 20 * SCALE);
    assert_eq!(ledger.earned(&addr(3), clock.now()).unwrap(), 0);

    clock.advance(ROUND / 2);
    let a = ledger.earned(&addr(1), clock.now()).unwrap();
    let b = ledger.earned(&addr(2), clock.now()).unwrap();
    let c = ledger.earned(&addr(3), clock.now()).unwrap();
    // Alone for a quarter, 1:1 for a quarter, then 10:10:20 for the last half.
    assert_eq!(a, ether("604800"));
    assert_eq!(b, ether("302400"));
    assert_eq!(c, ether("302400"));
    assert!(a + b + c <= budget);
}

#[test]
fn locking_mid_period_boosts_reward_share() {
    let (mut ledger, clock, mut token) = setup();
    ledger.wrap(&addr(1), 10 * SCALE, clock.now(), &mut token).unwrap();
    ledger.wrap(&addr(2), 10 * SCALE, clock.now(), &mut token).unwrap();
    ledger.notify_reward_amount(&funder(), ether("1000"), clock.now()).unwrap();

    clock.advance(ROUND / 2);
    ledger.lock(&addr(1), 10 * SCALE, 3, clock.now()).unwrap();
    clock.advance(ROUND / 2);

    let a = ledger.earned(&addr(1), clock.now()).unwrap();
    let b = ledger.earned(&addr(2), clock.now()).unwrap();
    // First half split 1:1, second half 2:1.
    let expected_ratio = (0.5 / 2.0 + 0.5 * 2.0 / 3.0) / (0.5 / 2.0 + 0.5 / 3.0);
    assert!((a as f64 / b as f64 - expected_ratio).abs() < 1e-6);
}

#[test]
fn upgrade_preserves_unipool_storage() {
    let mut holders = BTreeMap::new();
    holders.insert(
        addr(1),
        HolderRewardState {
            balance: ether("700"),
            user_reward_per_token_paid: 123_456,
            rewards: ether("3.5"),
        },
    );
    holders.insert(
        addr(2),
        HolderRewardState {
            balance: ether("300"),
            user_reward_per_token_paid: 99,
            rewards: 0,
        },
    );
    let snapshot = UnipoolSnapshot {
        token_distro: addr(902),
        duration: ROUND,
        reward_distribution: funder(),
        period_finish: Timestamp::new(GENESIS + ROUND),
        reward_rate: 1_000_000,
        last_update_time: Timestamp::new(GENESIS + 10),
        reward_per_token_stored: 777_777,
        total_supply: ether("1000"),
        holders,
    };

    let mut ledger = PowerLedger::upgrade(&config(), snapshot.clone()).unwrap();
    assert_eq!(ledger.snapshot(), snapshot);
    assert_eq!(ledger.principal_of(&addr(1)), ether("700"));

    // Imported balances are lockable principal.
    let now = Timestamp::new(GENESIS + 20);
    ledger.lock(&addr(1), ether("100"), 1, now).unwrap();
    ledger.check_invariants().unwrap();

    let store = NullStore::new();
    ledger.save_to_store(&store).unwrap();
    let restored = PowerLedger::load_from_store(&store).unwrap();
    assert_eq!(restored.snapshot(), ledger.snapshot());
    assert_eq!(restored.user_locks(&addr(1)), ledger.user_locks(&addr(1)));
    assert_eq!(store.holder_count(), 2);
}

#[test]
fn inconsistent_snapshot_is_rejected() {
    let mut holders = BTreeMap::new();
    holders.insert(addr(1), HolderRewardState { balance: 5, ..Default::default() });
    let snapshot = UnipoolSnapshot {
        token_distro: addr(902),
        duration: ROUND,
        reward_distribution: funder(),
        period_finish: Timestamp::EPOCH,
        reward_rate: 0,
        last_update_time: Timestamp::EPOCH,
        reward_per_token_stored: 0,
        total_supply: 6,
        holders,
    };
    let err = PowerLedger::upgrade(&config(), snapshot).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn transfers_are_always_refused() {
    let (mut ledger, clock, mut token) = setup();
    ledger.wrap(&addr(1), SCALE, clock.now(), &mut token).unwrap();
    assert_eq!(ledger.transfer(&addr(1), &addr(2), 1), Err(PowerError::NonTransferable));
    assert_eq!(
        ledger.transfer_from(&addr(2), &addr(1), &addr(2), 1),
        Err(PowerError::NonTransferable)
    );
    assert_eq!(ledger.approve(&addr(1), &addr(2), 1), Err(PowerError::NonTransferable));
    assert_eq!(ledger.allowance(&addr(1), &addr(2)), 0);
    assert_eq!(ledger.balance_of(&addr(1)), SCALE);
}
