use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use givpower_accrual::RewardAccrual;
use givpower_types::{HolderAddress, Timestamp, SCALE};

fn make_accrual_with_holders(n: u64) -> RewardAccrual {
    let funder = HolderAddress::from_low_u64(u64::MAX);
    let mut accrual =
        RewardAccrual::new(HolderAddress::ZERO, HolderAddress::ZERO, funder, 1_209_600).unwrap();
    accrual
        .notify_reward_amount(&funder, 1_000_000 * SCALE, Timestamp::new(0))
        .unwrap();
    for i in 0..n {
        accrual
            .stake(&HolderAddress::from_low_u64(i + 1), (i as u128 + 1) * SCALE, Timestamp::new(i))
            .unwrap();
    }
    accrual
}

fn bench_earned(c: &mut Criterion) {
    let mut group = c.benchmark_group("accrual_earned");
    for holders in [1u64, 100, 10_000] {
        let accrual = make_accrual_with_holders(holders);
        let holder = HolderAddress::from_low_u64(1);
        group.bench_with_input(BenchmarkId::new("earned", holders), &holders, |b, _| {
            b.iter(|| black_box(accrual.earned(black_box(&holder), Timestamp::new(600_000))));
        });
    }
    group.finish();
}

fn bench_stake(c: &mut Criterion) {
    let mut group = c.benchmark_group("accrual_stake");
    for holders in [1u64, 100, 10_000] {
        group.bench_with_input(BenchmarkId::new("plan_stake", holders), &holders, |b, &n| {
            let accrual = make_accrual_with_holders(n);
            let holder = HolderAddress::from_low_u64(n + 1);
            b.iter(|| black_box(accrual.plan_stake(&holder, SCALE, Timestamp::new(700_000))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_earned, bench_stake);
criterion_main!(benches);
