//! Engine Benchmarks
//!
//! Run with: `cargo bench --package verdict-benchmarks --bench engine_benchmarks`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::time::Duration;
use verdict_benchmarks::{campaign_opened, sample_book, sample_tops, sample_vote, window_end};
use verdict_consensus::{
    ArbiterInput, ArbiterMode, AutoResolvePolicy, CommunityVerdict, SuperArbiterBlender,
};
use verdict_core::{Amount, ContentId, Decision, ParticipantId, Score};
use verdict_economics::{derive_economics, project_settlements};
use verdict_engine::ModerationEngine;

// ============================================================================
// WEIGHTING
// ============================================================================

fn weighting_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("weighting");
    let engine = ModerationEngine::default();
    let content = ContentId::new("bench");
    let vote = sample_vote(&content, 7);

    group.bench_function("weigh_vote", |b| {
        b.iter(|| engine.weight_calculator().weigh(black_box(&vote)))
    });

    group.finish();
}

// ============================================================================
// CONSENSUS
// ============================================================================

fn consensus_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("consensus");
    group.measurement_time(Duration::from_secs(10));

    let engine = ModerationEngine::default();
    let econ = match engine.derive_economics(Amount::from_units(10), 100) {
        Ok(econ) => econ,
        Err(e) => panic!("bench economics: {}", e),
    };
    let end = window_end(econ.duration_days);

    for voters in [22u32, 100, 1_000, 10_000] {
        let book = sample_book(voters);
        group.throughput(Throughput::Elements(voters as u64));
        group.bench_with_input(BenchmarkId::new("tally_and_evaluate", voters), &book, |b, book| {
            b.iter(|| {
                engine.evaluate_book(
                    black_box(book),
                    &econ,
                    campaign_opened(),
                    end,
                    AutoResolvePolicy::Escalate,
                )
            })
        });
    }

    let tally = engine.tally(&sample_book(1_000));
    group.bench_function("evaluate_closed_window", |b| {
        b.iter(|| engine.evaluate(black_box(&tally), &econ, end, end, AutoResolvePolicy::MajorityWins))
    });

    let blender = SuperArbiterBlender::new(engine.config().arbiter.clone());
    let community = CommunityVerdict::new(Score::MIDPOINT, Decision::Accept);
    group.bench_function("blend", |b| {
        b.iter(|| {
            blender.blend(
                black_box(community),
                Some(ArbiterInput::new(
                    ParticipantId::new("arbiter"),
                    Score::MAX,
                    Decision::Reject,
                )),
            )
        })
    });

    let closed = engine.evaluate(&tally, &econ, end, end, AutoResolvePolicy::Escalate);
    group.bench_function("blend_result_always", |b| {
        b.iter(|| engine.blend(black_box(&closed), None, ArbiterMode::Always))
    });

    group.finish();
}

// ============================================================================
// ECONOMICS
// ============================================================================

fn economics_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("economics");
    let engine = ModerationEngine::default();

    for n in [10i64, 1_000, 1_000_000] {
        group.bench_with_input(BenchmarkId::new("derive", n), &n, |b, &n| {
            b.iter(|| derive_economics(black_box(Amount::from_units(25)), black_box(n)))
        });
    }

    let econ = match engine.derive_economics(Amount::from_units(25), 5_000) {
        Ok(econ) => econ,
        Err(e) => panic!("bench economics: {}", e),
    };
    group.bench_function("project_5000", |b| {
        b.iter(|| project_settlements(engine.settlement_calculator(), black_box(&econ), 1))
    });

    group.finish();
}

// ============================================================================
// SETTLEMENT
// ============================================================================

fn settlement_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("settlement");
    let engine = ModerationEngine::default();
    let econ = match engine.derive_economics(Amount::from_units(20), 1_000) {
        Ok(econ) => econ,
        Err(e) => panic!("bench economics: {}", e),
    };
    let tops = sample_tops(3);

    for count in [0u64, 250, 500, 1_000] {
        group.bench_with_input(BenchmarkId::new("settle", count), &count, |b, &count| {
            b.iter(|| engine.settle(&econ, black_box(count), &tops))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    weighting_benchmarks,
    consensus_benchmarks,
    economics_benchmarks,
    settlement_benchmarks
);
criterion_main!(benches);
