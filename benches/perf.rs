use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use ump_terminal::classify::{HAWKEYE_MARGIN_FT, classify};
use ump_terminal::feed::{FeedCursor, parse_live_feed};
use ump_terminal::game_state::{BaseState, GameState, PitchOutcome};
use ump_terminal::run_exp::{ReContext, RunExpectancyTable};
use ump_terminal::zone::StrikeZone;

fn bench_classify(c: &mut Criterion) {
    let zone = StrikeZone::for_batter(6.17).unwrap();
    c.bench_function("classify_pitch", |b| {
        b.iter(|| {
            let verdict = classify(
                black_box(0.71),
                black_box(2.02),
                black_box(&zone),
                black_box(HAWKEYE_MARGIN_FT),
            );
            black_box(verdict)
        })
    });
}

fn bench_zone_resolve(c: &mut Criterion) {
    c.bench_function("zone_resolve", |b| {
        b.iter(|| {
            let zone = StrikeZone::for_batter(black_box(6.17)).unwrap();
            black_box(zone.edge_distance(0.3, 2.5))
        })
    });
}

fn bench_table_lookup(c: &mut Criterion) {
    let table = RunExpectancyTable::global();
    let ctx = ReContext {
        outs: 1,
        bases: BaseState::new(true, false, true),
        balls: 2,
        strikes: 1,
    };
    c.bench_function("run_expectancy_lookup", |b| {
        b.iter(|| black_box(table.lookup(black_box(&ctx)).unwrap()))
    });
}

fn bench_count_transitions(c: &mut Criterion) {
    c.bench_function("full_at_bat_transitions", |b| {
        b.iter(|| {
            let mut gs = GameState::new("SEA", "NYY");
            gs.apply_pitch(&PitchOutcome::CalledBall);
            gs.apply_pitch(&PitchOutcome::SwingingStrike);
            gs.apply_pitch(&PitchOutcome::Foul);
            gs.apply_pitch(&PitchOutcome::CalledBall);
            gs.apply_pitch(&PitchOutcome::Foul);
            gs.apply_pitch(&PitchOutcome::CalledBall);
            gs.apply_pitch(&PitchOutcome::CalledBall);
            black_box(gs.bases.first())
        })
    });
}

fn bench_feed_parse(c: &mut Criterion) {
    c.bench_function("live_feed_parse", |b| {
        b.iter(|| {
            let mut cursor = FeedCursor::default();
            let parsed = parse_live_feed(black_box(FEED_JSON), &mut cursor).unwrap();
            black_box(parsed.events.len())
        })
    });
}

criterion_group!(
    perf,
    bench_classify,
    bench_zone_resolve,
    bench_table_lookup,
    bench_count_transitions,
    bench_feed_parse
);
criterion_main!(perf);

static FEED_JSON: &str = include_str!("../tests/fixtures/feed_live.json");
