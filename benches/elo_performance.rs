//! Performance benchmarks for rating math and the ping board

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ranked_arena::config::RatingSettings;
use ranked_arena::pings::{InMemoryPingRegistry, PingRegistry};
use ranked_arena::rating::{EloEngine, InMemoryRankingStore, RankingStore};
use ranked_arena::types::{MatchResult, Ping, QueueType};
use ranked_arena::utils::current_timestamp;

fn bench_elo_compute(c: &mut Criterion) {
    let engine = EloEngine::new(&RatingSettings::default()).unwrap();

    c.bench_function("elo_compute_even_match", |b| {
        b.iter(|| black_box(engine.compute(black_box(1000), black_box(1000))))
    });

    c.bench_function("elo_compute_upset", |b| {
        b.iter(|| black_box(engine.compute(black_box(850), black_box(1450))))
    });
}

fn bench_ping_listing(c: &mut Criterion) {
    let registry = InMemoryPingRegistry::new(chrono::Duration::minutes(30));
    let now = current_timestamp();

    // A busier board than any real community produces
    for user in 0..200u64 {
        registry
            .add(Ping::unranked(
                user,
                QueueType::Singles,
                10,
                now - chrono::Duration::seconds(user as i64),
            ))
            .unwrap();
    }

    c.bench_function("ping_listing_200_entries", |b| {
        b.iter(|| black_box(registry.list(QueueType::Singles, now)))
    });
}

fn bench_leaderboard(c: &mut Criterion) {
    let store = InMemoryRankingStore::new(1000);

    for user in 0..500u64 {
        let opponent = 10_000 + user;
        store.get_or_create(user).unwrap();
        store.get_or_create(opponent).unwrap();
        store
            .apply_result(&MatchResult {
                winner_id: user,
                loser_id: opponent,
                new_winner_elo: 1000 + (user as i64 % 400),
                new_loser_elo: 990,
                delta: 16,
            })
            .unwrap();
    }

    c.bench_function("leaderboard_500_records", |b| {
        b.iter(|| black_box(store.top(10)))
    });
}

criterion_group!(
    benches,
    bench_elo_compute,
    bench_ping_listing,
    bench_leaderboard
);
criterion_main!(benches);
