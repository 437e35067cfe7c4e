//! Batch-level behavior: termination, determinism, parallel sharding.

use ring_race::core::{RaceConfig, TokenId};
use ring_race::engine::Race;
use ring_race::sim::{run_batch, run_batch_parallel};

#[test]
fn ten_thousand_games_terminate_within_the_cap() {
    let stats = run_batch(&RaceConfig::classic(), 42, 10_000).unwrap();

    assert_eq!(stats.games(), 10_000);
    assert_eq!(stats.capped(), 0);
}

#[test]
fn stacked_roster_terminates_too() {
    let stats = run_batch(&RaceConfig::stacked_roster(), 7, 2_000).unwrap();

    assert_eq!(stats.games(), 2_000);
    assert_eq!(stats.capped(), 0);
}

#[test]
fn every_token_wins_sometimes() {
    // No skill is strong enough to shut a token out over a large batch.
    let stats = run_batch(&RaceConfig::classic(), 42, 10_000).unwrap();

    for token in TokenId::all(6) {
        assert!(
            stats.wins(token) > 0,
            "{token} never won over 10k games"
        );
    }
}

#[test]
fn win_rates_sum_to_one() {
    let stats = run_batch(&RaceConfig::classic(), 1, 5_000).unwrap();

    let sum: f64 = TokenId::all(6).map(|t| stats.win_rate(t)).sum();
    assert!((sum - 1.0).abs() < 1e-9);
}

#[test]
fn sequential_batches_are_reproducible() {
    let a = run_batch(&RaceConfig::stacked_roster(), 99, 1_000).unwrap();
    let b = run_batch(&RaceConfig::stacked_roster(), 99, 1_000).unwrap();

    assert_eq!(a, b);
}

#[test]
fn parallel_batches_are_reproducible() {
    let a = run_batch_parallel(&RaceConfig::classic(), 5, 1_000, 4).unwrap();
    let b = run_batch_parallel(&RaceConfig::classic(), 5, 1_000, 4).unwrap();

    assert_eq!(a, b);
    assert_eq!(a.games(), 1_000);
}

#[test]
fn parallel_shard_count_splits_all_games() {
    // 7 shards over 100 games: remainders go to the first shards.
    let stats = run_batch_parallel(&RaceConfig::classic(), 5, 100, 7).unwrap();

    assert_eq!(stats.games(), 100);
    let wins: u64 = TokenId::all(6).map(|t| stats.wins(t)).sum();
    assert_eq!(wins + stats.capped(), 100);
}

#[test]
fn game_state_is_fully_reset_between_games() {
    let mut race = Race::new(RaceConfig::stacked_roster(), 31).unwrap();

    let _ = race.run_one_game().unwrap();
    let first_end = race.snapshot();

    race.start();
    let fresh = race.snapshot();

    // New game: no winner, zeroed steps, everyone back on the start cell.
    assert_eq!(fresh.winner, None);
    assert!(fresh.steps.iter().all(|&s| s == 0));
    let on_start = fresh.cells[1].len();
    assert_eq!(on_start, 6);
    assert_ne!(first_end.winner, None);
}
