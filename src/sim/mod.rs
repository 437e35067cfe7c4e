//! Batch simulation and win-rate aggregation.
//!
//! [`run_batch`] plays games sequentially on a single [`Race`], so the RNG
//! stream continues across games and the whole batch is a pure function of
//! (config, seed). [`run_batch_parallel`] shards a batch across rayon
//! workers; each shard owns an independent `Race` seeded by forking a
//! master RNG, so no mutable state is shared between concurrent games and
//! results do not depend on thread scheduling.

use rayon::prelude::*;
use tracing::info;

use crate::core::{ConfigError, GameRng, RaceConfig, TokenId, TokenMap};
use crate::engine::{Race, RaceError};

/// Aggregate win counters for a batch of games.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WinStats {
    games: u64,
    capped: u64,
    wins: TokenMap<u64>,
}

impl WinStats {
    /// Empty statistics for a roster of `token_count` tokens.
    #[must_use]
    pub fn new(token_count: usize) -> Self {
        Self {
            games: 0,
            capped: 0,
            wins: TokenMap::with_value(token_count, 0),
        }
    }

    /// Record one game's outcome.
    pub fn record(&mut self, outcome: Result<TokenId, RaceError>) {
        self.games += 1;
        match outcome {
            Ok(winner) => self.wins[winner] += 1,
            Err(RaceError::RoundCapExceeded(_)) => self.capped += 1,
        }
    }

    /// Fold another batch's counters into this one.
    ///
    /// Both sides must cover the same roster.
    pub fn merge(&mut self, other: &WinStats) {
        assert_eq!(
            self.wins.token_count(),
            other.wins.token_count(),
            "cannot merge stats for different rosters"
        );
        self.games += other.games;
        self.capped += other.capped;
        for (token, &count) in other.wins.iter() {
            self.wins[token] += count;
        }
    }

    /// Total games recorded, including cap-exceeded ones.
    #[must_use]
    pub fn games(&self) -> u64 {
        self.games
    }

    /// Games that hit the round safety cap without a winner.
    #[must_use]
    pub fn capped(&self) -> u64 {
        self.capped
    }

    /// Wins for one token.
    #[must_use]
    pub fn wins(&self, token: TokenId) -> u64 {
        self.wins[token]
    }

    /// Win rate for one token over all recorded games.
    #[must_use]
    pub fn win_rate(&self, token: TokenId) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.wins[token] as f64 / self.games as f64
    }

    /// Iterate over (token, wins) in roster order.
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, u64)> + '_ {
        self.wins.iter().map(|(t, &w)| (t, w))
    }
}

/// Run `games` simulations sequentially and aggregate win counts.
pub fn run_batch(config: &RaceConfig, seed: u64, games: u64) -> Result<WinStats, ConfigError> {
    let mut race = Race::new(config.clone(), seed)?;
    let mut stats = WinStats::new(config.token_count());

    for _ in 0..games {
        stats.record(race.run_one_game());
    }

    info!(games = stats.games(), capped = stats.capped(), "batch complete");
    Ok(stats)
}

/// Run `games` simulations across `shards` parallel workers.
///
/// Shard RNGs are forked from a master stream seeded with `seed`, so the
/// result is deterministic for a given (config, seed, shards) regardless
/// of how rayon schedules the work. Remainder games go to the first
/// shards.
pub fn run_batch_parallel(
    config: &RaceConfig,
    seed: u64,
    games: u64,
    shards: usize,
) -> Result<WinStats, ConfigError> {
    let shards = shards.max(1) as u64;
    let mut master = GameRng::new(seed);

    let mut work: Vec<(Race, u64)> = Vec::with_capacity(shards as usize);
    for i in 0..shards {
        let share = games / shards + u64::from(i < games % shards);
        work.push((Race::with_rng(config.clone(), master.fork())?, share));
    }

    let token_count = config.token_count();
    let stats = work
        .into_par_iter()
        .map(|(mut race, share)| {
            let mut local = WinStats::new(token_count);
            for _ in 0..share {
                local.record(race.run_one_game());
            }
            local
        })
        .reduce(
            || WinStats::new(token_count),
            |mut acc, local| {
                acc.merge(&local);
                acc
            },
        );

    info!(
        games = stats.games(),
        capped = stats.capped(),
        shards,
        "parallel batch complete"
    );
    Ok(stats)
}
