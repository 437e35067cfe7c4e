//! Batch simulation CLI: run many games and print per-token win rates.

use clap::{Parser, ValueEnum};

use ring_race::core::RaceConfig;
use ring_race::sim::{run_batch, run_batch_parallel, WinStats};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Roster {
    /// Six tokens with fixed starting cells on a 23-cell ring.
    Classic,
    /// Six tokens stacked on one cell of a 22-cell ring.
    Stacked,
}

#[derive(Parser, Debug)]
#[command(name = "simulate", about = "Estimate win rates for a ring-race roster")]
struct Args {
    /// Number of games to simulate.
    #[arg(long, default_value_t = 10_000)]
    games: u64,

    /// RNG seed; the same seed reproduces the same batch.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Which roster preset to race.
    #[arg(long, value_enum, default_value_t = Roster::Classic)]
    roster: Roster,

    /// Number of parallel shards; 1 runs sequentially.
    #[arg(long, default_value_t = 1)]
    shards: usize,
}

fn print_stats(config: &RaceConfig, stats: &WinStats) {
    println!("{} games, seed-reproducible", stats.games());
    for (token, wins) in stats.iter() {
        println!(
            "  {:<4} {:>8} wins  {:>6.2}%",
            config.label(token),
            wins,
            stats.win_rate(token) * 100.0
        );
    }
    if stats.capped() > 0 {
        println!("  {} games hit the round cap without a winner", stats.capped());
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match args.roster {
        Roster::Classic => RaceConfig::classic(),
        Roster::Stacked => RaceConfig::stacked_roster(),
    };

    let result = if args.shards > 1 {
        run_batch_parallel(&config, args.seed, args.games, args.shards)
    } else {
        run_batch(&config, args.seed, args.games)
    };

    match result {
        Ok(stats) => print_stats(&config, &stats),
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(1);
        }
    }
}
