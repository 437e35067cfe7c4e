//! # ring-race
//!
//! A circular-track race simulator: tokens advance by dice rolls modified
//! by per-token skills (probabilistic bonuses, stacking interactions,
//! turn-order perturbations), and win-rate statistics are estimated over
//! large batches of simulated games.
//!
//! ## Design Principles
//!
//! 1. **Immutable configuration**: the roster, skills, geometry, and
//!    starting layout are built once, validated at startup, and passed
//!    explicitly into constructors. No ambient mutable state.
//!
//! 2. **Closed skill set**: skills are a tagged enum resolved by
//!    exhaustive match; unknown kinds cannot exist past validation.
//!
//! 3. **Deterministic randomness**: every random draw comes from an
//!    explicit seeded `GameRng`, so a (config, seed) pair reproduces the
//!    identical sequence of turn orders, rolls, and winners. Parallel
//!    batches fork independent streams per shard.
//!
//! ## Modules
//!
//! - `core`: token identity, deterministic RNG, configuration
//! - `skills`: the skill enum, dice, and pre/post-move resolution
//! - `board`: circular track state, stacks, forced groups, win detection
//! - `engine`: round construction and the game loop
//! - `sim`: sequential and parallel batch simulation with win statistics

pub mod board;
pub mod core;
pub mod engine;
pub mod sim;
pub mod skills;

// Re-export commonly used types
pub use crate::core::{
    ConfigError, GameRng, RaceConfig, StartLayout, TokenDef, TokenId, TokenMap,
    DEFAULT_MAX_ROUNDS, DEFAULT_TRACK_LEN,
};

pub use crate::board::{Board, Snapshot};

pub use crate::skills::{Die, MovePlan, Skill, TurnSlot};

pub use crate::engine::{Phase, Race, RaceError};

pub use crate::sim::{run_batch, run_batch_parallel, WinStats};
