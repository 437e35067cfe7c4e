//! Core types: token identity, deterministic RNG, configuration.

pub mod config;
pub mod rng;
pub mod token;

pub use config::{
    ConfigError, RaceConfig, StartLayout, TokenDef, DEFAULT_MAX_ROUNDS, DEFAULT_TRACK_LEN,
};
pub use rng::GameRng;
pub use token::{TokenId, TokenMap};
