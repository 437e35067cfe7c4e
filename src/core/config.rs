//! Race configuration.
//!
//! A `RaceConfig` is built once at startup, validated, and then passed
//! immutably into `Board` and `Race` constructors. Nothing in it changes
//! at runtime; only board state is mutable during a game.
//!
//! Bad configuration (duplicate labels, out-of-range starting cells,
//! probabilities outside `[0, 1]`, dice that can roll zero) is rejected by
//! [`RaceConfig::validate`] before a game can start.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::token::TokenId;
use crate::skills::Skill;

/// Default ring geometry.
pub const DEFAULT_TRACK_LEN: usize = 23;

/// Default safety cap on rounds per game.
///
/// A game terminates in a handful of rounds with overwhelming probability;
/// the cap only exists so a defective configuration surfaces as a distinct
/// error instead of an infinite loop.
pub const DEFAULT_MAX_ROUNDS: u64 = 10_000;

/// Static definition of one token: display label plus its skill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenDef {
    /// Display label (e.g. "A"). Must be unique within the roster.
    pub label: String,
    /// The token's skill, fixed for the whole deployment.
    pub skill: Skill,
}

impl TokenDef {
    /// Create a token definition.
    pub fn new(label: impl Into<String>, skill: Skill) -> Self {
        Self {
            label: label.into(),
            skill,
        }
    }
}

/// Starting layout for a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartLayout {
    /// Each token starts on an explicit cell, placed in list order
    /// (earlier entries end up lower in shared stacks).
    Fixed(Vec<(TokenId, usize)>),

    /// All tokens start stacked on one cell. Placement order is the
    /// reverse of a fresh random roster permutation, so the stack
    /// composition varies between games.
    Stacked { cell: usize },
}

/// Configuration errors, detected at setup time.
///
/// All of these are fatal: the engine refuses to start a game.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("track must have at least one cell")]
    EmptyTrack,

    #[error("roster is empty")]
    NoTokens,

    #[error("roster exceeds 255 tokens")]
    TooManyTokens,

    #[error("duplicate token label `{0}`")]
    DuplicateLabel(String),

    #[error("token `{label}`: probability {prob} is outside [0, 1]")]
    BadProbability { label: String, prob: f64 },

    #[error("token `{0}`: die must have at least one face and every face must be >= 1")]
    BadDie(String),

    #[error("starting cell {cell} is out of range for a track of {track_len}")]
    CellOutOfRange { cell: usize, track_len: usize },

    #[error("token `{0}` is missing from the starting layout")]
    MissingPlacement(String),

    #[error("token `{0}` is placed more than once")]
    DuplicatePlacement(String),

    #[error("layout references unknown token index {0}")]
    UnknownToken(u8),

    #[error("round cap must be at least 1")]
    ZeroRoundCap,
}

/// Immutable race configuration: geometry, roster, starting layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Number of cells on the ring. Cell 0 is the finish line.
    pub track_len: usize,

    /// The roster; `TokenId` is an index into this list.
    pub tokens: Vec<TokenDef>,

    /// Where tokens start each game.
    pub layout: StartLayout,

    /// Safety cap on rounds per game.
    pub max_rounds: u64,
}

impl RaceConfig {
    /// Create a configuration with default geometry and round cap.
    pub fn new(tokens: Vec<TokenDef>, layout: StartLayout) -> Self {
        Self {
            track_len: DEFAULT_TRACK_LEN,
            tokens,
            layout,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Set the track length.
    #[must_use]
    pub fn with_track_len(mut self, track_len: usize) -> Self {
        self.track_len = track_len;
        self
    }

    /// Set the round safety cap.
    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: u64) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Number of tokens in the roster.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Display label for a token.
    #[must_use]
    pub fn label(&self, token: TokenId) -> &str {
        &self.tokens[token.index()].label
    }

    /// Skill of a token.
    #[must_use]
    pub fn skill(&self, token: TokenId) -> &Skill {
        &self.tokens[token.index()].skill
    }

    /// The six-token roster of the classic variant: fixed starting cells
    /// spread near the end of a 23-cell ring.
    #[must_use]
    pub fn classic() -> Self {
        let tokens = vec![
            TokenDef::new("A", Skill::LastPlaceBonus { bonus: 3 }),
            TokenDef::new("B", Skill::DoubleChance { prob: 0.28 }),
            TokenDef::new("C", Skill::Defer { prob: 0.65 }),
            TokenDef::new("D", Skill::Elevate { prob: 0.4 }),
            TokenDef::new("E", Skill::BreakAway { prob: 0.5 }),
            TokenDef::new(
                "F",
                Skill::LoadedDie {
                    die: crate::skills::Die::Uniform { lo: 2, hi: 3 },
                },
            ),
        ];

        // A starts on the finish cell; stacks form at 21 and 22.
        let layout = StartLayout::Fixed(vec![
            (TokenId::new(0), 0),
            (TokenId::new(2), 22),
            (TokenId::new(1), 22),
            (TokenId::new(4), 21),
            (TokenId::new(3), 21),
            (TokenId::new(5), 20),
        ]);

        Self::new(tokens, layout).with_track_len(23)
    }

    /// The six-token roster of the stacked variant: everyone starts piled
    /// on cell 1 of a 22-cell ring, in reverse order of the opening
    /// permutation.
    #[must_use]
    pub fn stacked_roster() -> Self {
        use crate::skills::Die;
        use smallvec::smallvec;

        let tokens = vec![
            TokenDef::new("G", Skill::LastMoverBonus { bonus: 2 }),
            TokenDef::new("H", Skill::FirstMoverBonus { bonus: 2 }),
            TokenDef::new("I", Skill::StackLeader),
            TokenDef::new(
                "J",
                Skill::PackTactics {
                    prob: 0.4,
                    bonus: 2,
                    die: Die::Faces(smallvec![1, 3]),
                },
            ),
            TokenDef::new("K", Skill::CatchUp { prob: 0.6, bonus: 2 }),
            TokenDef::new("L", Skill::LuckyStep { prob: 0.5, bonus: 1 }),
        ];

        Self::new(tokens, StartLayout::Stacked { cell: 1 }).with_track_len(22)
    }

    /// Validate the configuration.
    ///
    /// Checks geometry, roster uniqueness, skill parameters, and the
    /// starting layout. Any failure refuses game start.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.track_len == 0 {
            return Err(ConfigError::EmptyTrack);
        }
        if self.tokens.is_empty() {
            return Err(ConfigError::NoTokens);
        }
        if self.tokens.len() > 255 {
            return Err(ConfigError::TooManyTokens);
        }
        if self.max_rounds == 0 {
            return Err(ConfigError::ZeroRoundCap);
        }

        for (i, def) in self.tokens.iter().enumerate() {
            if self.tokens[..i].iter().any(|d| d.label == def.label) {
                return Err(ConfigError::DuplicateLabel(def.label.clone()));
            }

            if let Some(prob) = def.skill.probability() {
                if !(0.0..=1.0).contains(&prob) {
                    return Err(ConfigError::BadProbability {
                        label: def.label.clone(),
                        prob,
                    });
                }
            }

            if !def.skill.die().is_valid() {
                return Err(ConfigError::BadDie(def.label.clone()));
            }
        }

        match &self.layout {
            StartLayout::Fixed(placements) => {
                let mut placed = vec![false; self.tokens.len()];
                for &(token, cell) in placements {
                    let Some(slot) = placed.get_mut(token.index()) else {
                        return Err(ConfigError::UnknownToken(token.0));
                    };
                    if *slot {
                        return Err(ConfigError::DuplicatePlacement(
                            self.label(token).to_string(),
                        ));
                    }
                    *slot = true;

                    if cell >= self.track_len {
                        return Err(ConfigError::CellOutOfRange {
                            cell,
                            track_len: self.track_len,
                        });
                    }
                }
                if let Some(idx) = placed.iter().position(|&p| !p) {
                    return Err(ConfigError::MissingPlacement(
                        self.tokens[idx].label.clone(),
                    ));
                }
            }
            StartLayout::Stacked { cell } => {
                if *cell >= self.track_len {
                    return Err(ConfigError::CellOutOfRange {
                        cell: *cell,
                        track_len: self.track_len,
                    });
                }
            }
        }

        Ok(())
    }
}
