//! The turn engine: orchestrates one full game on a [`Board`].
//!
//! A game runs as a sequence of rounds. Every round draws a fresh uniform
//! random permutation of the roster (turn order is deliberately not fixed
//! for the whole game), applies at most one order-deferral, and then
//! resolves each token's turn in sequence: roll, pre-move skills, board
//! move, post-move skills. The round aborts as soon as a winner appears.
//!
//! Turns are atomic pure computation plus RNG draws; there is no
//! suspension point inside a turn. External callers interrupt, if at all,
//! between whole games.

use thiserror::Error;
use tracing::debug;

use crate::board::{Board, Snapshot};
use crate::core::{ConfigError, GameRng, RaceConfig, StartLayout, TokenId};
use crate::skills::{self, Skill, TurnSlot};

/// Game lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    InProgress,
    Finished(TokenId),
}

/// Errors a race can produce after successful configuration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RaceError {
    /// The round safety cap was hit without a winner. Distinct and
    /// detectable; with sane dice this is a configuration defect, not a
    /// condition to retry.
    #[error("no winner after {0} rounds")]
    RoundCapExceeded(u64),
}

/// A race: configuration, board, RNG, and game lifecycle.
///
/// ## Example
///
/// ```
/// use ring_race::engine::Race;
/// use ring_race::core::RaceConfig;
///
/// let mut race = Race::new(RaceConfig::classic(), 42).unwrap();
/// let winner = race.run_one_game().unwrap();
/// assert!(winner.index() < 6);
/// ```
pub struct Race {
    config: RaceConfig,
    board: Board,
    rng: GameRng,
    phase: Phase,
    rounds_played: u64,
}

impl Race {
    /// Create a race from a validated configuration and a seed.
    pub fn new(config: RaceConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, GameRng::new(seed))
    }

    /// Create a race with an externally constructed RNG (e.g. a fork of a
    /// master stream for a parallel shard).
    pub fn with_rng(config: RaceConfig, rng: GameRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::new(&config);
        Ok(Self {
            config,
            board,
            rng,
            phase: Phase::NotStarted,
            rounds_played: 0,
        })
    }

    /// The configuration this race runs with.
    #[must_use]
    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Rounds completed in the current game.
    #[must_use]
    pub fn rounds_played(&self) -> u64 {
        self.rounds_played
    }

    /// Read-only board access for display.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Read-only snapshot of the current board state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.board.snapshot()
    }

    /// Reset the board and place starting tokens.
    pub fn start(&mut self) {
        self.board.reset();
        self.rounds_played = 0;

        match &self.config.layout {
            StartLayout::Fixed(placements) => {
                for &(token, cell) in placements {
                    self.board.place(token, cell);
                }
            }
            StartLayout::Stacked { cell } => {
                // Reverse placement order: the last entry of the opening
                // permutation ends up at the bottom of the stack.
                let cell = *cell;
                let mut order: Vec<TokenId> =
                    TokenId::all(self.config.token_count()).collect();
                self.rng.shuffle(&mut order);
                for &token in order.iter().rev() {
                    self.board.place(token, cell);
                }
            }
        }

        self.phase = Phase::InProgress;
    }

    /// Play one round: fresh turn order, one deferral at most, then each
    /// token's turn in sequence. Returns the winner if the game ended.
    ///
    /// Calling this when the game is finished returns the winner again;
    /// calling it before `start` is a caller defect and panics.
    pub fn play_round(&mut self) -> Option<TokenId> {
        match self.phase {
            Phase::NotStarted => panic!("play_round called before start"),
            Phase::Finished(winner) => return Some(winner),
            Phase::InProgress => {}
        }

        let order = self.round_order();
        let last = order.len() - 1;

        for (i, &token) in order.iter().enumerate() {
            if let Some(winner) = self.board.winner() {
                self.phase = Phase::Finished(winner);
                return Some(winner);
            }
            let slot = TurnSlot {
                is_first: i == 0,
                is_last: i == last,
            };
            self.take_turn(token, slot);
        }
        self.rounds_played += 1;

        match self.board.winner() {
            Some(winner) => {
                self.phase = Phase::Finished(winner);
                Some(winner)
            }
            None => None,
        }
    }

    /// Run a full game to completion and return the winner.
    ///
    /// Resets any previous game first. The round safety cap turns a
    /// defective configuration into a [`RaceError::RoundCapExceeded`]
    /// instead of an infinite loop.
    pub fn run_one_game(&mut self) -> Result<TokenId, RaceError> {
        self.start();
        loop {
            if let Some(winner) = self.play_round() {
                debug!(
                    winner = self.config.label(winner),
                    rounds = self.rounds_played,
                    "game finished"
                );
                return Ok(winner);
            }
            if self.rounds_played >= self.config.max_rounds {
                self.phase = Phase::NotStarted;
                return Err(RaceError::RoundCapExceeded(self.config.max_rounds));
            }
        }
    }

    /// Build the round's turn order: a fresh uniform permutation, then at
    /// most one deferral.
    fn round_order(&mut self) -> Vec<TokenId> {
        let mut order: Vec<TokenId> = TokenId::all(self.config.token_count()).collect();
        self.rng.shuffle(&mut order);
        self.apply_deferral(&mut order);
        order
    }

    /// Scan the base order in position; the first token whose deferral
    /// check succeeds moves to the end. A token at the bottom of its stack
    /// (or alone) is not eligible.
    fn apply_deferral(&mut self, order: &mut Vec<TokenId>) {
        for i in 0..order.len() {
            let token = order[i];
            let Skill::Defer { prob } = *self.config.skill(token) else {
                continue;
            };
            let above_bottom = self.board.stack_index(token).is_some_and(|at| at > 0);
            if above_bottom && self.rng.gen_bool(prob) {
                let deferred = order.remove(i);
                order.push(deferred);
                break;
            }
        }
    }

    /// Resolve one token's turn: roll, pre-move skills, move, post-move
    /// skills.
    fn take_turn(&mut self, token: TokenId, slot: TurnSlot) {
        let skill = &self.config.tokens[token.index()].skill;
        let rolled = skills::roll(skill, &mut self.rng);
        let plan = skills::plan_move(token, skill, &self.board, rolled, slot, &mut self.rng);
        self.board.move_token(token, plan.steps, plan.solo);
        skills::after_move(token, skill, &mut self.board, &mut self.rng);
    }
}
