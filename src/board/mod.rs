//! The circular board: authoritative owner of cell occupancy and win
//! detection.
//!
//! The track is a ring of cells; cell 0 is the finish line. Each cell holds
//! an ordered stack of tokens (index 0 is the bottom, last is the top).
//! While a game is active every placed token occupies exactly one cell.
//!
//! The board also owns per-token step totals, the one-shot skill flags, and
//! the forced-stack records created by the stack-leadership skill. Moving
//! any member of a recorded group moves the whole group together and
//! consumes the record.
//!
//! Win rule: a token wins by landing exactly on cell 0. Step totals are
//! tracked and exposed for display but do not decide the winner.

use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::hash_map::Entry;

use crate::core::{RaceConfig, TokenId, TokenMap};

/// Inline capacity for one cell's stack; spills to the heap beyond this.
type Stack = SmallVec<[TokenId; 8]>;

/// Read-only view of board state for external renderers and reporters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Cell contents in track order; each inner sequence is bottom-to-top.
    pub cells: Vec<Vec<TokenId>>,
    /// The winner, once decided.
    pub winner: Option<TokenId>,
    /// Cumulative steps per token since game start, in roster order.
    pub steps: Vec<u64>,
}

/// Circular track state for one game.
#[derive(Clone, Debug)]
pub struct Board {
    track_len: usize,
    cells: Vec<Stack>,
    winner: Option<TokenId>,
    steps: TokenMap<u64>,
    /// One-shot trigger flags (stack leadership fired, catching up).
    flags: TokenMap<bool>,
    /// Groups that must move together on their next move, keyed by cell.
    forced: FxHashMap<usize, Stack>,
    /// Which tokens record forced groups when landing on an occupied cell.
    stack_leaders: TokenMap<bool>,
}

impl Board {
    /// Create an empty board for the given configuration.
    #[must_use]
    pub fn new(config: &RaceConfig) -> Self {
        let token_count = config.token_count();
        Self {
            track_len: config.track_len,
            cells: vec![Stack::new(); config.track_len],
            winner: None,
            steps: TokenMap::with_value(token_count, 0),
            flags: TokenMap::with_value(token_count, false),
            forced: FxHashMap::default(),
            stack_leaders: TokenMap::new(token_count, |t| {
                config.skill(t).is_stack_leader()
            }),
        }
    }

    /// Clear all cells, the winner, step totals, flags, and forced groups.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.winner = None;
        self.steps.fill(0);
        self.flags.fill(false);
        self.forced.clear();
    }

    /// Number of cells on the ring.
    #[must_use]
    pub fn track_len(&self) -> usize {
        self.track_len
    }

    /// The winner, once decided. The board is frozen afterwards.
    #[must_use]
    pub fn winner(&self) -> Option<TokenId> {
        self.winner
    }

    /// Cumulative steps a token has taken this game.
    #[must_use]
    pub fn steps_taken(&self, token: TokenId) -> u64 {
        self.steps[token]
    }

    /// The one-shot skill flag for a token.
    #[must_use]
    pub fn flag(&self, token: TokenId) -> bool {
        self.flags[token]
    }

    /// Permanently set a token's one-shot skill flag.
    pub fn set_flag(&mut self, token: TokenId) {
        self.flags[token] = true;
    }

    /// The stack occupying a cell, bottom-to-top.
    #[must_use]
    pub fn cell(&self, idx: usize) -> &[TokenId] {
        &self.cells[idx]
    }

    /// Whether a forced-stack record is pending for a cell.
    #[must_use]
    pub fn has_forced_group(&self, cell: usize) -> bool {
        self.forced.contains_key(&cell)
    }

    /// Append a token to a cell's stack.
    ///
    /// Panics if the token is already on the board; placement is a
    /// setup-time operation and a double placement is a caller defect.
    pub fn place(&mut self, token: TokenId, cell: usize) {
        if self.locate(token).is_some() {
            panic!("{token} is already on the board");
        }
        self.cells[cell].push(token);
    }

    /// The cell a token occupies, or `None` if it is not on the board.
    ///
    /// Linear scan over the track; fine for the small fixed geometry.
    #[must_use]
    pub fn position(&self, token: TokenId) -> Option<usize> {
        self.locate(token).map(|(cell, _)| cell)
    }

    /// The token's index within its cell stack (0 = bottom).
    #[must_use]
    pub fn stack_index(&self, token: TokenId) -> Option<usize> {
        self.locate(token).map(|(_, idx)| idx)
    }

    /// Size of the stack the token shares, 0 if it is not on the board.
    #[must_use]
    pub fn stack_size(&self, token: TokenId) -> usize {
        self.locate(token)
            .map_or(0, |(cell, _)| self.cells[cell].len())
    }

    /// True iff no other token occupies a strictly smaller cell index.
    ///
    /// Measured without wraparound. Co-located tokens tie, so several
    /// tokens can be in last place simultaneously. Returns false for a
    /// token that is not on the board.
    #[must_use]
    pub fn is_last_place(&self, token: TokenId) -> bool {
        match self.position(token) {
            Some(mine) => self.cells[..mine].iter().all(|cell| cell.is_empty()),
            None => false,
        }
    }

    /// Move a token to the top of its current stack.
    ///
    /// No-op if the token is not on the board or already on top.
    pub fn elevate(&mut self, token: TokenId) {
        if let Some((cell, idx)) = self.locate(token) {
            let stack = &mut self.cells[cell];
            if idx + 1 != stack.len() {
                stack.remove(idx);
                stack.push(token);
            }
        }
    }

    /// Move a token by `steps` cells, wrapping around the ring.
    ///
    /// - No-op once a winner is set (the game is frozen) or when the token
    ///   is not on the board.
    /// - A pending forced-stack record containing this token takes
    ///   precedence: the whole group moves together and the record is
    ///   consumed; no leadership evaluation happens on a forced move.
    /// - Otherwise the token moves alone (`solo`) or together with every
    ///   token stacked above it, preserving relative order, appended after
    ///   any existing occupants of the destination.
    /// - Landing on cell 0 wins; otherwise the stack-leadership trigger is
    ///   evaluated at the destination.
    pub fn move_token(&mut self, token: TokenId, steps: u64, solo: bool) {
        if self.winner.is_some() {
            return;
        }
        let Some((from, at)) = self.locate(token) else {
            return;
        };

        if self.forced_move(token, from, steps) {
            return;
        }

        self.steps[token] += steps;
        let to = self.wrap(from, steps);

        let moved: Stack = if solo {
            let mut single = Stack::new();
            single.push(self.cells[from].remove(at));
            single
        } else {
            self.cells[from].drain(at..).collect()
        };
        self.cells[to].extend(moved);

        if to == 0 {
            self.winner = Some(token);
            return;
        }

        self.check_stack_leadership(token, to);
    }

    /// Read-only snapshot for rendering and reporting.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cells: self.cells.iter().map(|c| c.to_vec()).collect(),
            winner: self.winner,
            steps: self.steps.as_slice().to_vec(),
        }
    }

    fn wrap(&self, from: usize, steps: u64) -> usize {
        (from + (steps % self.track_len as u64) as usize) % self.track_len
    }

    /// Scan for a token. Returns (cell index, index within the stack).
    fn locate(&self, token: TokenId) -> Option<(usize, usize)> {
        self.cells.iter().enumerate().find_map(|(cell, stack)| {
            stack.iter().position(|&t| t == token).map(|idx| (cell, idx))
        })
    }

    /// Consume a pending forced-stack record, if one covers this token.
    ///
    /// The recorded group moves together by `steps`, every member's step
    /// total is incremented, and the win is checked in group order.
    fn forced_move(&mut self, token: TokenId, from: usize, steps: u64) -> bool {
        let group = match self.forced.entry(from) {
            Entry::Occupied(entry) if entry.get().contains(&token) => entry.remove(),
            _ => return false,
        };

        let to = self.wrap(from, steps);
        self.cells[from].retain(|t| !group.contains(t));
        self.cells[to].extend(group.iter().copied());

        for &member in &group {
            self.steps[member] += steps;
        }
        if to == 0 {
            self.winner = group.first().copied();
        }
        true
    }

    /// One-shot leadership trigger: the first time a leader token lands on
    /// a cell already holding others, record the whole stack as a forced
    /// group and permanently set the flag.
    fn check_stack_leadership(&mut self, token: TokenId, cell: usize) {
        if !self.stack_leaders[token] || self.flags[token] {
            return;
        }
        if self.cells[cell].len() < 2 {
            return;
        }
        self.forced.insert(cell, self.cells[cell].clone());
        self.flags[token] = true;
    }
}
