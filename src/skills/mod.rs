//! The skill system: a closed set of per-token racing skills.
//!
//! Each token carries exactly one `Skill`, fixed at configuration time.
//! Skills act at well-defined points of a turn:
//!
//! - **dice**: replace the default 1-3 die (`LoadedDie`, `PackTactics`)
//! - **pre-move**: modify the rolled step count and/or request a solo move
//! - **turn-order**: defer the owner to the end of the round (`Defer`)
//! - **post-move**: reorder the resulting stack or set a one-shot flag
//!
//! Resolution lives in [`resolve`]; the variants here are pure data.
//! Unknown kinds cannot exist: the enum is exhaustive, so configuration
//! mistakes are limited to bad parameters, which `RaceConfig::validate`
//! rejects at startup.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::GameRng;

pub mod resolve;

pub use resolve::{plan_move, roll, after_move, MovePlan, TurnSlot};

/// A die a token rolls at the start of its turn.
///
/// The default racing die is uniform 1-3. Skills may substitute a
/// constrained uniform range or an explicit face list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Die {
    /// Uniform roll over `lo..=hi`.
    Uniform { lo: u64, hi: u64 },
    /// Uniform choice among explicit faces.
    Faces(SmallVec<[u64; 4]>),
}

impl Die {
    /// The standard 1-3 racing die.
    #[must_use]
    pub fn standard() -> Self {
        Die::Uniform { lo: 1, hi: 3 }
    }

    /// Roll the die.
    pub fn roll(&self, rng: &mut GameRng) -> u64 {
        match self {
            Die::Uniform { lo, hi } => rng.gen_range(*lo..*hi + 1),
            Die::Faces(faces) => rng.choose(faces).copied().unwrap_or(1),
        }
    }

    /// A die is valid when every outcome advances the token by at least
    /// one cell; that is what makes game termination a certainty.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Die::Uniform { lo, hi } => *lo >= 1 && lo <= hi,
            Die::Faces(faces) => !faces.is_empty() && faces.iter().all(|&f| f >= 1),
        }
    }
}

/// A token's skill: kind plus kind-specific parameters.
///
/// Probabilities are trigger chances in `[0, 1]`; bonuses are extra cells
/// added to the step count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Skill {
    /// Pre-move: add `bonus` steps while the token is in last place.
    LastPlaceBonus { bonus: u64 },

    /// Pre-move: with `prob`, double the rolled steps.
    DoubleChance { prob: f64 },

    /// Turn-order: with `prob`, if the token is not at the bottom of its
    /// stack, move it to the end of the round order. At most one deferral
    /// is applied per round, first eligible candidate wins.
    Defer { prob: f64 },

    /// Post-move: with `prob`, move the token to the top of its stack.
    Elevate { prob: f64 },

    /// Pre-move: with `prob`, move alone (leaving tokens stacked above
    /// behind) and add (stack size - 1) steps.
    BreakAway { prob: f64 },

    /// Dice: roll `die` instead of the standard 1-3.
    LoadedDie { die: Die },

    /// Pre-move: add `bonus` steps when moving first in the round.
    FirstMoverBonus { bonus: u64 },

    /// Pre-move: add `bonus` steps when moving last in the round.
    LastMoverBonus { bonus: u64 },

    /// Post-move (evaluated inside the board): the first time the token
    /// lands on a cell already holding other tokens, record the whole
    /// stack as a forced group and permanently set the one-shot flag.
    StackLeader,

    /// Dice + pre-move: always roll `die`; when sharing a cell, add
    /// `bonus` steps with `prob`.
    PackTactics { prob: f64, bonus: u64, die: Die },

    /// Post-move: once confirmed in last place, permanently set the
    /// catching-up flag. Pre-move: while the flag is set, add `bonus`
    /// steps with `prob`.
    CatchUp { prob: f64, bonus: u64 },

    /// Pre-move: with `prob`, add `bonus` steps.
    LuckyStep { prob: f64, bonus: u64 },
}

impl Skill {
    /// The die this skill rolls; the standard die unless substituted.
    #[must_use]
    pub fn die(&self) -> Die {
        match self {
            Skill::LoadedDie { die } | Skill::PackTactics { die, .. } => die.clone(),
            _ => Die::standard(),
        }
    }

    /// The trigger probability carried by this skill, if any.
    #[must_use]
    pub fn probability(&self) -> Option<f64> {
        match self {
            Skill::DoubleChance { prob }
            | Skill::Defer { prob }
            | Skill::Elevate { prob }
            | Skill::BreakAway { prob }
            | Skill::PackTactics { prob, .. }
            | Skill::CatchUp { prob, .. }
            | Skill::LuckyStep { prob, .. } => Some(*prob),
            Skill::LastPlaceBonus { .. }
            | Skill::LoadedDie { .. }
            | Skill::FirstMoverBonus { .. }
            | Skill::LastMoverBonus { .. }
            | Skill::StackLeader => None,
        }
    }

    /// Whether this skill records forced-stack groups on landing.
    #[must_use]
    pub fn is_stack_leader(&self) -> bool {
        matches!(self, Skill::StackLeader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_standard_die_range() {
        let die = Die::standard();
        let mut rng = GameRng::new(42);

        for _ in 0..100 {
            let v = die.roll(&mut rng);
            assert!((1..=3).contains(&v));
        }
    }

    #[test]
    fn test_uniform_die_range() {
        let die = Die::Uniform { lo: 2, hi: 3 };
        let mut rng = GameRng::new(42);

        for _ in 0..100 {
            let v = die.roll(&mut rng);
            assert!((2..=3).contains(&v));
        }
    }

    #[test]
    fn test_faces_die() {
        let die = Die::Faces(smallvec![1, 3]);
        let mut rng = GameRng::new(42);

        let mut seen = [false; 4];
        for _ in 0..100 {
            let v = die.roll(&mut rng);
            assert!(v == 1 || v == 3);
            seen[v as usize] = true;
        }
        assert!(seen[1] && seen[3]);
    }

    #[test]
    fn test_die_validity() {
        assert!(Die::standard().is_valid());
        assert!(Die::Uniform { lo: 2, hi: 3 }.is_valid());
        assert!(!Die::Uniform { lo: 0, hi: 3 }.is_valid());
        assert!(!Die::Uniform { lo: 3, hi: 2 }.is_valid());
        assert!(Die::Faces(smallvec![1, 3]).is_valid());
        assert!(!Die::Faces(smallvec![0, 3]).is_valid());
        assert!(!Die::Faces(SmallVec::new()).is_valid());
    }

    #[test]
    fn test_skill_die_substitution() {
        let loaded = Skill::LoadedDie {
            die: Die::Uniform { lo: 2, hi: 3 },
        };
        assert_eq!(loaded.die(), Die::Uniform { lo: 2, hi: 3 });

        let pack = Skill::PackTactics {
            prob: 0.4,
            bonus: 2,
            die: Die::Faces(smallvec![1, 3]),
        };
        assert_eq!(pack.die(), Die::Faces(smallvec![1, 3]));

        assert_eq!(Skill::StackLeader.die(), Die::standard());
    }

    #[test]
    fn test_skill_probability() {
        assert_eq!(Skill::DoubleChance { prob: 0.28 }.probability(), Some(0.28));
        assert_eq!(Skill::StackLeader.probability(), None);
        assert_eq!(Skill::LastPlaceBonus { bonus: 3 }.probability(), None);
    }

    #[test]
    fn test_skill_serde_round_trip() {
        let skill = Skill::PackTactics {
            prob: 0.4,
            bonus: 2,
            die: Die::Faces(smallvec![1, 3]),
        };

        let json = serde_json::to_string(&skill).unwrap();
        let back: Skill = serde_json::from_str(&json).unwrap();
        assert_eq!(skill, back);
    }
}
