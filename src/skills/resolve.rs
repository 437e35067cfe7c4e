//! Skill resolution around a single move.
//!
//! Resolution order for one turn:
//!
//! 1. [`roll`] the token's die (independent of every other token),
//! 2. [`plan_move`] applies pre-move skills to the rolled value and
//!    decides whether the move is solo,
//! 3. the board executes the move,
//! 4. [`after_move`] applies post-move skills (stack reordering, one-shot
//!    flags).
//!
//! Turn-order deferral is resolved by the engine while building the round
//! order, and the stack-leadership trigger fires inside the board itself.
//!
//! Nothing here returns a recoverable error: a token that already finished
//! simply short-circuits into a no-op move, and invalid parameters cannot
//! reach this layer past configuration validation.

use crate::board::Board;
use crate::core::{GameRng, TokenId};

use super::Skill;

/// Where the token acts within the current round's order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnSlot {
    pub is_first: bool,
    pub is_last: bool,
}

/// Final movement parameters for one turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovePlan {
    /// Cells to advance, after all pre-move modifiers.
    pub steps: u64,
    /// Move the token alone, leaving tokens stacked above it behind.
    pub solo: bool,
}

/// Roll the token's die.
pub fn roll(skill: &Skill, rng: &mut GameRng) -> u64 {
    skill.die().roll(rng)
}

/// Apply pre-move skills to the rolled value.
///
/// A single probability draw decides a `BreakAway` trigger: success makes
/// the move solo and grants the stack bonus together.
pub fn plan_move(
    token: TokenId,
    skill: &Skill,
    board: &Board,
    rolled: u64,
    slot: TurnSlot,
    rng: &mut GameRng,
) -> MovePlan {
    let mut steps = rolled;
    let mut solo = false;

    match skill {
        Skill::LastPlaceBonus { bonus } => {
            if board.is_last_place(token) {
                steps += bonus;
            }
        }
        Skill::DoubleChance { prob } => {
            if rng.gen_bool(*prob) {
                steps *= 2;
            }
        }
        Skill::BreakAway { prob } => {
            if rng.gen_bool(*prob) {
                solo = true;
                steps += (board.stack_size(token).saturating_sub(1)) as u64;
            }
        }
        Skill::PackTactics { prob, bonus, .. } => {
            if board.stack_size(token) > 1 && rng.gen_bool(*prob) {
                steps += bonus;
            }
        }
        Skill::CatchUp { prob, bonus } => {
            if board.flag(token) && rng.gen_bool(*prob) {
                steps += bonus;
            }
        }
        Skill::LuckyStep { prob, bonus } => {
            if rng.gen_bool(*prob) {
                steps += bonus;
            }
        }
        Skill::FirstMoverBonus { bonus } => {
            if slot.is_first {
                steps += bonus;
            }
        }
        Skill::LastMoverBonus { bonus } => {
            if slot.is_last {
                steps += bonus;
            }
        }
        // Dice, order, and post-move skills do not modify the plan.
        Skill::Defer { .. } | Skill::Elevate { .. } | Skill::LoadedDie { .. } | Skill::StackLeader => {}
    }

    MovePlan { steps, solo }
}

/// Apply post-move skills after the board executed the move.
pub fn after_move(token: TokenId, skill: &Skill, board: &mut Board, rng: &mut GameRng) {
    match skill {
        Skill::CatchUp { .. } => {
            if !board.flag(token) && board.is_last_place(token) {
                board.set_flag(token);
            }
        }
        Skill::Elevate { prob } => {
            if rng.gen_bool(*prob) {
                board.elevate(token);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RaceConfig, StartLayout, TokenDef};
    use crate::skills::Die;

    const T0: TokenId = TokenId::new(0);
    const T1: TokenId = TokenId::new(1);
    const T2: TokenId = TokenId::new(2);

    const MID: TurnSlot = TurnSlot {
        is_first: false,
        is_last: false,
    };

    fn board_with(skills: Vec<Skill>) -> Board {
        let tokens = skills
            .into_iter()
            .enumerate()
            .map(|(i, s)| TokenDef::new(format!("T{i}"), s))
            .collect();
        let config =
            RaceConfig::new(tokens, StartLayout::Stacked { cell: 0 }).with_track_len(10);
        Board::new(&config)
    }

    fn plain() -> Skill {
        Skill::LuckyStep { prob: 0.0, bonus: 0 }
    }

    #[test]
    fn test_last_place_bonus_applies_only_when_last() {
        let skill = Skill::LastPlaceBonus { bonus: 3 };
        let mut board = board_with(vec![skill.clone(), plain()]);
        let mut rng = GameRng::new(1);

        board.place(T0, 2);
        board.place(T1, 5);
        let plan = plan_move(T0, &skill, &board, 2, MID, &mut rng);
        assert_eq!(plan, MovePlan { steps: 5, solo: false });

        // Not last anymore: no bonus.
        let plan = plan_move(T1, &skill, &board, 2, MID, &mut rng);
        assert_eq!(plan.steps, 2);
    }

    #[test]
    fn test_double_chance_certain_and_never() {
        let mut board = board_with(vec![plain()]);
        board.place(T0, 1);
        let mut rng = GameRng::new(1);

        let always = Skill::DoubleChance { prob: 1.0 };
        assert_eq!(plan_move(T0, &always, &board, 3, MID, &mut rng).steps, 6);

        let never = Skill::DoubleChance { prob: 0.0 };
        assert_eq!(plan_move(T0, &never, &board, 3, MID, &mut rng).steps, 3);
    }

    #[test]
    fn test_break_away_single_draw_sets_solo_and_bonus() {
        let skill = Skill::BreakAway { prob: 1.0 };
        let mut board = board_with(vec![skill.clone(), plain(), plain()]);
        board.place(T0, 4);
        board.place(T1, 4);
        board.place(T2, 4);
        let mut rng = GameRng::new(1);

        let plan = plan_move(T0, &skill, &board, 2, MID, &mut rng);
        assert_eq!(plan, MovePlan { steps: 4, solo: true });
    }

    #[test]
    fn test_break_away_alone_gets_no_bonus() {
        let skill = Skill::BreakAway { prob: 1.0 };
        let mut board = board_with(vec![skill.clone()]);
        board.place(T0, 4);
        let mut rng = GameRng::new(1);

        let plan = plan_move(T0, &skill, &board, 2, MID, &mut rng);
        assert_eq!(plan, MovePlan { steps: 2, solo: true });
    }

    #[test]
    fn test_pack_tactics_needs_company() {
        let skill = Skill::PackTactics {
            prob: 1.0,
            bonus: 2,
            die: Die::Faces(smallvec::smallvec![1, 3]),
        };
        let mut board = board_with(vec![skill.clone(), plain()]);
        let mut rng = GameRng::new(1);

        board.place(T0, 4);
        assert_eq!(plan_move(T0, &skill, &board, 1, MID, &mut rng).steps, 1);

        board.place(T1, 4);
        assert_eq!(plan_move(T0, &skill, &board, 1, MID, &mut rng).steps, 3);
    }

    #[test]
    fn test_catch_up_flag_lifecycle() {
        let skill = Skill::CatchUp { prob: 1.0, bonus: 2 };
        let mut board = board_with(vec![skill.clone(), plain()]);
        let mut rng = GameRng::new(1);

        board.place(T0, 3);
        board.place(T1, 1);

        // Not yet flagged: no pre-move bonus.
        assert_eq!(plan_move(T0, &skill, &board, 2, MID, &mut rng).steps, 2);

        // Not in last place: post-move does not set the flag.
        after_move(T0, &skill, &mut board, &mut rng);
        assert!(!board.flag(T0));

        // Fall behind: the flag is set once and stays.
        board.move_token(T1, 4, false);
        after_move(T0, &skill, &mut board, &mut rng);
        assert!(board.flag(T0));

        // Every subsequent turn gets the bonus while the flag is set.
        assert_eq!(plan_move(T0, &skill, &board, 2, MID, &mut rng).steps, 4);
    }

    #[test]
    fn test_turn_position_bonuses() {
        let mut board = board_with(vec![plain()]);
        board.place(T0, 1);
        let mut rng = GameRng::new(1);

        let first = Skill::FirstMoverBonus { bonus: 2 };
        let last = Skill::LastMoverBonus { bonus: 2 };
        let first_slot = TurnSlot { is_first: true, is_last: false };
        let last_slot = TurnSlot { is_first: false, is_last: true };

        assert_eq!(plan_move(T0, &first, &board, 1, first_slot, &mut rng).steps, 3);
        assert_eq!(plan_move(T0, &first, &board, 1, last_slot, &mut rng).steps, 1);
        assert_eq!(plan_move(T0, &last, &board, 1, last_slot, &mut rng).steps, 3);
        assert_eq!(plan_move(T0, &last, &board, 1, MID, &mut rng).steps, 1);
    }

    #[test]
    fn test_lucky_step() {
        let mut board = board_with(vec![plain()]);
        board.place(T0, 1);
        let mut rng = GameRng::new(1);

        let skill = Skill::LuckyStep { prob: 1.0, bonus: 1 };
        assert_eq!(plan_move(T0, &skill, &board, 2, MID, &mut rng).steps, 3);
    }

    #[test]
    fn test_neutral_skills_leave_plan_unchanged() {
        let mut board = board_with(vec![plain(), plain()]);
        board.place(T0, 1);
        board.place(T1, 1);
        let mut rng = GameRng::new(1);

        for skill in [
            Skill::Defer { prob: 1.0 },
            Skill::Elevate { prob: 1.0 },
            Skill::LoadedDie { die: Die::Uniform { lo: 2, hi: 3 } },
            Skill::StackLeader,
        ] {
            let plan = plan_move(T0, &skill, &board, 2, MID, &mut rng);
            assert_eq!(plan, MovePlan { steps: 2, solo: false });
        }
    }

    #[test]
    fn test_elevate_post_move() {
        let skill = Skill::Elevate { prob: 1.0 };
        let mut board = board_with(vec![skill.clone(), plain()]);
        board.place(T0, 2);
        board.place(T1, 2);
        let mut rng = GameRng::new(1);

        after_move(T0, &skill, &mut board, &mut rng);
        assert_eq!(board.cell(2), &[T1, T0]);
    }

    #[test]
    fn test_roll_uses_skill_die() {
        let mut rng = GameRng::new(7);

        let loaded = Skill::LoadedDie { die: Die::Uniform { lo: 2, hi: 3 } };
        for _ in 0..50 {
            let v = roll(&loaded, &mut rng);
            assert!((2..=3).contains(&v));
        }

        let standard = Skill::StackLeader;
        for _ in 0..50 {
            let v = roll(&standard, &mut rng);
            assert!((1..=3).contains(&v));
        }
    }
}
