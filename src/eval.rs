//! Static evaluation of a board from the tigers' point of view.

use crate::board::{Board, GameState};
use crate::constants::{
    DRAW_SCORE, GOAT_WIN_SCORE, TIGER_WIN_SCORE, WEIGHT_GOAT_CAPTURED, WEIGHT_OUTSIDE_GOAT,
    WEIGHT_POSSIBLE_CAPTURE, WEIGHT_TIGER_IN_CORNER, WEIGHT_TIGER_TRAPPED,
};

/// Score a board; positive is good for the tigers.
///
/// Finished games score a fixed value regardless of depth. Otherwise the score
/// rewards captured goats, open captures and tigers in corners, and penalises
/// trapped tigers and goats on the outer ring. The remaining search `depth` is
/// added last so that equal positions reached earlier sort first.
pub fn evaluate(state: GameState, board: &Board, depth: u32) -> i32 {
    match state {
        GameState::TigerWin => TIGER_WIN_SCORE,
        GameState::GoatWin => GOAT_WIN_SCORE,
        GameState::Draw => DRAW_SCORE,
        GameState::InProgress => {
            WEIGHT_GOAT_CAPTURED * board.goats_captured() as i32
                + WEIGHT_POSSIBLE_CAPTURE * board.count_possible_captures() as i32
                + WEIGHT_TIGER_IN_CORNER * board.count_tigers_in_corners() as i32
                + WEIGHT_TIGER_TRAPPED * board.tigers_trapped() as i32
                + WEIGHT_OUTSIDE_GOAT * board.count_outside_goats() as i32
                + depth as i32
        }
    }
}
