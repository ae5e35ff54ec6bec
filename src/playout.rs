//! Random playouts (game simulation) for Monte Carlo evaluation.
//!
//! A playout repeatedly picks a uniformly random successor until the game
//! ends. The side to move losing all of its moves counts as a loss for that
//! side, and a playout that runs past [`MAX_PLAYOUT_PLIES`] is scored as a draw.

use crate::board::{Board, GameState};
use crate::constants::MAX_PLAYOUT_PLIES;

/// Play random moves starting from `pool`, the successors of `board`, and
/// return the final game state.
///
/// `board` is the position the pool was generated from. If it is already
/// finished its own state is returned without playing.
pub fn playout(board: &Board, pool: &[Board], rng: &mut fastrand::Rng) -> GameState {
    let state = board.game_state();
    if state.is_over() {
        return state;
    }

    let mut goats_to_move = board.goats_to_move();
    let mut boards = pool.to_vec();
    for _ in 0..MAX_PLAYOUT_PLIES {
        if boards.is_empty() {
            return stalemate(goats_to_move);
        }
        let mut next = boards.swap_remove(rng.usize(..boards.len()));

        let state = next.game_state();
        if state.is_over() {
            return state;
        }

        next.switch_turn();
        goats_to_move = next.goats_to_move();
        boards = next.legal_successors();
    }
    GameState::Draw
}

/// Result when the side to move has no legal action left.
///
/// Tigers without moves are already caught by the trapped-tiger rule, so in
/// practice this is the goats being blocked, which loses for them.
pub(crate) fn stalemate(goats_to_move: bool) -> GameState {
    if goats_to_move {
        GameState::TigerWin
    } else {
        GameState::GoatWin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Piece;
    use crate::position::Position;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_finished_board_returns_its_state() {
        let mut board = Board::new();
        for pos in [p(1, 0), p(2, 1), p(3, 2), p(1, 2), p(2, 3)] {
            board.place_piece(pos);
            board.capture_at(pos);
        }
        let pool = board.legal_successors();
        let mut rng = fastrand::Rng::with_seed(1);
        assert_eq!(playout(&board, &pool, &mut rng), GameState::TigerWin);
    }

    #[test]
    fn test_playout_terminates() {
        let board = Board::new();
        let pool = board.legal_successors();
        let mut rng = fastrand::Rng::with_seed(42);
        for _ in 0..20 {
            let result = playout(&board, &pool, &mut rng);
            assert!(result.is_over());
        }
    }

    #[test]
    fn test_no_moves_loses_for_side_to_move() {
        let mut board = Board::new();
        let mut rng = fastrand::Rng::with_seed(7);
        assert_eq!(playout(&board, &[], &mut rng), GameState::TigerWin);
        board.switch_turn();
        assert_eq!(playout(&board, &[], &mut rng), GameState::GoatWin);
    }

    #[test]
    fn test_goats_blocked_in_playout() {
        // Goats fill everything but (4,3); only two of them can move at all.
        let tigers = [p(0, 0), p(1, 0), p(0, 1), p(4, 4)];
        let mut pieces: Vec<Piece> = tigers.iter().map(|&t| Piece::tiger(t)).collect();
        pieces.extend(
            Position::all()
                .filter(|q| !tigers.contains(q) && *q != p(4, 3))
                .map(Piece::goat),
        );
        let board = Board::from_pieces(&pieces, 0, 0, true).unwrap();
        let pool = board.legal_successors();
        let mut rng = fastrand::Rng::with_seed(3);
        assert!(playout(&board, &pool, &mut rng).is_over());
    }
}
