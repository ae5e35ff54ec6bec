//! Minimax search with optional alpha-beta pruning.
//!
//! The tigers maximise and the goats minimise the score from [`evaluate`].
//! Successors are visited in a random order so that equally scored moves are
//! chosen at random instead of by generation order.

use std::time::{Duration, Instant};

use log::debug;

use crate::board::Board;
use crate::eval::evaluate;

/// Result of a depth-limited search.
#[derive(Clone, Debug)]
pub struct SearchResult {
    /// Minimax value of the root, tiger perspective.
    pub score: i32,
    /// The chosen successor, with the turn already switched. When the root is
    /// itself a leaf (depth 0 or a finished game) this is the root board, and
    /// `None` only if the side to move has no successors.
    pub board: Option<Board>,
    /// Number of nodes visited.
    pub nodes: u64,
    pub elapsed: Duration,
}

/// Search `depth` plies from `board` and return the best successor.
pub fn search_alpha_beta(board: &Board, use_alpha_beta: bool, depth: u32) -> SearchResult {
    search_alpha_beta_with(board, use_alpha_beta, depth, &mut fastrand::Rng::new())
}

/// Like [`search_alpha_beta`], drawing the move order from `rng`.
pub fn search_alpha_beta_with(
    board: &Board,
    use_alpha_beta: bool,
    depth: u32,
    rng: &mut fastrand::Rng,
) -> SearchResult {
    let start = Instant::now();
    let mut nodes = 0;
    let (score, best) = alpha_beta(
        board,
        use_alpha_beta,
        depth,
        i32::MIN,
        i32::MAX,
        &mut nodes,
        rng,
    );
    // A leaf root answers with itself while moves remain.
    let best = best.or_else(|| (!board.legal_successors().is_empty()).then(|| board.clone()));
    let elapsed = start.elapsed();
    debug!(
        "{} depth {depth}: score {score}, {nodes} nodes in {:.1}ms",
        if use_alpha_beta { "alpha-beta" } else { "minimax" },
        elapsed.as_secs_f64() * 1000.0
    );
    SearchResult {
        score,
        board: best,
        nodes,
        elapsed,
    }
}

/// Recursive search. Returns the value of `board` and the successor that
/// achieves it.
///
/// Every successor has its turn switched before it is searched, so the
/// returned board is ready for the opponent.
pub fn alpha_beta(
    board: &Board,
    use_alpha_beta: bool,
    depth: u32,
    mut alpha: i32,
    mut beta: i32,
    nodes: &mut u64,
    rng: &mut fastrand::Rng,
) -> (i32, Option<Board>) {
    *nodes += 1;

    let state = board.game_state();
    if depth == 0 || state.is_over() {
        return (evaluate(state, board, depth), None);
    }
    let mut boards = board.legal_successors();
    if boards.is_empty() {
        return (evaluate(state, board, depth), None);
    }
    rng.shuffle(&mut boards);

    let maximizing = !board.goats_to_move();
    let mut best_score = if maximizing { i32::MIN } else { i32::MAX };
    let mut best = None;

    for mut child in boards {
        child.switch_turn();
        let (score, _) = alpha_beta(&child, use_alpha_beta, depth - 1, alpha, beta, nodes, rng);

        if maximizing {
            if score > best_score {
                best_score = score;
                best = Some(child);
            }
            if use_alpha_beta {
                if best_score >= beta {
                    break;
                }
                alpha = alpha.max(best_score);
            }
        } else {
            if score < best_score {
                best_score = score;
                best = Some(child);
            }
            if use_alpha_beta {
                if best_score <= alpha {
                    break;
                }
                beta = beta.min(best_score);
            }
        }
    }

    (best_score, best)
}
