//! Integration tests for bagh-chal
//!
//! These exercise the public API the way a front-end would: building
//! positions, applying moves, checking results and asking the engines for
//! moves.

use bagh_chal::board::{Action, Board, GameState};
use bagh_chal::game::{AiSettings, Algorithm, GameMode, GameSession, Side};
use bagh_chal::mcts::{MctsConfig, Tree, search_mcts_with};
use bagh_chal::minimax::search_alpha_beta_with;
use bagh_chal::piece::Piece;
use bagh_chal::position::{Position, parse_coord};
use bagh_chal::protocol::ProtocolEngine;

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

fn sq(name: &str) -> Position {
    parse_coord(name).unwrap_or_else(|| panic!("bad square {name}"))
}

/// Corner tigers, sixteen goats, four captured and none in hand.
///
/// ```text
///    a b c d e
///  1 T . G G T
///  2 G G G G G
///  3 G G G G G
///  4 G G . G .
///  5 T G . . T
/// ```
fn endgame(goats_to_move: bool) -> Board {
    let mut pieces: Vec<Piece> = ["a1", "e1", "a5", "e5"]
        .iter()
        .map(|s| Piece::tiger(sq(s)))
        .collect();
    pieces.extend(
        [
            "c1", "d1", "a2", "b2", "c2", "d2", "e2", "a3", "b3", "c3", "d3", "e3", "a4", "b4",
            "d4", "b5",
        ]
        .iter()
        .map(|s| Piece::goat(sq(s))),
    );
    Board::from_pieces(&pieces, 0, 4, goats_to_move).expect("valid position")
}

/// Apply moves given as "from-to" strings, without turn checks.
fn play(board: &mut Board, moves: &[&str]) {
    for mv in moves {
        let (from, to) = mv.split_once('-').expect("from-to");
        assert!(board.move_piece(sq(from), sq(to)), "illegal {mv}");
    }
}

// =============================================================================
// Start position
// =============================================================================

#[test]
fn test_start_position() {
    let board = Board::new();
    assert!(board.goats_to_move());
    assert_eq!(board.goats_in_hand(), 20);
    assert_eq!(board.goats_captured(), 0);
    assert_eq!(board.tigers_trapped(), 0);
    assert_eq!(board.count_tigers_in_corners(), 4);
    assert_eq!(board.game_state(), GameState::InProgress);
    assert_eq!(board.legal_successors().len(), 21);
}

#[test]
fn test_first_placement_in_centre() {
    let mut board = Board::new();
    assert!(board.place_piece(sq("c3")));
    assert!(board.is_goat_at(Position::new(2, 2)));
    assert_eq!(board.goats_in_hand(), 19);
    assert!(!board.place_piece(sq("c3")), "occupied");
    assert!(!board.place_piece(sq("a1")), "tiger there");
}

#[test]
fn test_start_tiger_moves() {
    let mut board = Board::new();
    board.switch_turn();
    let actions: Vec<String> = board
        .legal_actions()
        .into_iter()
        .map(|(a, _)| a.to_string())
        .collect();
    // Three slides from each corner, no captures.
    assert_eq!(actions.len(), 12);
    for expected in ["a1-a2", "a1-b1", "a1-b2", "e5-d4"] {
        assert!(actions.contains(&expected.to_string()), "{expected}");
    }
}

// =============================================================================
// Movement and captures
// =============================================================================

#[test]
fn test_diagonals_follow_parity() {
    let mut board = Board::new();
    board.place_piece(sq("b1"));
    board.place_piece(sq("c3"));
    let b1 = board.piece_at(sq("b1")).copied().unwrap();
    let c3 = board.piece_at(sq("c3")).copied().unwrap();

    assert!(!b1.can_move(&board, sq("c2"), 1), "b1 has no diagonals");
    assert!(b1.can_move(&board, sq("b2"), 1));
    assert!(c3.can_move(&board, sq("d4"), 1));
    assert!(c3.can_move(&board, sq("b2"), 1));
    assert!(!c3.can_move(&board, sq("c5"), 1), "too far");
}

#[test]
fn test_capture_is_atomic() {
    let mut board = Board::new();
    board.place_piece(sq("b2"));
    board.switch_turn();
    assert!(board.move_piece(sq("a1"), sq("c3")));

    assert_eq!(board.goats_captured(), 1);
    assert_eq!(board.goats_on_board(), 0);
    assert!(!board.is_piece_at(sq("b2")));
    assert!(!board.is_piece_at(sq("a1")));
    assert!(board.is_tiger_at(sq("c3")));
    assert_eq!(board.tigers().count(), 4);
    assert!(matches!(board.last_action(), Some(Action::Capture { .. })));
}

#[test]
fn test_capture_requires_goat_and_landing() {
    let mut board = Board::new();
    board.switch_turn();
    assert!(!board.move_piece(sq("a1"), sq("c1")), "nothing to jump");

    let mut board = Board::new();
    board.place_piece(sq("b1"));
    board.place_piece(sq("c1"));
    board.switch_turn();
    assert!(!board.move_piece(sq("a1"), sq("c1")), "landing occupied");
}

#[test]
fn test_tiger_must_capture() {
    let mut board = Board::new();
    board.place_piece(sq("a2"));
    board.switch_turn();
    let from_a1: Vec<Action> = board
        .legal_actions()
        .into_iter()
        .map(|(a, _)| a)
        .filter(|a| match a {
            Action::Step { from, .. } | Action::Capture { from, .. } => *from == sq("a1"),
            Action::Place(_) => false,
        })
        .collect();
    assert_eq!(
        from_a1,
        vec![Action::Capture {
            from: sq("a1"),
            over: sq("a2"),
            to: sq("a3"),
        }]
    );
}

// =============================================================================
// Game results
// =============================================================================

#[test]
fn test_five_captures_win_for_tigers() {
    let mut board = Board::new();
    for name in ["b1", "c2", "d3", "b3", "c4"] {
        board.place_piece(sq(name));
        board.capture_at(sq(name));
    }
    assert_eq!(board.game_state(), GameState::TigerWin);
}

#[test]
fn test_trapped_tigers_win_for_goats() {
    let mut pieces: Vec<Piece> = ["a1", "e1", "a5", "e5"]
        .iter()
        .map(|s| Piece::tiger(sq(s)))
        .collect();
    pieces.extend(
        [
            "b1", "a2", "b2", "c1", "a3", "c3", "d1", "e2", "d2", "e3", "a4", "b5", "b4", "c5",
            "d5", "e4", "d4",
        ]
        .iter()
        .map(|s| Piece::goat(sq(s))),
    );
    let board = Board::from_pieces(&pieces, 3, 0, false).unwrap();
    assert_eq!(board.tigers_trapped(), 4);
    assert_eq!(board.game_state(), GameState::GoatWin);
}

#[test]
fn test_back_and_forth_is_draw() {
    let mut board = endgame(false);
    assert_eq!(board.game_state(), GameState::InProgress);
    play(&mut board, &["a1-b1", "c3-c4", "b1-a1", "c4-c3"]);
    assert!(!board.is_draw(), "only four moves");
    play(&mut board, &["a1-b1"]);
    assert!(board.is_draw());
    assert_eq!(board.game_state(), GameState::Draw);
}

#[test]
fn test_fresh_moves_are_not_draw() {
    let mut board = endgame(false);
    play(&mut board, &["a1-b1", "c3-c4", "e5-e4", "c4-c5", "b1-a1"]);
    assert_eq!(board.history().len(), 5);
    assert!(!board.is_draw());
}

#[test]
fn test_history_only_after_placement() {
    let mut board = Board::new();
    board.place_piece(sq("c3"));
    board.switch_turn();
    board.move_piece(sq("a1"), sq("b1"));
    assert!(board.history().is_empty());
}

// =============================================================================
// Search engines
// =============================================================================

#[test]
fn test_alpha_beta_matches_minimax() {
    let mut board = Board::new();
    board.place_piece(sq("b2"));
    board.place_piece(sq("d4"));
    board.switch_turn();
    for depth in 1..=3 {
        let mut rng = fastrand::Rng::with_seed(depth as u64);
        let plain = search_alpha_beta_with(&board, false, depth, &mut rng);
        let pruned = search_alpha_beta_with(&board, true, depth, &mut rng);
        assert_eq!(plain.score, pruned.score, "depth {depth}");
    }
}

#[test]
fn test_search_leaves_board_untouched() {
    let mut board = Board::new();
    board.place_piece(sq("c3"));
    let before = board.clone();
    let mut rng = fastrand::Rng::with_seed(5);
    let _ = search_alpha_beta_with(&board, true, 2, &mut rng);
    let _ = search_mcts_with(&board, &MctsConfig::with_iterations(50), &mut rng);
    assert_eq!(board, before);
}

#[test]
fn test_mcts_visits_add_up() {
    let mut tree = Tree::new(Board::new());
    let mut rng = fastrand::Rng::with_seed(11);
    for _ in 0..60 {
        tree.iterate(2.0, &mut rng);
    }
    let root = tree.root();
    let child_visits: u32 = root.children.iter().map(|&c| tree.node(c).visits).sum();
    assert_eq!(root.visits, 60);
    assert_eq!(child_visits, 60);
}

#[test]
fn test_mcts_returns_successor() {
    let board = Board::new();
    let mut rng = fastrand::Rng::with_seed(13);
    let result = search_mcts_with(&board, &MctsConfig::with_iterations(40), &mut rng);
    let next = result.board.expect("goats can place");
    assert_eq!(next.goats_in_hand(), 19);
    assert!(!next.goats_to_move());
    assert_eq!(result.iterations, 40);
}

// =============================================================================
// Session and protocol
// =============================================================================

#[test]
fn test_ai_vs_ai_game_progresses() {
    let settings = AiSettings::new(Algorithm::AlphaBeta, 1, 0.05);
    let mut game = GameSession::with_mode(GameMode::AiVsAi, settings, settings);
    for _ in 0..10 {
        if game.play_ai_turn().is_none() {
            break;
        }
    }
    let board = game.board();
    assert_eq!(
        board.goats_on_board() as u32 + board.goats_in_hand() + board.goats_captured(),
        20
    );
    assert!(board.goats_in_hand() < 20);
}

#[test]
fn test_human_plays_goats_against_ai() {
    let settings = AiSettings::new(Algorithm::Mcts, 1, 0.05);
    let mut game = GameSession::with_mode(GameMode::PlayerVsAi(Side::Goat), settings, settings);
    assert!(game.click(sq("c3")));
    assert_eq!(game.side_to_move(), Side::Tiger);
    assert!(game.play_ai_turn().is_some());
    assert_eq!(game.side_to_move(), Side::Goat);
}

#[test]
fn test_protocol_session() {
    let mut engine = ProtocolEngine::new();
    let input = b"place b1\nmove a1 c1\ncounters\nstate\n";
    let mut output = Vec::new();
    engine.run(&input[..], &mut output).unwrap();
    let text = String::from_utf8(output).unwrap();
    assert_eq!(
        text,
        "= \n\n= a1xc1\n\n= turn goat in_hand 19 captured 1 trapped 0\n\n= in_progress\n\n"
    );
}
