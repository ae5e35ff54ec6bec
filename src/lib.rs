//! Bagh-Chal: the Nepali game of tigers and goats, with AI players.
//!
//! This crate provides the rules engine for the 5x5 Bagh-Chal board and two
//! search algorithms to play it: depth-limited minimax with optional
//! alpha-beta pruning, and Monte Carlo Tree Search with UCB selection.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, rule limits and engine parameters
//! - [`position`] - Board coordinates and their `a1`..`e5` notation
//! - [`piece`] - Tigers and goats and their movement rules
//! - [`board`] - Game state, successor generation, win and draw detection
//! - [`eval`] - Static evaluation for minimax
//! - [`minimax`] - Minimax and alpha-beta search
//! - [`mcts`] - Monte Carlo Tree Search
//! - [`playout`] - Random game simulation for MCTS
//! - [`game`] - A game session with human and AI controllers
//! - [`protocol`] - Text protocol for external front-ends
//!
//! ## Example
//!
//! ```
//! use bagh_chal::board::Board;
//! use bagh_chal::minimax::search_alpha_beta;
//! use bagh_chal::position::Position;
//!
//! // Goats open in the centre
//! let mut board = Board::new();
//! board.place_piece(Position::new(2, 2));
//! board.switch_turn();
//!
//! // Search the tiger reply
//! let result = search_alpha_beta(&board, true, 2);
//! let next = result.board.expect("tigers can move");
//! println!("Tigers play {}", next.last_action().unwrap());
//! ```

pub mod board;
pub mod constants;
pub mod eval;
pub mod game;
pub mod mcts;
pub mod minimax;
pub mod piece;
pub mod playout;
pub mod position;
pub mod protocol;
