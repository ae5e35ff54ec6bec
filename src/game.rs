//! A game in progress: the authoritative board plus who controls each side.
//!
//! A front-end owns one [`GameSession`]. Human input arrives as board
//! intersections through [`GameSession::click`]; AI turns are played with
//! [`GameSession::play_ai_turn`], which replaces the board with the successor
//! chosen by the configured search and records [`Diagnostics`] for display.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use log::info;

use crate::board::{Action, Board, GameState};
use crate::constants::{DEFAULT_DEPTH, DEFAULT_TIME_SECS, MAX_DEPTH, MAX_TIME_SECS};
use crate::minimax::search_alpha_beta;
use crate::mcts::search_mcts;
use crate::playout::stalemate;
use crate::position::Position;

/// The two sides of the game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Goat,
    Tiger,
}

impl Side {
    pub fn to_move(board: &Board) -> Self {
        if board.goats_to_move() {
            Side::Goat
        } else {
            Side::Tiger
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Side::Goat => "goat",
            Side::Tiger => "tiger",
        })
    }
}

/// Search algorithm used by an AI player.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Minimax,
    AlphaBeta,
    Mcts,
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimax" => Ok(Algorithm::Minimax),
            "alphabeta" | "alpha-beta" | "ab" => Ok(Algorithm::AlphaBeta),
            "mcts" => Ok(Algorithm::Mcts),
            other => Err(format!("unknown algorithm: {other}")),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Algorithm::Minimax => "minimax",
            Algorithm::AlphaBeta => "alphabeta",
            Algorithm::Mcts => "mcts",
        })
    }
}

/// Settings of an AI player. Depth applies to the minimax searches and time
/// to MCTS.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AiSettings {
    pub algorithm: Algorithm,
    pub depth: u32,
    pub time_secs: f64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::AlphaBeta,
            depth: DEFAULT_DEPTH,
            time_secs: DEFAULT_TIME_SECS,
        }
    }
}

impl AiSettings {
    pub fn new(algorithm: Algorithm, depth: u32, time_secs: f64) -> Self {
        Self {
            algorithm,
            depth: depth.clamp(1, MAX_DEPTH),
            time_secs: time_secs.min(MAX_TIME_SECS),
        }
    }
}

/// Parse an MCTS thinking time in seconds, accepting `(0, MAX_TIME_SECS]`.
pub fn parse_time_secs(s: &str) -> Result<f64, String> {
    let secs: f64 = s.parse().map_err(|_| format!("invalid time: {s}"))?;
    if secs > 0.0 && secs <= MAX_TIME_SECS {
        Ok(secs)
    } else {
        Err(format!("time must be in (0, {MAX_TIME_SECS}] seconds (got {s})"))
    }
}

/// Who decides the moves of one side.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Controller {
    Human,
    Ai(AiSettings),
}

/// Which sides are played by humans.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameMode {
    PlayerVsPlayer,
    /// A human plays the given side against the AI.
    PlayerVsAi(Side),
    AiVsAi,
}

/// Figures from the last AI move, for display.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Diagnostics {
    /// Nodes visited (minimax) or iterations run (MCTS).
    pub iterations: u64,
    pub elapsed: Duration,
    /// Minimax score, or accumulated root wins for MCTS.
    pub score: f64,
    /// The action the AI played.
    pub action: Option<Action>,
}

/// Run the configured search on `board` and return the chosen successor.
pub fn choose_move(board: &Board, settings: &AiSettings) -> (Option<Board>, Diagnostics) {
    match settings.algorithm {
        Algorithm::Minimax | Algorithm::AlphaBeta => {
            let ab = settings.algorithm == Algorithm::AlphaBeta;
            let result = search_alpha_beta(board, ab, settings.depth.max(1));
            let diagnostics = Diagnostics {
                iterations: result.nodes,
                elapsed: result.elapsed,
                score: result.score as f64,
                action: result.board.as_ref().and_then(Board::last_action),
            };
            (result.board, diagnostics)
        }
        Algorithm::Mcts => {
            let result = search_mcts(board, settings.time_secs);
            let diagnostics = Diagnostics {
                iterations: result.iterations as u64,
                elapsed: result.elapsed,
                score: result.wins,
                action: result.board.as_ref().and_then(Board::last_action),
            };
            (result.board, diagnostics)
        }
    }
}

/// A game between two controllers.
#[derive(Clone, Debug)]
pub struct GameSession {
    board: Board,
    goat: Controller,
    tiger: Controller,
    paused: bool,
    state: GameState,
    diagnostics: Option<Diagnostics>,
}

impl GameSession {
    pub fn new(goat: Controller, tiger: Controller) -> Self {
        Self {
            board: Board::new(),
            goat,
            tiger,
            paused: false,
            state: GameState::InProgress,
            diagnostics: None,
        }
    }

    /// Build a session for `mode`, giving AI-controlled sides the matching
    /// settings.
    pub fn with_mode(mode: GameMode, goat_ai: AiSettings, tiger_ai: AiSettings) -> Self {
        let (goat, tiger) = match mode {
            GameMode::PlayerVsPlayer => (Controller::Human, Controller::Human),
            GameMode::PlayerVsAi(Side::Goat) => (Controller::Human, Controller::Ai(tiger_ai)),
            GameMode::PlayerVsAi(Side::Tiger) => (Controller::Ai(goat_ai), Controller::Human),
            GameMode::AiVsAi => (Controller::Ai(goat_ai), Controller::Ai(tiger_ai)),
        };
        Self::new(goat, tiger)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The result so far. Unlike [`Board::game_state`], a side left without
    /// any legal move has lost, the same way random playouts score it.
    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.diagnostics.as_ref()
    }

    pub fn controller(&self, side: Side) -> Controller {
        match side {
            Side::Goat => self.goat,
            Side::Tiger => self.tiger,
        }
    }

    pub fn set_controller(&mut self, side: Side, controller: Controller) {
        match side {
            Side::Goat => self.goat = controller,
            Side::Tiger => self.tiger = controller,
        }
    }

    pub fn side_to_move(&self) -> Side {
        Side::to_move(&self.board)
    }

    /// Start over from the initial position, keeping the controllers.
    pub fn reset(&mut self) {
        self.board.reset();
        self.state = GameState::InProgress;
        self.diagnostics = None;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Check if the side to move is played by the AI and may move now.
    pub fn is_ai_turn(&self) -> bool {
        !self.paused
            && !self.is_over()
            && matches!(self.controller(self.side_to_move()), Controller::Ai(_))
    }

    /// Handle a click on `pos` by the human whose turn it is.
    ///
    /// Places a goat during the placement phase; otherwise the first click
    /// selects a piece and the second moves it. Returns `true` if the click
    /// completed a move and the turn passed.
    pub fn click(&mut self, pos: Position) -> bool {
        if self.paused || self.is_over() {
            self.board.unselect_piece();
            return false;
        }
        if self.board.goats_to_move() && self.board.goats_in_hand() > 0 {
            return self.place(pos);
        }
        let Some(from) = self.board.selected_piece().map(|p| p.pos) else {
            self.board.select_piece_at(pos);
            return false;
        };
        let moved = self.move_piece(from, pos);
        self.board.unselect_piece();
        moved
    }

    /// Place a goat for the goat side and pass the turn.
    pub fn place(&mut self, pos: Position) -> bool {
        if self.is_over() || !self.board.goats_to_move() || !self.board.place_piece(pos) {
            return false;
        }
        self.finish_turn();
        true
    }

    /// Move a piece of the side to move and pass the turn.
    pub fn move_piece(&mut self, from: Position, to: Position) -> bool {
        if self.is_over() {
            return false;
        }
        let own = match self.board.piece_at(from) {
            Some(piece) => piece.is_goat() == self.board.goats_to_move(),
            None => false,
        };
        if !own {
            return false;
        }
        // Goats slide only after every goat is on the board.
        if self.board.goats_to_move() && self.board.goats_in_hand() > 0 {
            return false;
        }
        if !self.board.move_piece(from, to) {
            return false;
        }
        self.finish_turn();
        true
    }

    /// Let the AI move for the side to move.
    ///
    /// Returns the diagnostics of the search, or `None` if it is not an AI
    /// turn or the AI found no move.
    pub fn play_ai_turn(&mut self) -> Option<&Diagnostics> {
        if !self.is_ai_turn() {
            return None;
        }
        let Controller::Ai(settings) = self.controller(self.side_to_move()) else {
            return None;
        };
        self.play_with(&settings)
    }

    /// Search with `settings` for the side to move and apply the result,
    /// whoever controls that side.
    pub fn play_with(&mut self, settings: &AiSettings) -> Option<&Diagnostics> {
        if self.is_over() {
            return None;
        }
        let side = self.side_to_move();
        let (next, diagnostics) = choose_move(&self.board, settings);
        let next = next?;
        if let Some(action) = diagnostics.action {
            info!(
                "{side} ({}) plays {action} after {} iterations in {:.1}ms",
                settings.algorithm,
                diagnostics.iterations,
                diagnostics.elapsed.as_secs_f64() * 1000.0
            );
        }
        self.board = next;
        self.diagnostics = Some(diagnostics);
        self.update_state();
        self.diagnostics.as_ref()
    }

    fn finish_turn(&mut self) {
        self.board.switch_turn();
        self.update_state();
    }

    fn update_state(&mut self) {
        self.state = self.board.game_state();
        if !self.state.is_over() && self.board.legal_successors().is_empty() {
            info!("{} cannot move", self.side_to_move());
            self.state = stalemate(self.board.goats_to_move());
        }
        if self.state.is_over() {
            info!("game over: {}", self.state);
        }
    }
}
