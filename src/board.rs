//! Game state and rule enforcement.
//!
//! The [`Board`] owns every piece plus the counters that drive the game:
//! goats still in hand, goats captured, trapped tigers and the recent move
//! history used for repetition draws. All mutating operations check their
//! preconditions and return `false` without touching the board when they fail.

use std::collections::VecDeque;
use std::fmt;

use crate::constants::{
    CAPTURES_TO_WIN, HISTORY_LEN, N, PLACEABLE_GOATS, TIGER_COUNT, TIGER_START, TRAPPED_TO_WIN,
};
use crate::piece::{Piece, PieceKind};
use crate::position::Position;

/// Outcome of a game, derived from the board counters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GameState {
    InProgress,
    TigerWin,
    GoatWin,
    Draw,
}

impl GameState {
    pub fn is_over(self) -> bool {
        self != GameState::InProgress
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameState::InProgress => "in_progress",
            GameState::TigerWin => "tiger_win",
            GameState::GoatWin => "goat_win",
            GameState::Draw => "draw",
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameState::InProgress => "In progress",
            GameState::TigerWin => "Tigers win!",
            GameState::GoatWin => "Goats win!",
            GameState::Draw => "Draw!",
        };
        f.write_str(s)
    }
}

/// A recorded piece movement, kept for repetition detection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Position,
    pub to: Position,
}

impl Move {
    pub fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }

    /// The same move with its endpoints swapped.
    pub fn reversed(self) -> Self {
        Self::new(self.to, self.from)
    }
}

/// A single legal action, as applied to a board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// A goat enters the board from the hand.
    Place(Position),
    /// A piece slides one step.
    Step { from: Position, to: Position },
    /// A tiger jumps over the goat at `over`.
    Capture {
        from: Position,
        over: Position,
        to: Position,
    },
}

impl Action {
    /// The intersection the acting piece ends up on.
    pub fn destination(self) -> Position {
        match self {
            Action::Place(to) | Action::Step { to, .. } | Action::Capture { to, .. } => to,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Place(to) => write!(f, "{to}"),
            Action::Step { from, to } => write!(f, "{from}-{to}"),
            Action::Capture { from, to, .. } => write!(f, "{from}x{to}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Piece>; (N * N) as usize],
    goats_to_move: bool,
    goats_in_hand: u32,
    tigers_trapped: u32,
    goats_captured: u32,
    history: VecDeque<Move>,
    last_action: Option<Action>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The starting position: four tigers in the corners, twenty goats in hand,
    /// goats to move.
    pub fn new() -> Self {
        let mut board = Self {
            cells: [None; (N * N) as usize],
            goats_to_move: true,
            goats_in_hand: PLACEABLE_GOATS,
            tigers_trapped: 0,
            goats_captured: 0,
            history: VecDeque::with_capacity(HISTORY_LEN + 1),
            last_action: None,
        };
        board.reset();
        board
    }

    /// Build a board from an arbitrary arrangement.
    ///
    /// Returns `None` unless there are exactly four tigers on distinct
    /// in-bounds squares and the goats on the board, in hand and captured add
    /// up to twenty.
    pub fn from_pieces(
        pieces: &[Piece],
        goats_in_hand: u32,
        goats_captured: u32,
        goats_to_move: bool,
    ) -> Option<Self> {
        let mut board = Self::new();
        board.cells = [None; (N * N) as usize];
        for piece in pieces {
            if !piece.pos.is_within_bounds() || board.is_piece_at(piece.pos) {
                return None;
            }
            board.cells[idx(piece.pos)] = Some(Piece::new(piece.kind, piece.pos));
        }
        let goats = board.goats_on_board() as u32;
        if board.tigers().count() != TIGER_COUNT
            || goats + goats_in_hand + goats_captured != PLACEABLE_GOATS
        {
            return None;
        }
        board.goats_in_hand = goats_in_hand;
        board.goats_captured = goats_captured;
        board.goats_to_move = goats_to_move;
        board.refresh();
        Some(board)
    }

    /// Restore the starting position.
    pub fn reset(&mut self) {
        self.cells = [None; (N * N) as usize];
        for (x, y) in TIGER_START {
            let pos = Position::new(x, y);
            self.cells[idx(pos)] = Some(Piece::tiger(pos));
        }
        self.goats_to_move = true;
        self.goats_in_hand = PLACEABLE_GOATS;
        self.tigers_trapped = 0;
        self.goats_captured = 0;
        self.history.clear();
        self.last_action = None;
    }

    // -------------------------------------------------------------------------
    // Counters and queries
    // -------------------------------------------------------------------------

    #[inline]
    pub fn goats_to_move(&self) -> bool {
        self.goats_to_move
    }

    #[inline]
    pub fn goats_in_hand(&self) -> u32 {
        self.goats_in_hand
    }

    #[inline]
    pub fn goats_captured(&self) -> u32 {
        self.goats_captured
    }

    /// Trapped tigers as of the last mutation.
    #[inline]
    pub fn tigers_trapped(&self) -> u32 {
        self.tigers_trapped
    }

    /// The most recent moves, oldest first.
    pub fn history(&self) -> &VecDeque<Move> {
        &self.history
    }

    /// The action that produced this board, if any.
    pub fn last_action(&self) -> Option<Action> {
        self.last_action
    }

    /// Flip the side to move.
    pub fn switch_turn(&mut self) {
        self.goats_to_move = !self.goats_to_move;
    }

    #[inline]
    pub fn is_within_bounds(&self, pos: Position) -> bool {
        pos.is_within_bounds()
    }

    pub fn piece_at(&self, pos: Position) -> Option<&Piece> {
        if !pos.is_within_bounds() {
            return None;
        }
        self.cells[idx(pos)].as_ref()
    }

    pub fn is_piece_at(&self, pos: Position) -> bool {
        self.piece_at(pos).is_some()
    }

    pub fn is_goat_at(&self, pos: Position) -> bool {
        self.piece_at(pos).is_some_and(Piece::is_goat)
    }

    pub fn is_tiger_at(&self, pos: Position) -> bool {
        self.piece_at(pos).is_some_and(Piece::is_tiger)
    }

    /// Every piece on the board, row by row.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.cells.iter().flatten()
    }

    pub fn tigers(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces().filter(|p| p.is_tiger())
    }

    pub fn goats(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces().filter(|p| p.is_goat())
    }

    pub fn goats_on_board(&self) -> usize {
        self.goats().count()
    }

    pub fn count_tigers_trapped(&self) -> u32 {
        self.tigers().filter(|t| t.is_trapped(self)).count() as u32
    }

    pub fn count_tigers_in_corners(&self) -> u32 {
        self.tigers().filter(|t| t.pos.is_corner()).count() as u32
    }

    /// Goats standing on the outer ring of the board.
    pub fn count_outside_goats(&self) -> u32 {
        self.goats().filter(|g| g.pos.is_outside()).count() as u32
    }

    /// Captures currently available to all tigers together.
    pub fn count_possible_captures(&self) -> u32 {
        self.tigers()
            .map(|t| t.count_possible_captures(self) as u32)
            .sum()
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Place a goat from the hand onto an empty intersection.
    pub fn place_piece(&mut self, pos: Position) -> bool {
        if self.goats_in_hand == 0 || !pos.is_within_bounds() || self.is_piece_at(pos) {
            return false;
        }
        self.cells[idx(pos)] = Some(Piece::goat(pos));
        self.goats_in_hand -= 1;
        self.last_action = Some(Action::Place(pos));
        self.refresh();
        true
    }

    /// Remove the goat at `pos` and count it as captured.
    pub fn capture_at(&mut self, pos: Position) -> bool {
        if !self.is_goat_at(pos) {
            return false;
        }
        self.cells[idx(pos)] = None;
        self.goats_captured += 1;
        self.refresh();
        true
    }

    /// Move the piece at `from` to `to` if its rule allows it.
    ///
    /// A tiger landing two steps away captures the goat it jumped over. Once
    /// every goat has been placed the move is appended to the history.
    pub fn move_piece(&mut self, from: Position, to: Position) -> bool {
        let Some(piece) = self.piece_at(from) else {
            return false;
        };
        if !piece.can_reach(self, to) {
            return false;
        }
        self.apply_move(from, to);
        true
    }

    /// Apply a move that has already been validated.
    pub(crate) fn apply_move(&mut self, from: Position, to: Position) -> Action {
        let mut action = Action::Step { from, to };
        if let Some(over) = self.jumped_goat(from, to) {
            self.cells[idx(over)] = None;
            self.goats_captured += 1;
            action = Action::Capture { from, over, to };
        }
        if let Some(mut piece) = self.cells[idx(from)].take() {
            piece.pos = to;
            piece.selected = false;
            self.cells[idx(to)] = Some(piece);
        }
        if self.goats_in_hand == 0 {
            self.history.push_back(Move::new(from, to));
            if self.history.len() > HISTORY_LEN {
                self.history.pop_front();
            }
        }
        self.last_action = Some(action);
        self.refresh();
        action
    }

    /// The goat a tiger would capture by jumping from `from` to `to`.
    fn jumped_goat(&self, from: Position, to: Position) -> Option<Position> {
        if !self.is_tiger_at(from) {
            return None;
        }
        let (dx, dy) = ((to.x - from.x).abs(), (to.y - from.y).abs());
        if dx.max(dy) != 2 {
            return None;
        }
        from.midpoint(to).filter(|&mid| self.is_goat_at(mid))
    }

    fn refresh(&mut self) {
        self.tigers_trapped = self.count_tigers_trapped();
    }

    // -------------------------------------------------------------------------
    // Selection (presentation helpers)
    // -------------------------------------------------------------------------

    /// Pick up the piece at `pos` if it belongs to the side to move.
    pub fn select_piece_at(&mut self, pos: Position) -> bool {
        let selectable = self
            .piece_at(pos)
            .is_some_and(|p| p.is_goat() == self.goats_to_move);
        if !selectable {
            return false;
        }
        self.unselect_piece();
        if let Some(piece) = self.cells[idx(pos)].as_mut() {
            piece.selected = true;
        }
        true
    }

    pub fn selected_piece(&self) -> Option<&Piece> {
        self.pieces().find(|p| p.selected)
    }

    pub fn is_piece_selected(&self) -> bool {
        self.selected_piece().is_some()
    }

    pub fn unselect_piece(&mut self) {
        for piece in self.cells.iter_mut().flatten() {
            piece.selected = false;
        }
    }

    // -------------------------------------------------------------------------
    // Successor generation
    // -------------------------------------------------------------------------

    /// Every action available to the side to move, each paired with the
    /// resulting board. The turn is not switched on the resulting boards.
    ///
    /// A tiger that can capture must capture: its plain slides are only
    /// generated when it has no capture available.
    pub fn legal_actions(&self) -> Vec<(Action, Board)> {
        let mut out = Vec::new();
        if self.goats_to_move && self.goats_in_hand > 0 {
            for pos in Position::all().filter(|&p| !self.is_piece_at(p)) {
                let mut board = self.successor();
                board.place_piece(pos);
                out.push((Action::Place(pos), board));
            }
            return out;
        }

        let kind = if self.goats_to_move {
            PieceKind::Goat
        } else {
            PieceKind::Tiger
        };
        let movers: Vec<Piece> = self.pieces().filter(|p| p.kind == kind).copied().collect();
        for piece in movers {
            let captures = piece.capture_targets(self);
            let targets = if captures.is_empty() {
                piece.step_targets(self)
            } else {
                captures
            };
            for to in targets {
                let mut board = self.successor();
                let action = board.apply_move(piece.pos, to);
                out.push((action, board));
            }
        }
        out
    }

    /// Every board reachable by one legal action of the side to move.
    pub fn legal_successors(&self) -> Vec<Board> {
        self.legal_actions().into_iter().map(|(_, b)| b).collect()
    }

    fn successor(&self) -> Board {
        let mut board = self.clone();
        board.unselect_piece();
        board
    }

    // -------------------------------------------------------------------------
    // Game result
    // -------------------------------------------------------------------------

    pub fn is_tiger_win(&self) -> bool {
        self.goats_captured >= CAPTURES_TO_WIN
    }

    pub fn is_goat_win(&self) -> bool {
        self.tigers_trapped >= TRAPPED_TO_WIN
    }

    /// Check the recent history for a back-and-forth or a three-move cycle.
    pub fn is_draw(&self) -> bool {
        if self.goats_in_hand > 0 || self.history.len() < HISTORY_LEN {
            return false;
        }
        let len = self.history.len();
        let nth_last = |n: usize| self.history[len - n];

        // Pieces moving back and forth
        if nth_last(1) == nth_last(3).reversed() && nth_last(2) == nth_last(4).reversed() {
            return true;
        }
        // Pieces circling
        nth_last(1) == nth_last(4) && nth_last(2) == nth_last(5)
    }

    /// The state of the game: captured goats are checked before trapped
    /// tigers, then repetition.
    pub fn game_state(&self) -> GameState {
        if self.is_tiger_win() {
            GameState::TigerWin
        } else if self.is_goat_win() {
            GameState::GoatWin
        } else if self.is_draw() {
            GameState::Draw
        } else {
            GameState::InProgress
        }
    }

    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        let mut board = Self::new();
        board.cells = [None; (N * N) as usize];
        board.goats_in_hand = 0;
        board
    }

    #[cfg(test)]
    pub(crate) fn put(&mut self, piece: Piece) {
        self.cells[idx(piece.pos)] = Some(piece);
        self.refresh();
    }

    #[cfg(test)]
    pub(crate) fn remove(&mut self, pos: Position) {
        self.cells[idx(pos)] = None;
        self.refresh();
    }

    #[cfg(test)]
    pub(crate) fn set_history(&mut self, moves: &[Move]) {
        self.history = moves.iter().copied().collect();
    }
}

#[inline]
fn idx(pos: Position) -> usize {
    (pos.y * N + pos.x) as usize
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for x in 0..N {
            write!(f, " {}", (b'a' + x as u8) as char)?;
        }
        writeln!(f)?;
        for y in 0..N {
            write!(f, "{:>2}", y + 1)?;
            for x in 0..N {
                let ch = match self.piece_at(Position::new(x, y)) {
                    Some(piece) => piece.kind.symbol(),
                    None => '.',
                };
                write!(f, " {ch}")?;
            }
            writeln!(f)?;
        }
        writeln!(
            f,
            "turn: {}  in hand: {}  captured: {}  trapped: {}",
            if self.goats_to_move { "goat" } else { "tiger" },
            self.goats_in_hand,
            self.goats_captured,
            self.tigers_trapped
        )
    }
}
