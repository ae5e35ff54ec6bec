//! Pieces and their movement rules.
//!
//! Both kinds of piece slide one step along a board line. Tigers may also jump
//! two steps in a straight line over a goat, capturing it. Whether a line
//! exists between two intersections depends on the parity of the source: every
//! intersection has orthogonal lines, but only those with equal-parity
//! coordinates carry diagonals.

use crate::board::Board;
use crate::constants::{CAPTURE_DISTANCE, STEP_DISTANCE};
use crate::position::Position;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Tiger,
    Goat,
}

impl PieceKind {
    /// Single-letter symbol used in board diagrams.
    pub fn symbol(self) -> char {
        match self {
            PieceKind::Tiger => 'T',
            PieceKind::Goat => 'G',
        }
    }
}

/// A piece standing on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub pos: Position,
    /// Set while a human player has picked the piece up. Ignored by the search.
    pub selected: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, pos: Position) -> Self {
        Self {
            kind,
            pos,
            selected: false,
        }
    }

    pub fn tiger(pos: Position) -> Self {
        Self::new(PieceKind::Tiger, pos)
    }

    pub fn goat(pos: Position) -> Self {
        Self::new(PieceKind::Goat, pos)
    }

    #[inline]
    pub fn is_tiger(&self) -> bool {
        self.kind == PieceKind::Tiger
    }

    #[inline]
    pub fn is_goat(&self) -> bool {
        self.kind == PieceKind::Goat
    }

    /// Check if this piece could slide to `to` along a board line no longer
    /// than `distance` steps, landing on an empty intersection.
    pub fn can_move(&self, board: &Board, to: Position, distance: i32) -> bool {
        let (dx, dy) = (to.x - self.pos.x, to.y - self.pos.y);
        if !to.is_within_bounds() || (dx == 0 && dy == 0) {
            return false;
        }
        if dx.abs() > distance || dy.abs() > distance || board.is_piece_at(to) {
            return false;
        }
        if dx == 0 || dy == 0 {
            return true;
        }
        self.pos.has_diagonals() && to.has_diagonals()
    }

    /// Check if this piece is a tiger that can jump to `to`, capturing the goat
    /// in between.
    pub fn can_capture(&self, board: &Board, to: Position) -> bool {
        if !self.is_tiger() {
            return false;
        }
        let (dx, dy) = ((to.x - self.pos.x).abs(), (to.y - self.pos.y).abs());
        let straight = matches!((dx, dy), (0, 2) | (2, 0) | (2, 2));
        if !straight || !self.can_move(board, to, CAPTURE_DISTANCE) {
            return false;
        }
        self.pos
            .midpoint(to)
            .is_some_and(|mid| board.is_goat_at(mid))
    }

    /// Check if the piece's own rule allows it to go to `to`: a step for
    /// either kind, or a capture for a tiger.
    pub fn can_reach(&self, board: &Board, to: Position) -> bool {
        match self.kind {
            PieceKind::Goat => self.can_move(board, to, STEP_DISTANCE),
            PieceKind::Tiger => {
                self.can_move(board, to, STEP_DISTANCE) || self.can_capture(board, to)
            }
        }
    }

    /// All intersections within `radius` of the piece, excluding its own.
    fn neighborhood(&self, radius: i32) -> impl Iterator<Item = Position> + '_ {
        (-radius..=radius)
            .flat_map(move |dx| (-radius..=radius).map(move |dy| (dx, dy)))
            .filter(|&d| d != (0, 0))
            .filter_map(|(dx, dy)| self.pos.offset(dx, dy))
    }

    /// Destinations of one-step slides.
    pub fn step_targets(&self, board: &Board) -> Vec<Position> {
        self.neighborhood(STEP_DISTANCE)
            .filter(|&to| self.can_move(board, to, STEP_DISTANCE))
            .collect()
    }

    /// Landing squares of every capture this piece can make.
    pub fn capture_targets(&self, board: &Board) -> Vec<Position> {
        self.neighborhood(CAPTURE_DISTANCE)
            .filter(|&to| self.can_capture(board, to))
            .collect()
    }

    pub fn count_possible_captures(&self, board: &Board) -> usize {
        self.neighborhood(CAPTURE_DISTANCE)
            .filter(|&to| self.can_capture(board, to))
            .count()
    }

    /// A tiger is trapped when it can neither slide nor capture.
    pub fn is_trapped(&self, board: &Board) -> bool {
        self.is_tiger()
            && !self
                .neighborhood(CAPTURE_DISTANCE)
                .any(|to| self.can_move(board, to, STEP_DISTANCE) || self.can_capture(board, to))
    }
}
