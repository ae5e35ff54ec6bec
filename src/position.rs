//! Board coordinates and their text notation.
//!
//! A [`Position`] is a plain (x, y) pair. Columns are written as letters `a`-`e`
//! (x = 0..=4) and rows as digits `1`-`5` (y = 0..=4), so the top-left corner
//! (0, 0) is `a1` and the bottom-right corner (4, 4) is `e5`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::{MAX_COORD, N};

/// An intersection on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Check if the position lies on the 5x5 grid.
    #[inline]
    pub fn is_within_bounds(self) -> bool {
        (0..N).contains(&self.x) && (0..N).contains(&self.y)
    }

    /// Diagonal lines pass through intersections whose coordinates are
    /// both even or both odd.
    #[inline]
    pub fn has_diagonals(self) -> bool {
        (self.x + self.y) % 2 == 0
    }

    /// One of the four corners of the board.
    pub fn is_corner(self) -> bool {
        (self.x == 0 || self.x == MAX_COORD) && (self.y == 0 || self.y == MAX_COORD)
    }

    /// On the outer ring of the board.
    pub fn is_outside(self) -> bool {
        self.x < 1 || self.x > MAX_COORD - 1 || self.y < 1 || self.y > MAX_COORD - 1
    }

    /// The intersection halfway between two positions, if it falls on the grid.
    pub fn midpoint(self, other: Position) -> Option<Position> {
        let (sx, sy) = (self.x + other.x, self.y + other.y);
        if sx % 2 != 0 || sy % 2 != 0 {
            return None;
        }
        Some(Position::new(sx / 2, sy / 2))
    }

    /// Offset this position, returning `None` if the result leaves the board.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Position> {
        let p = Position::new(self.x + dx, self.y + dy);
        p.is_within_bounds().then_some(p)
    }

    /// Iterate over every intersection, column by column.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..N).flat_map(|x| (0..N).map(move |y| Position::new(x, y)))
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Position::new(x, y)
    }
}

/// Error returned when parsing a coordinate such as `c3`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    #[error("empty coordinate")]
    Empty,
    #[error("invalid column '{0}', expected a-e")]
    Column(char),
    #[error("invalid row '{0}', expected 1-5")]
    Row(String),
}

impl FromStr for Position {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let col = chars.next().ok_or(CoordError::Empty)?.to_ascii_lowercase();
        if !('a'..='e').contains(&col) {
            return Err(CoordError::Column(col));
        }
        let rest = chars.as_str();
        let row: i32 = rest.parse().map_err(|_| CoordError::Row(rest.to_string()))?;
        if !(1..=N).contains(&row) {
            return Err(CoordError::Row(rest.to_string()));
        }
        Ok(Position::new(col as i32 - 'a' as i32, row - 1))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_within_bounds() {
            let col = (b'a' + self.x as u8) as char;
            write!(f, "{col}{}", self.y + 1)
        } else {
            write!(f, "({},{})", self.x, self.y)
        }
    }
}

/// Parse a coordinate string, returning `None` if it is not on the board.
pub fn parse_coord(s: &str) -> Option<Position> {
    s.parse().ok()
}
