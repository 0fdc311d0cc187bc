//! Board error types.

use crate::position::Position;
use derive_more::{Display, Error};

/// What went wrong on the board.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum BoardErrorKind {
    /// The target cell already holds a marker.
    #[display("{} is already occupied", _0)]
    CellOccupied(Position),
    /// Tile index outside 0-8.
    #[display("tile {} is outside the board (expected 0-8)", _0)]
    TileOutOfRange(usize),
    /// A cell symbol that is neither `#`, `x` nor `o`.
    #[display("'{}' is not a board symbol", _0)]
    InvalidSymbol(char),
    /// A flat board that does not have exactly nine cells.
    #[display("board has {} cells (expected 9)", _0)]
    WrongLength(usize),
    /// A marker string that is neither `x` nor `o`.
    #[display("'{}' is not a marker (expected x or o)", _0)]
    InvalidMarker(String),
}

/// Board error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Board error: {} at {}:{}", kind, file, line)]
pub struct BoardError {
    /// Error kind.
    pub kind: BoardErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl BoardError {
    /// Creates a new board error with caller location tracking.
    #[track_caller]
    pub fn new(kind: BoardErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
