//! Core domain types for the board.

use crate::error::{BoardError, BoardErrorKind};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the two symbols a player places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Marker {
    /// The `x` marker.
    #[display("x")]
    X,
    /// The `o` marker.
    #[display("o")]
    O,
}

impl Marker {
    /// Returns the other marker.
    pub fn complement(self) -> Self {
        match self {
            Marker::X => Marker::O,
            Marker::O => Marker::X,
        }
    }

    /// Single-character wire symbol.
    pub fn symbol(self) -> char {
        match self {
            Marker::X => 'x',
            Marker::O => 'o',
        }
    }
}

impl FromStr for Marker {
    type Err = BoardError;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Marker::X),
            "o" => Ok(Marker::O),
            _ => Err(BoardError::new(BoardErrorKind::InvalidMarker(s.to_string()))),
        }
    }
}

impl TryFrom<String> for Marker {
    type Error = BoardError;

    #[track_caller]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Marker> for String {
    fn from(marker: Marker) -> Self {
        marker.to_string()
    }
}

/// A single board cell.
///
/// On the wire a cell is a one-character string: `#` for empty,
/// otherwise the marker symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "char", try_from = "char")]
pub enum Cell {
    /// Nobody has played here.
    #[default]
    Empty,
    /// Holds a marker.
    Marked(Marker),
}

impl Cell {
    /// Wire symbol for an empty cell.
    pub const EMPTY_SYMBOL: char = '#';

    /// Returns true if no marker is present.
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// The marker in this cell, if any.
    pub fn marker(self) -> Option<Marker> {
        match self {
            Cell::Empty => None,
            Cell::Marked(marker) => Some(marker),
        }
    }
}

impl From<Cell> for char {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Empty => Cell::EMPTY_SYMBOL,
            Cell::Marked(marker) => marker.symbol(),
        }
    }
}

impl TryFrom<char> for Cell {
    type Error = BoardError;

    #[track_caller]
    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase() {
            Cell::EMPTY_SYMBOL => Ok(Cell::Empty),
            'x' => Ok(Cell::Marked(Marker::X)),
            'o' => Ok(Cell::Marked(Marker::O)),
            other => Err(BoardError::new(BoardErrorKind::InvalidSymbol(other))),
        }
    }
}

impl From<Marker> for Cell {
    fn from(marker: Marker) -> Self {
        Cell::Marked(marker)
    }
}

/// Where the game stands according to the board alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "winner")]
pub enum GameStatus {
    /// Moves can still be made.
    InProgress,
    /// A line of three was completed by this marker.
    Won(Marker),
    /// Full board, no line.
    Draw,
}

impl GameStatus {
    /// Returns true for `Won` and `Draw`.
    pub fn is_over(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complement_is_involution() {
        assert_eq!(Marker::X.complement(), Marker::O);
        assert_eq!(Marker::O.complement(), Marker::X);
        assert_eq!(Marker::X.complement().complement(), Marker::X);
    }

    #[test]
    fn test_marker_parse_is_case_insensitive() {
        assert_eq!("X".parse::<Marker>().unwrap(), Marker::X);
        assert_eq!(" o ".parse::<Marker>().unwrap(), Marker::O);
        let err = "z".parse::<Marker>().unwrap_err();
        assert_eq!(err.kind, BoardErrorKind::InvalidMarker("z".to_string()));
    }

    #[test]
    fn test_cell_wire_format() {
        assert_eq!(serde_json::to_string(&Cell::Empty).unwrap(), "\"#\"");
        assert_eq!(serde_json::to_string(&Cell::Marked(Marker::O)).unwrap(), "\"o\"");
        let cell: Cell = serde_json::from_str("\"X\"").unwrap();
        assert_eq!(cell, Cell::Marked(Marker::X));
        assert!(serde_json::from_str::<Cell>("\"?\"").is_err());
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_value(GameStatus::Won(Marker::X)).unwrap();
        assert_eq!(json, serde_json::json!({"status": "won", "winner": "x"}));
        let json = serde_json::to_value(GameStatus::Draw).unwrap();
        assert_eq!(json, serde_json::json!({"status": "draw"}));
    }
}
