//! The nine cells of the board as a closed set.

use crate::board::Board;
use crate::error::{BoardError, BoardErrorKind};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::instrument;

/// A cell position on the board.
///
/// Positions are numbered 0-8 in row-major order on the wire
/// and 1-9 when shown to people.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumIter,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum Position {
    /// Top-left (position 0)
    TopLeft,
    /// Top-center (position 1)
    TopCenter,
    /// Top-right (position 2)
    TopRight,
    /// Middle-left (position 3)
    MiddleLeft,
    /// Center (position 4)
    Center,
    /// Middle-right (position 5)
    MiddleRight,
    /// Bottom-left (position 6)
    BottomLeft,
    /// Bottom-center (position 7)
    BottomCenter,
    /// Bottom-right (position 8)
    BottomRight,
}

impl Position {
    /// All 9 positions.
    pub const ALL: [Position; 9] = [
        Position::TopLeft,
        Position::TopCenter,
        Position::TopRight,
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ];

    /// Label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Position::TopLeft => "Top-left",
            Position::TopCenter => "Top-center",
            Position::TopRight => "Top-right",
            Position::MiddleLeft => "Middle-left",
            Position::Center => "Center",
            Position::MiddleRight => "Middle-right",
            Position::BottomLeft => "Bottom-left",
            Position::BottomCenter => "Bottom-center",
            Position::BottomRight => "Bottom-right",
        }
    }

    /// Converts position to board index (0-8).
    pub fn to_index(self) -> usize {
        self as usize
    }

    /// Creates position from board index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Like [`Position::from_index`], but reports out-of-range tiles as an error.
    #[track_caller]
    pub fn try_from_index(index: usize) -> Result<Self, BoardError> {
        Self::from_index(index)
            .ok_or_else(|| BoardError::new(BoardErrorKind::TileOutOfRange(index)))
    }

    /// Parses a human choice: a number 1-9 or a label (case-insensitive).
    #[instrument]
    pub fn parse_choice(s: &str) -> Option<Position> {
        let s = s.trim();
        if let Ok(num) = s.parse::<usize>() {
            return num.checked_sub(1).and_then(Self::from_index);
        }

        let s_lower = s.to_lowercase();
        Position::iter().find(|pos| pos.label().to_lowercase() == s_lower)
    }

    /// Returns only the empty positions on `board`.
    pub fn valid_moves(board: &Board) -> Vec<Position> {
        Self::ALL
            .iter()
            .copied()
            .filter(|pos| board.is_empty(*pos))
            .collect()
    }
}

impl From<Position> for u8 {
    fn from(pos: Position) -> Self {
        pos as u8
    }
}

impl TryFrom<u8> for Position {
    type Error = BoardError;

    #[track_caller]
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_from_index(usize::from(value))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for (i, pos) in Position::ALL.iter().enumerate() {
            assert_eq!(pos.to_index(), i);
            assert_eq!(Position::from_index(i), Some(*pos));
        }
        assert_eq!(Position::from_index(9), None);
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(Position::parse_choice("1"), Some(Position::TopLeft));
        assert_eq!(Position::parse_choice(" 9 "), Some(Position::BottomRight));
        assert_eq!(Position::parse_choice("center"), Some(Position::Center));
        assert_eq!(Position::parse_choice("0"), None);
        assert_eq!(Position::parse_choice("10"), None);
        assert_eq!(Position::parse_choice("middle"), None);
    }

    #[test]
    fn test_wire_is_index() {
        assert_eq!(serde_json::to_string(&Position::Center).unwrap(), "4");
        let pos: Position = serde_json::from_str("8").unwrap();
        assert_eq!(pos, Position::BottomRight);
        assert!(serde_json::from_str::<Position>("9").is_err());
    }
}
