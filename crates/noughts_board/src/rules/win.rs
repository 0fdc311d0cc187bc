//! Win detection logic for tic-tac-toe.

use crate::{Board, Marker, Position};
use tracing::instrument;

/// The eight winning lines: three rows, three columns, two diagonals.
pub const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [Position::MiddleLeft, Position::Center, Position::MiddleRight],
    [Position::BottomLeft, Position::BottomCenter, Position::BottomRight],
    // Columns
    [Position::TopLeft, Position::MiddleLeft, Position::BottomLeft],
    [Position::TopCenter, Position::Center, Position::BottomCenter],
    [Position::TopRight, Position::MiddleRight, Position::BottomRight],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// Returns the marker owning a completed line, if any.
///
/// Every line is examined independently; when a board carries more than one
/// completed line (only reachable through `set_state`) the first in
/// [`LINES`] order is reported.
#[instrument(skip(board))]
pub fn check_winner(board: &Board) -> Option<Marker> {
    LINES.iter().find_map(|[a, b, c]| {
        let marker = board.get(*a).marker()?;
        (board.get(*b).marker() == Some(marker) && board.get(*c).marker() == Some(marker))
            .then_some(marker)
    })
}

/// True iff some line holds three equal non-empty cells.
pub fn has_winning_line(board: &Board) -> bool {
    check_winner(board).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(marks: &[(Position, Marker)]) -> Board {
        let mut board = Board::new();
        for (pos, marker) in marks {
            board.place(*marker, *pos).unwrap();
        }
        board
    }

    #[test]
    fn test_no_winner_empty_board() {
        let board = Board::new();
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_winner_top_row() {
        let board = board_with(&[
            (Position::TopLeft, Marker::X),
            (Position::TopCenter, Marker::X),
            (Position::TopRight, Marker::X),
        ]);
        assert_eq!(check_winner(&board), Some(Marker::X));
    }

    #[test]
    fn test_winner_anti_diagonal() {
        let board = board_with(&[
            (Position::TopRight, Marker::O),
            (Position::Center, Marker::O),
            (Position::BottomLeft, Marker::O),
        ]);
        assert_eq!(check_winner(&board), Some(Marker::O));
    }

    #[test]
    fn test_every_line_is_detected() {
        for line in LINES {
            let board = board_with(&line.map(|pos| (pos, Marker::O)));
            assert!(has_winning_line(&board), "line {line:?} not detected");
        }
    }

    #[test]
    fn test_mixed_line_is_not_a_win() {
        let board = board_with(&[
            (Position::TopLeft, Marker::X),
            (Position::TopCenter, Marker::O),
            (Position::TopRight, Marker::X),
        ]);
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_no_winner_incomplete() {
        let board = board_with(&[
            (Position::TopLeft, Marker::X),
            (Position::TopCenter, Marker::X),
        ]);
        assert!(!has_winning_line(&board));
    }
}
