//! Draw detection logic for tic-tac-toe.

use super::win::has_winning_line;
use crate::Board;
use tracing::instrument;

/// Checks if the board is full (all cells occupied).
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.cells().iter().all(|cell| !cell.is_empty())
}

/// A full board with no winning line.
pub fn is_draw(board: &Board) -> bool {
    is_full(board) && !has_winning_line(board)
}
