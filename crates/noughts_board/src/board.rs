//! The 3x3 board and its single mutation path.

use crate::error::{BoardError, BoardErrorKind};
use crate::position::Position;
use crate::rules;
use crate::types::{Cell, GameStatus, Marker};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, instrument};

/// Flat row-major board representation, as exchanged over the wire.
pub type BoardState = [Cell; 9];

/// 3x3 tic-tac-toe board.
///
/// Cells only change through [`Board::place`], which refuses occupied
/// cells, or wholesale through [`Board::reset`] and [`Board::set_state`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: BoardState,
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; 9],
        }
    }

    /// Gets the cell at the given position.
    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.to_index()]
    }

    /// Checks if a cell is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos).is_empty()
    }

    /// Returns all cells in row-major order.
    pub fn cells(&self) -> &BoardState {
        &self.cells
    }

    /// Places `marker` at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardErrorKind::CellOccupied`] if the cell already holds a
    /// marker; the board is left untouched.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn place(&mut self, marker: Marker, pos: Position) -> Result<(), BoardError> {
        if !self.is_empty(pos) {
            debug!(?pos, "Refusing placement on occupied cell");
            return Err(BoardError::new(BoardErrorKind::CellOccupied(pos)));
        }
        self.cells[pos.to_index()] = Cell::Marked(marker);
        Ok(())
    }

    /// True iff any row, column or diagonal holds three equal markers.
    pub fn check_win(&self) -> bool {
        rules::has_winning_line(self)
    }

    /// The marker that completed a line, if any.
    pub fn winner(&self) -> Option<Marker> {
        rules::check_winner(self)
    }

    /// True iff no cell is empty.
    pub fn check_full(&self) -> bool {
        rules::is_full(self)
    }

    /// Full board without a winning line.
    pub fn is_draw(&self) -> bool {
        rules::is_draw(self)
    }

    /// Summarizes the board as in progress, won or drawn.
    pub fn status(&self) -> GameStatus {
        match self.winner() {
            Some(marker) => GameStatus::Won(marker),
            None if self.check_full() => GameStatus::Draw,
            None => GameStatus::InProgress,
        }
    }

    /// Empties every cell.
    pub fn reset(&mut self) {
        self.cells = [Cell::Empty; 9];
    }

    /// Exports the flat representation.
    pub fn state(&self) -> BoardState {
        self.cells
    }

    /// Replaces the whole board with `state`. This is not a merge.
    pub fn set_state(&mut self, state: BoardState) {
        self.cells = state;
    }

    /// Empty positions, in row-major order.
    pub fn empty_cells(&self) -> Vec<Position> {
        Position::valid_moves(self)
    }

    /// Formats the board as a human-readable grid.
    ///
    /// Free cells show their 1-based number so a player can pick one.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                let symbol = match self.cells[pos] {
                    Cell::Empty => (pos + 1).to_string(),
                    Cell::Marked(marker) => marker.to_string(),
                };
                result.push_str(&format!(" {symbol} "));
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n---+---+---\n");
            }
        }
        result
    }
}

impl From<BoardState> for Board {
    fn from(cells: BoardState) -> Self {
        Self { cells }
    }
}

impl FromStr for Board {
    type Err = BoardError;

    /// Parses nine wire symbols, e.g. `"x#o######"`.
    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbols: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if symbols.len() != 9 {
            return Err(BoardError::new(BoardErrorKind::WrongLength(symbols.len())));
        }
        let mut cells = [Cell::Empty; 9];
        for (cell, symbol) in cells.iter_mut().zip(symbols) {
            *cell = Cell::try_from(symbol)?;
        }
        Ok(Self { cells })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_on_empty_cell() {
        let mut board = Board::new();
        board.place(Marker::X, Position::Center).unwrap();
        assert_eq!(board.get(Position::Center), Cell::Marked(Marker::X));
        assert_eq!(board.empty_cells().len(), 8);
    }

    #[test]
    fn test_place_on_occupied_cell_is_rejected() {
        let mut board = Board::new();
        board.place(Marker::X, Position::TopLeft).unwrap();
        let before = board.clone();

        let err = board.place(Marker::O, Position::TopLeft).unwrap_err();
        assert_eq!(err.kind, BoardErrorKind::CellOccupied(Position::TopLeft));
        assert_eq!(board, before);
    }

    #[test]
    fn test_status() {
        assert_eq!(Board::new().status(), GameStatus::InProgress);
        let won: Board = "ooo#xx###".parse().unwrap();
        assert_eq!(won.status(), GameStatus::Won(Marker::O));
        let drawn: Board = "xoxoxxoxo".parse().unwrap();
        assert_eq!(drawn.status(), GameStatus::Draw);
    }

    #[test]
    fn test_reset_empties_board() {
        let mut board: Board = "xoxoxxoxo".parse().unwrap();
        board.reset();
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_display() {
        let board: Board = "x###o####".parse().unwrap();
        let shown = board.display();
        assert!(shown.starts_with(" x | 2 | 3 "));
        assert!(shown.contains(" 4 | o | 6 "));
    }

    #[test]
    fn test_wire_format_is_flat_array() {
        let board: Board = "x#o######".parse().unwrap();
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(
            json,
            serde_json::json!(["x", "#", "o", "#", "#", "#", "#", "#", "#"])
        );
        assert!(serde_json::from_str::<Board>(r##"["x","#"]"##).is_err());
    }
}
