//! Canonical tic-tac-toe board for the noughts game server.
//!
//! The board is the single source of truth for placement legality and
//! for win/draw detection. The server keeps one canonical copy; every
//! client keeps a local copy refreshed with [`Board::set_state`].
//!
//! # Example
//!
//! ```
//! use noughts_board::{Board, GameStatus, Marker, Position};
//!
//! let mut board = Board::new();
//! board.place(Marker::X, Position::TopLeft)?;
//! board.place(Marker::X, Position::TopCenter)?;
//! board.place(Marker::X, Position::TopRight)?;
//! assert!(board.check_win());
//! assert_eq!(board.status(), GameStatus::Won(Marker::X));
//! # Ok::<(), noughts_board::BoardError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod error;
mod position;
pub mod rules;
mod types;

pub use board::{Board, BoardState};
pub use error::{BoardError, BoardErrorKind};
pub use position::Position;
pub use types::{Cell, GameStatus, Marker};
