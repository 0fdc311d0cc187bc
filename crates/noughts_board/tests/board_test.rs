//! Behavioural tests for the board engine.

use noughts_board::{Board, BoardErrorKind, Cell, GameStatus, Marker, Position};

fn cell_from_digit(d: u32) -> Cell {
    match d {
        0 => Cell::Empty,
        1 => Cell::Marked(Marker::X),
        _ => Cell::Marked(Marker::O),
    }
}

/// Every one of the 3^9 cell assignments.
fn all_boards() -> impl Iterator<Item = Board> {
    (0..3u32.pow(9)).map(|mut n| {
        let mut cells = [Cell::Empty; 9];
        for cell in cells.iter_mut() {
            *cell = cell_from_digit(n % 3);
            n /= 3;
        }
        Board::from(cells)
    })
}

#[test]
fn test_check_win_matches_line_definition() {
    let lines: [[usize; 3]; 8] = [
        [0, 1, 2],
        [3, 4, 5],
        [6, 7, 8],
        [0, 3, 6],
        [1, 4, 7],
        [2, 5, 8],
        [0, 4, 8],
        [2, 4, 6],
    ];
    for board in all_boards() {
        let cells = board.cells();
        let expected = lines.iter().any(|[a, b, c]| {
            !cells[*a].is_empty() && cells[*a] == cells[*b] && cells[*b] == cells[*c]
        });
        assert_eq!(board.check_win(), expected, "board {cells:?}");
    }
}

#[test]
fn test_check_full_iff_no_empty_cell() {
    for board in all_boards() {
        let expected = board.cells().iter().all(|c| !c.is_empty());
        assert_eq!(board.check_full(), expected);
        assert_eq!(board.is_draw(), expected && !board.check_win());
    }
}

#[test]
fn test_place_mutates_exactly_one_cell() {
    let mut board = Board::new();
    board.place(Marker::O, Position::Center).unwrap();

    for pos in Position::ALL {
        let before = board.clone();
        match board.place(Marker::X, pos) {
            Ok(()) => {
                let changed = before
                    .cells()
                    .iter()
                    .zip(board.cells())
                    .filter(|(a, b)| a != b)
                    .count();
                assert_eq!(changed, 1);
                assert_eq!(board.get(pos), Cell::Marked(Marker::X));
            }
            Err(err) => {
                assert_eq!(pos, Position::Center);
                assert_eq!(err.kind, BoardErrorKind::CellOccupied(pos));
                assert_eq!(board, before);
            }
        }
        board = before;
    }
}

#[test]
fn test_set_state_of_own_state_is_identity() {
    let mut board: Board = "xo#ox#o##".parse().unwrap();
    let expected = board.clone();
    board.set_state(board.state());
    assert_eq!(board, expected);
}

#[test]
fn test_set_state_replaces_instead_of_merging() {
    let mut local: Board = "x########".parse().unwrap();
    let remote: Board = "#o#######".parse().unwrap();
    local.set_state(remote.state());
    assert_eq!(local.get(Position::TopLeft), Cell::Empty);
    assert_eq!(local, remote);
}

#[test]
fn test_top_row_win() {
    let mut board = Board::new();
    for pos in [Position::TopLeft, Position::TopCenter, Position::TopRight] {
        board.place(Marker::X, pos).unwrap();
    }
    assert!(board.check_win());
    assert_eq!(board.winner(), Some(Marker::X));
}

#[test]
fn test_alternating_full_board_is_draw() {
    // x o x
    // x o o
    // o x x
    let moves = [
        (Marker::X, 0),
        (Marker::O, 1),
        (Marker::X, 2),
        (Marker::O, 4),
        (Marker::X, 3),
        (Marker::O, 5),
        (Marker::X, 7),
        (Marker::O, 6),
        (Marker::X, 8),
    ];
    let mut board = Board::new();
    for (marker, index) in moves {
        board.place(marker, Position::from_index(index).unwrap()).unwrap();
    }
    assert!(board.check_full());
    assert!(!board.check_win());
    assert_eq!(board.status(), GameStatus::Draw);
}
