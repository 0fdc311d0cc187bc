//! Player registry, marker negotiation and the turn pointer.
//!
//! [`TurnCoordinator`] is plain data with no interior locking. The server
//! wraps it in [`GameService`](crate::GameService), which serializes every
//! call behind a single mutex.

use derive_more::{Display, Error};
use noughts_board::{Board, BoardErrorKind, GameStatus, Marker, Position};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Opaque caller-supplied player identifier.
///
/// Accepted on the wire as either a JSON string or a JSON integer and
/// always echoed back as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(from = "RawPlayerId", into = "String")]
pub struct PlayerId(String);

impl PlayerId {
    /// Wraps an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for PlayerId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<PlayerId> for String {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPlayerId {
    Text(String),
    Integer(i64),
}

impl From<RawPlayerId> for PlayerId {
    fn from(raw: RawPlayerId) -> Self {
        match raw {
            RawPlayerId::Text(text) => Self(text),
            RawPlayerId::Integer(n) => Self(n.to_string()),
        }
    }
}

/// Registration position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    /// Registered first; chooses the marker and moves first.
    #[display("player 1")]
    First,
    /// Registered second; receives the complementary marker.
    #[display("player 2")]
    Second,
}

/// Result of a connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// A new identifier took a free slot.
    Registered(Slot),
    /// A known identifier came back to its slot.
    Rejoined(Slot),
    /// Both slots are held by other identifiers.
    Rejected,
}

impl ConnectOutcome {
    /// Protocol code: 1/2 registered, 3/4 rejoined, -1 rejected.
    pub fn code(self) -> i8 {
        match self {
            ConnectOutcome::Registered(Slot::First) => 1,
            ConnectOutcome::Registered(Slot::Second) => 2,
            ConnectOutcome::Rejoined(Slot::First) => 3,
            ConnectOutcome::Rejoined(Slot::Second) => 4,
            ConnectOutcome::Rejected => -1,
        }
    }

    /// Inverse of [`ConnectOutcome::code`].
    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            1 => Some(ConnectOutcome::Registered(Slot::First)),
            2 => Some(ConnectOutcome::Registered(Slot::Second)),
            3 => Some(ConnectOutcome::Rejoined(Slot::First)),
            4 => Some(ConnectOutcome::Rejoined(Slot::Second)),
            -1 => Some(ConnectOutcome::Rejected),
            _ => None,
        }
    }

    /// Message shown to the connecting player.
    pub fn prompt(self) -> &'static str {
        match self {
            ConnectOutcome::Registered(Slot::First) => "You're player 1!",
            ConnectOutcome::Registered(Slot::Second) => "You're player 2!",
            ConnectOutcome::Rejoined(Slot::First) => "Player 1, welcome back!",
            ConnectOutcome::Rejoined(Slot::Second) => "Player 2, welcome back!",
            ConnectOutcome::Rejected => "There already is a maximum number of players.",
        }
    }

    /// The slot the caller now occupies, if any.
    pub fn slot(self) -> Option<Slot> {
        match self {
            ConnectOutcome::Registered(slot) | ConnectOutcome::Rejoined(slot) => Some(slot),
            ConnectOutcome::Rejected => None,
        }
    }
}

/// Everything a mover needs to know after a committed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReceipt {
    /// Cell that was filled.
    pub tile: Position,
    /// Marker placed there.
    pub marker: Marker,
    /// Who moves next.
    pub next_turn: PlayerId,
    /// Canonical board after the move.
    pub board: Board,
    /// Board status after the move.
    pub status: GameStatus,
}

/// Why the coordinator refused an operation.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum CoordinatorErrorKind {
    /// Nobody has connected since startup or the last reset.
    #[display("no player has connected yet")]
    NotInitialized,
    /// The identifier holds no slot.
    #[display("{} is not a registered player", _0)]
    UnknownPlayer(PlayerId),
    /// Only the first player may choose the marker.
    #[display("{} is not the first player and cannot choose a marker", _0)]
    NotFirstPlayer(PlayerId),
    /// The caller does not hold the turn pointer.
    #[display("it is {}'s turn, not {}'s", current, player)]
    NotYourTurn {
        /// Caller.
        player: PlayerId,
        /// Current turn holder.
        current: PlayerId,
    },
    /// The turn cannot pass while only one player is registered.
    #[display("the second player has not connected yet")]
    OpponentMissing,
    /// Moves need negotiated markers.
    #[display("the first player has not chosen a marker yet")]
    MarkerUnset,
    /// The marker was already chosen; it cannot change until reset.
    #[display("the first player's marker is already {}", _0)]
    MarkerLocked(Marker),
    /// A pushed board would erase or change an occupied cell.
    #[display("pushed board would overwrite occupied cell {:?}", _0)]
    BoardConflict(Position),
    /// The board already shows a win or a draw.
    #[display("the game is already over ({:?})", _0)]
    GameOver(GameStatus),
    /// The board refused the placement.
    #[display("{}", _0)]
    Board(BoardErrorKind),
}

/// Coordinator error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Coordinator error: {} at {}:{}", kind, file, line)]
pub struct CoordinatorError {
    /// Error kind.
    pub kind: CoordinatorErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl CoordinatorError {
    /// Creates a new coordinator error with caller location tracking.
    #[track_caller]
    pub fn new(kind: CoordinatorErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Canonical game state held by the server.
#[derive(Debug, Clone, Default)]
pub struct TurnCoordinator {
    first: Option<PlayerId>,
    second: Option<PlayerId>,
    first_marker: Option<Marker>,
    board: Board,
    current_turn: Option<PlayerId>,
    last_tile: Option<Position>,
}

impl TurnCoordinator {
    /// Creates an uninitialized coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or recognizes `id`.
    ///
    /// The first identifier also becomes the initial turn holder.
    #[instrument(skip(self))]
    pub fn connect(&mut self, id: PlayerId) -> ConnectOutcome {
        let known = self.slot_of(&id);
        let outcome = if self.first.is_none() {
            self.current_turn = Some(id.clone());
            self.first = Some(id.clone());
            ConnectOutcome::Registered(Slot::First)
        } else if self.second.is_none() && known.is_none() {
            self.second = Some(id.clone());
            ConnectOutcome::Registered(Slot::Second)
        } else {
            match known {
                Some(slot) => ConnectOutcome::Rejoined(slot),
                None => ConnectOutcome::Rejected,
            }
        };

        match outcome {
            ConnectOutcome::Rejected => warn!(%id, "Registry full, rejecting player"),
            _ => info!(%id, code = outcome.code(), "Player connected"),
        }
        outcome
    }

    /// Records the first player's marker choice.
    ///
    /// The choice is fixed once made; repeating the same marker is a no-op.
    ///
    /// # Errors
    ///
    /// [`CoordinatorErrorKind::NotFirstPlayer`] for any other caller,
    /// [`CoordinatorErrorKind::MarkerLocked`] when a different marker was
    /// already chosen.
    #[instrument(skip(self))]
    pub fn set_marker(&mut self, id: &PlayerId, marker: Marker) -> Result<(), CoordinatorError> {
        if self.first.as_ref() != Some(id) {
            warn!(%id, "Marker choice from a caller other than the first player");
            return Err(CoordinatorError::new(CoordinatorErrorKind::NotFirstPlayer(
                id.clone(),
            )));
        }
        match self.first_marker {
            Some(current) if current == marker => {
                debug!(%id, %marker, "Marker already chosen");
                return Ok(());
            }
            Some(current) => {
                warn!(%id, %current, requested = %marker, "Marker change refused");
                return Err(CoordinatorError::new(CoordinatorErrorKind::MarkerLocked(
                    current,
                )));
            }
            None => {}
        }
        self.first_marker = Some(marker);
        info!(%id, %marker, "First player chose marker");
        Ok(())
    }

    /// The first player's marker, once chosen.
    pub fn first_marker(&self) -> Option<Marker> {
        self.first_marker
    }

    /// Always the complement of the first player's marker; `None` until chosen.
    pub fn second_marker(&self) -> Option<Marker> {
        self.first_marker.map(Marker::complement)
    }

    /// The marker belonging to a registered identifier.
    pub fn marker_of(&self, id: &PlayerId) -> Option<Marker> {
        match self.slot_of(id)? {
            Slot::First => self.first_marker(),
            Slot::Second => self.second_marker(),
        }
    }

    /// Which slot `id` holds, if any.
    pub fn slot_of(&self, id: &PlayerId) -> Option<Slot> {
        if self.first.as_ref() == Some(id) {
            Some(Slot::First)
        } else if self.second.as_ref() == Some(id) {
            Some(Slot::Second)
        } else {
            None
        }
    }

    /// Identifier in the first slot.
    pub fn first_player(&self) -> Option<&PlayerId> {
        self.first.as_ref()
    }

    /// Identifier in the second slot.
    pub fn second_player(&self) -> Option<&PlayerId> {
        self.second.as_ref()
    }

    /// Replaces the canonical board wholesale.
    ///
    /// Kept for clients that push their board after every move;
    /// [`TurnCoordinator::commit_move`] makes this unnecessary. The pushed
    /// board must keep every occupied cell as it is; only
    /// [`TurnCoordinator::reset`] clears cells.
    #[instrument(skip(self, board))]
    pub fn set_board(&mut self, id: &PlayerId, board: Board) -> Result<(), CoordinatorError> {
        if self.slot_of(id).is_none() {
            warn!(%id, "Board push from unregistered caller");
            return Err(CoordinatorError::new(CoordinatorErrorKind::UnknownPlayer(
                id.clone(),
            )));
        }
        if let Some(pos) = Position::ALL
            .into_iter()
            .find(|&pos| !self.board.is_empty(pos) && board.get(pos) != self.board.get(pos))
        {
            warn!(%id, ?pos, "Board push would overwrite an occupied cell");
            return Err(CoordinatorError::new(CoordinatorErrorKind::BoardConflict(pos)));
        }
        self.board = board;
        debug!(%id, "Canonical board replaced");
        Ok(())
    }

    /// Records `tile` and passes the turn to the other player.
    ///
    /// This is only the turn flip: the board is not consulted or changed.
    /// Returns the new turn holder.
    #[instrument(skip(self))]
    pub fn record_tile(&mut self, tile: Position) -> Result<PlayerId, CoordinatorError> {
        let next = self.next_turn()?;
        self.last_tile = Some(tile);
        self.current_turn = Some(next.clone());
        info!(?tile, next = %next, "Turn passed");
        Ok(next)
    }

    /// Validates and applies `id`'s move at `tile`, then flips the turn.
    ///
    /// All checks run before anything is written, so a refused move leaves
    /// board, last tile and turn pointer exactly as they were.
    #[instrument(skip(self))]
    pub fn commit_move(
        &mut self,
        id: &PlayerId,
        tile: Position,
    ) -> Result<MoveReceipt, CoordinatorError> {
        if self.slot_of(id).is_none() {
            return Err(CoordinatorError::new(CoordinatorErrorKind::UnknownPlayer(
                id.clone(),
            )));
        }
        let next = self.next_turn()?;
        let current = self
            .current_turn
            .clone()
            .ok_or_else(|| CoordinatorError::new(CoordinatorErrorKind::NotInitialized))?;
        if current != *id {
            warn!(%id, %current, "Move out of turn");
            return Err(CoordinatorError::new(CoordinatorErrorKind::NotYourTurn {
                player: id.clone(),
                current,
            }));
        }
        let marker = self
            .marker_of(id)
            .ok_or_else(|| CoordinatorError::new(CoordinatorErrorKind::MarkerUnset))?;
        let status = self.board.status();
        if status.is_over() {
            return Err(CoordinatorError::new(CoordinatorErrorKind::GameOver(status)));
        }

        self.board.place(marker, tile).map_err(|e| {
            warn!(%id, ?tile, error = %e, "Placement refused");
            CoordinatorError::new(CoordinatorErrorKind::Board(e.kind))
        })?;
        self.last_tile = Some(tile);
        self.current_turn = Some(next.clone());

        let status = self.board.status();
        info!(%id, ?tile, %marker, next = %next, ?status, "Move committed");
        Ok(MoveReceipt {
            tile,
            marker,
            next_turn: next,
            board: self.board.clone(),
            status,
        })
    }

    /// Identifier currently allowed to move.
    pub fn current_turn(&self) -> Option<&PlayerId> {
        self.current_turn.as_ref()
    }

    /// Most recently recorded tile.
    pub fn last_tile(&self) -> Option<Position> {
        self.last_tile
    }

    /// The canonical board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Status of the canonical board.
    pub fn status(&self) -> GameStatus {
        self.board.status()
    }

    /// Returns to the uninitialized state.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        *self = Self::default();
        info!("Coordinator reset");
    }

    fn next_turn(&self) -> Result<PlayerId, CoordinatorError> {
        let current = self
            .current_turn
            .as_ref()
            .ok_or_else(|| CoordinatorError::new(CoordinatorErrorKind::NotInitialized))?;
        let (first, second) = match (&self.first, &self.second) {
            (Some(first), Some(second)) => (first, second),
            _ => return Err(CoordinatorError::new(CoordinatorErrorKind::OpponentMissing)),
        };
        Ok(if current == first {
            second.clone()
        } else {
            first.clone()
        })
    }
}
