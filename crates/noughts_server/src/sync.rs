//! Client-side state machine that keeps a local board in step with the server.

use crate::client::{ClientError, ClientErrorKind};
use crate::coordinator::{ConnectOutcome, MoveReceipt, PlayerId, Slot};
use crate::players::Player;
use crate::transport::GameTransport;
use derive_more::{Display, Error};
use noughts_board::{Board, Marker, Position};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// How a session ended, from this client's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SessionOutcome {
    /// This client completed a line.
    #[display("won")]
    Won,
    /// The opponent completed a line.
    #[display("lost")]
    Lost,
    /// The board filled without a line.
    #[display("draw")]
    Draw,
    /// The server already had two players.
    #[display("rejected")]
    Rejected,
}

/// Where a [`SyncSession`] currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SyncState {
    /// About to register with the server.
    #[display("connecting")]
    Connecting,
    /// Registered first; choosing and publishing the marker.
    #[display("assigning marker")]
    AssigningMarker,
    /// Registered second; waiting for the first player's marker choice.
    #[display("awaiting marker")]
    AwaitingMarker,
    /// Recognized as a returning player; restoring marker, board and turn.
    #[display("rejoining as {:?}", _0)]
    Rejoining(Slot),
    /// Waiting for this client's turn.
    #[display("polling turn")]
    PollingTurn,
    /// Choosing and committing a move.
    #[display("moving")]
    Moving,
    /// The game is over.
    #[display("terminal ({})", _0)]
    Terminal(SessionOutcome),
    /// The server refused registration.
    #[display("rejected")]
    Rejected,
}

impl SyncState {
    /// The outcome, once the session can make no further progress.
    pub fn outcome(self) -> Option<SessionOutcome> {
        match self {
            SyncState::Terminal(outcome) => Some(outcome),
            SyncState::Rejected => Some(SessionOutcome::Rejected),
            _ => None,
        }
    }
}

/// What stopped a session.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SyncErrorKind {
    /// Talking to the server failed.
    #[display("{}", _0)]
    Transport(ClientErrorKind),
    /// The move source failed.
    #[display("player failed: {}", _0)]
    Player(String),
    /// Tried to move without knowing our marker.
    #[display("no marker known for this client")]
    NoMarker,
}

/// Sync error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Sync error: {} at {}:{}", kind, file, line)]
pub struct SyncError {
    /// Error kind.
    pub kind: SyncErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SyncError {
    /// Creates a new sync error with caller location tracking.
    #[track_caller]
    pub fn new(kind: SyncErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<ClientError> for SyncError {
    #[track_caller]
    fn from(err: ClientError) -> Self {
        Self::new(SyncErrorKind::Transport(err.kind))
    }
}

impl From<anyhow::Error> for SyncError {
    #[track_caller]
    fn from(err: anyhow::Error) -> Self {
        Self::new(SyncErrorKind::Player(format!("{err:#}")))
    }
}

/// Timing knobs for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_getters::Getters, derive_new::new)]
pub struct SyncSettings {
    /// Sleep between marker pulls while the first player is choosing.
    marker_poll_interval: Duration,
    /// Upper bound on one long-poll for the turn.
    turn_wait_timeout: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            marker_poll_interval: Duration::from_millis(250),
            turn_wait_timeout: Duration::from_secs(30),
        }
    }
}

/// Decides whether `board` ends the game for `me`.
///
/// A completed line means the player who just moved won. Moves flip the
/// turn, so the winner is whoever does *not* hold the turn.
pub fn terminal_outcome(
    board: &Board,
    me: &PlayerId,
    current_turn: Option<&PlayerId>,
) -> Option<SessionOutcome> {
    if board.check_win() {
        Some(if current_turn != Some(me) {
            SessionOutcome::Won
        } else {
            SessionOutcome::Lost
        })
    } else if board.check_full() {
        Some(SessionOutcome::Draw)
    } else {
        None
    }
}

/// One client's view of a game, driven to completion by [`SyncSession::run`].
pub struct SyncSession<T, P> {
    id: PlayerId,
    transport: T,
    player: P,
    settings: SyncSettings,
    board: Board,
    marker: Option<Marker>,
    state: SyncState,
}

impl<T: GameTransport, P: Player> SyncSession<T, P> {
    /// Creates a session that has not contacted the server yet.
    pub fn new(id: PlayerId, transport: T, player: P, settings: SyncSettings) -> Self {
        Self {
            id,
            transport,
            player,
            settings,
            board: Board::new(),
            marker: None,
            state: SyncState::Connecting,
        }
    }

    /// Current state.
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Local copy of the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// This client's marker, once known.
    pub fn marker(&self) -> Option<Marker> {
        self.marker
    }

    /// This client's identifier.
    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    /// The move source.
    pub fn player(&self) -> &P {
        &self.player
    }

    /// Steps until the game ends or the server refuses us.
    ///
    /// # Errors
    ///
    /// Transport failures and move source failures stop the session.
    #[instrument(skip(self), fields(id = %self.id, player = %self.player.name()))]
    pub async fn run(&mut self) -> Result<SessionOutcome, SyncError> {
        loop {
            if let Some(outcome) = self.state.outcome() {
                info!(%outcome, "Session finished");
                return Ok(outcome);
            }
            self.step().await?;
        }
    }

    /// Performs the work of the current state and moves to the next one.
    pub async fn step(&mut self) -> Result<SyncState, SyncError> {
        let next = match self.state {
            SyncState::Connecting => self.connect().await?,
            SyncState::AssigningMarker => self.assign_marker().await?,
            SyncState::AwaitingMarker => self.await_marker().await?,
            SyncState::Rejoining(slot) => self.rejoin(slot).await?,
            SyncState::PollingTurn => self.poll_turn().await?,
            SyncState::Moving => self.make_move().await?,
            done @ (SyncState::Terminal(_) | SyncState::Rejected) => done,
        };
        if next != self.state {
            info!(id = %self.id, from = %self.state, to = %next, "Sync transition");
            self.state = next;
        }
        Ok(next)
    }

    async fn connect(&mut self) -> Result<SyncState, SyncError> {
        let outcome = self.transport.connect(&self.id).await?;
        info!(id = %self.id, prompt = outcome.prompt(), "Connected");
        Ok(match outcome {
            ConnectOutcome::Registered(Slot::First) => SyncState::AssigningMarker,
            ConnectOutcome::Registered(Slot::Second) => SyncState::AwaitingMarker,
            ConnectOutcome::Rejoined(slot) => SyncState::Rejoining(slot),
            ConnectOutcome::Rejected => SyncState::Rejected,
        })
    }

    async fn assign_marker(&mut self) -> Result<SyncState, SyncError> {
        let marker = self.player.choose_marker().await?;
        self.transport.set_marker(&self.id, marker).await?;
        self.transport.set_board(&self.id, &self.board).await?;
        self.marker = Some(marker);
        Ok(SyncState::PollingTurn)
    }

    async fn await_marker(&mut self) -> Result<SyncState, SyncError> {
        loop {
            if let Some(marker) = self.transport.second_marker().await? {
                info!(id = %self.id, %marker, "Marker assigned by first player");
                self.marker = Some(marker);
                return Ok(SyncState::PollingTurn);
            }
            debug!(id = %self.id, "First player has not chosen a marker yet");
            tokio::time::sleep(self.settings.marker_poll_interval).await;
        }
    }

    async fn rejoin(&mut self, slot: Slot) -> Result<SyncState, SyncError> {
        let marker = match slot {
            Slot::First => self.transport.first_marker().await?,
            Slot::Second => self.transport.second_marker().await?,
        };
        let Some(marker) = marker else {
            return Ok(match slot {
                Slot::First => SyncState::AssigningMarker,
                Slot::Second => SyncState::AwaitingMarker,
            });
        };
        self.marker = Some(marker);

        self.pull_board().await?;
        let turn = self.transport.current_turn().await?;
        info!(id = %self.id, %marker, turn = ?turn, "Restored session");

        Ok(match terminal_outcome(&self.board, &self.id, turn.as_ref()) {
            Some(outcome) => SyncState::Terminal(outcome),
            None => SyncState::PollingTurn,
        })
    }

    async fn poll_turn(&mut self) -> Result<SyncState, SyncError> {
        loop {
            let turn = self
                .transport
                .wait_for_turn(&self.id, self.settings.turn_wait_timeout)
                .await?;
            if turn.as_ref() == Some(&self.id) {
                break;
            }
            debug!(id = %self.id, turn = ?turn, "Still the opponent's turn");
        }

        self.pull_board().await?;
        Ok(match terminal_outcome(&self.board, &self.id, Some(&self.id)) {
            Some(outcome) => SyncState::Terminal(outcome),
            None => SyncState::Moving,
        })
    }

    async fn make_move(&mut self) -> Result<SyncState, SyncError> {
        let marker = self
            .marker
            .ok_or_else(|| SyncError::new(SyncErrorKind::NoMarker))?;

        let receipt = loop {
            let tile = self.choose_tile(marker).await?;
            match self.commit(tile).await? {
                Some(receipt) => break receipt,
                None => self.pull_board().await?,
            }
        };

        self.board.set_state(receipt.board.state());
        self.player.observe(&self.board);
        Ok(
            match terminal_outcome(&self.board, &self.id, Some(&receipt.next_turn)) {
                Some(outcome) => SyncState::Terminal(outcome),
                None => SyncState::PollingTurn,
            },
        )
    }

    /// Asks the player until it names a tile that is free locally, and
    /// places it on the local board.
    async fn choose_tile(&mut self, marker: Marker) -> Result<Position, SyncError> {
        loop {
            let tile = self.player.choose_tile(&self.board, marker).await?;
            match self.board.place(marker, tile) {
                Ok(()) => return Ok(tile),
                Err(e) => warn!(id = %self.id, ?tile, error = %e, "Player chose an occupied tile"),
            }
        }
    }

    /// Submits `tile`. `None` means the server's board disagreed with ours
    /// and the move must be chosen again.
    async fn commit(&mut self, tile: Position) -> Result<Option<MoveReceipt>, SyncError> {
        loop {
            match self.transport.commit_move(&self.id, tile).await {
                Ok(receipt) => return Ok(Some(receipt)),
                Err(e) if e.refusal() == Some("opponent_missing") => {
                    debug!(id = %self.id, "Waiting for an opponent before committing");
                    tokio::time::sleep(self.settings.marker_poll_interval).await;
                }
                Err(e) if e.refusal() == Some("cell_occupied") => {
                    warn!(id = %self.id, ?tile, "Server board already has that tile");
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn pull_board(&mut self) -> Result<(), SyncError> {
        let board = self.transport.board().await?;
        self.board.set_state(board.state());
        self.player.observe(&self.board);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> PlayerId {
        PlayerId::from(n)
    }

    #[test]
    fn test_winner_is_the_one_not_holding_the_turn() {
        let board: Board = "xxxoo####".parse().unwrap();
        assert_eq!(
            terminal_outcome(&board, &id(11), Some(&id(22))),
            Some(SessionOutcome::Won)
        );
        assert_eq!(
            terminal_outcome(&board, &id(22), Some(&id(22))),
            Some(SessionOutcome::Lost)
        );
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let board: Board = "xoxxoooxx".parse().unwrap();
        assert!(!board.check_win());
        assert_eq!(
            terminal_outcome(&board, &id(11), Some(&id(11))),
            Some(SessionOutcome::Draw)
        );
    }

    #[test]
    fn test_open_board_is_not_terminal() {
        let board: Board = "x###o####".parse().unwrap();
        assert_eq!(terminal_outcome(&board, &id(11), Some(&id(11))), None);
    }

    #[test]
    fn test_only_end_states_carry_an_outcome() {
        assert_eq!(SyncState::Rejected.outcome(), Some(SessionOutcome::Rejected));
        assert_eq!(
            SyncState::Terminal(SessionOutcome::Draw).outcome(),
            Some(SessionOutcome::Draw)
        );
        assert_eq!(SyncState::PollingTurn.outcome(), None);
        assert_eq!(SyncState::Rejoining(Slot::First).outcome(), None);
    }
}
