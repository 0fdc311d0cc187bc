//! How a syncing client reaches the authoritative state.

use crate::client::{ClientError, ClientErrorKind};
use crate::coordinator::{ConnectOutcome, CoordinatorError, MoveReceipt, PlayerId};
use crate::routes::ApiError;
use crate::service::GameService;
use noughts_board::{Board, Marker, Position};
use std::time::Duration;

/// Operations a client needs from the server.
///
/// [`RestClient`](crate::RestClient) speaks HTTP; [`LocalTransport`] calls a
/// [`GameService`] in the same process.
#[async_trait::async_trait]
pub trait GameTransport: Send + Sync {
    /// Registers or rejoins.
    async fn connect(&self, id: &PlayerId) -> Result<ConnectOutcome, ClientError>;

    /// Pushes the first player's marker choice.
    async fn set_marker(&self, id: &PlayerId, marker: Marker) -> Result<(), ClientError>;

    /// Pushes a whole board.
    async fn set_board(&self, id: &PlayerId, board: &Board) -> Result<(), ClientError>;

    /// Places `id`'s marker at `tile` and passes the turn, atomically.
    async fn commit_move(&self, id: &PlayerId, tile: Position)
    -> Result<MoveReceipt, ClientError>;

    /// Pulls the canonical board.
    async fn board(&self) -> Result<Board, ClientError>;

    /// Pulls the first player's marker.
    async fn first_marker(&self) -> Result<Option<Marker>, ClientError>;

    /// Pulls the second player's marker.
    async fn second_marker(&self) -> Result<Option<Marker>, ClientError>;

    /// Pulls the current turn holder.
    async fn current_turn(&self) -> Result<Option<PlayerId>, ClientError>;

    /// Waits up to `timeout` for `id` to hold the turn and returns the holder.
    async fn wait_for_turn(
        &self,
        id: &PlayerId,
        timeout: Duration,
    ) -> Result<Option<PlayerId>, ClientError>;
}

/// In-process transport over a shared [`GameService`].
#[derive(Debug, Clone, derive_new::new)]
pub struct LocalTransport {
    service: GameService,
}

impl From<ApiError> for ClientError {
    #[track_caller]
    fn from(err: ApiError) -> Self {
        ClientError::new(ClientErrorKind::Refused(err.body()))
    }
}

fn refused(err: CoordinatorError) -> ClientError {
    ApiError::Coordinator(err).into()
}

#[async_trait::async_trait]
impl GameTransport for LocalTransport {
    async fn connect(&self, id: &PlayerId) -> Result<ConnectOutcome, ClientError> {
        Ok(self.service.connect(id.clone()).await)
    }

    async fn set_marker(&self, id: &PlayerId, marker: Marker) -> Result<(), ClientError> {
        self.service.set_marker(id, marker).await.map_err(refused)
    }

    async fn set_board(&self, id: &PlayerId, board: &Board) -> Result<(), ClientError> {
        self.service
            .set_board(id, board.clone())
            .await
            .map_err(refused)
    }

    async fn commit_move(
        &self,
        id: &PlayerId,
        tile: Position,
    ) -> Result<MoveReceipt, ClientError> {
        self.service.commit_move(id, tile).await.map_err(refused)
    }

    async fn board(&self) -> Result<Board, ClientError> {
        Ok(self.service.board().await)
    }

    async fn first_marker(&self) -> Result<Option<Marker>, ClientError> {
        Ok(self.service.first_marker().await)
    }

    async fn second_marker(&self) -> Result<Option<Marker>, ClientError> {
        Ok(self.service.second_marker().await)
    }

    async fn current_turn(&self) -> Result<Option<PlayerId>, ClientError> {
        Ok(self.service.current_turn().await)
    }

    async fn wait_for_turn(
        &self,
        id: &PlayerId,
        timeout: Duration,
    ) -> Result<Option<PlayerId>, ClientError> {
        Ok(self.service.wait_for_turn(id, timeout).await)
    }
}
