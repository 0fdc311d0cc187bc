//! HTTP client for the game server.

use crate::coordinator::{ConnectOutcome, MoveReceipt, PlayerId};
use crate::protocol::{
    BOARD_PATH, BoardRequest, CLEAR_PATH, CURRENT_TURN_PATH, CommitRequest, ConnectRequest,
    ConnectResponse, ErrorBody, FIRST_MARKER_PATH, LAST_TILE_PATH, MarkerRequest,
    SECOND_MARKER_PATH, SET_DATA_PATH, STATUS_PATH, TileRequest,
};
use crate::transport::GameTransport;
use derive_more::{Display, Error};
use noughts_board::{Board, GameStatus, Marker, Position};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// What went wrong talking to the server.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ClientErrorKind {
    /// The request never produced a response.
    #[display("HTTP request failed: {}", _0)]
    Http(String),
    /// The server answered with an error body.
    #[display("server refused request ({}): {}", _0.error, _0.message)]
    Refused(ErrorBody),
    /// The server URL could not be parsed.
    #[display("invalid server URL: {}", _0)]
    InvalidUrl(String),
    /// The response did not have the expected shape.
    #[display("unexpected response: {}", _0)]
    UnexpectedResponse(String),
}

/// Client error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Client error: {} at {}:{}", kind, file, line)]
pub struct ClientError {
    /// Error kind.
    pub kind: ClientErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ClientError {
    /// Creates a new client error with caller location tracking.
    #[track_caller]
    pub fn new(kind: ClientErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// The server's error kind, when the server refused the request.
    pub fn refusal(&self) -> Option<&str> {
        match &self.kind {
            ClientErrorKind::Refused(body) => Some(body.error.as_str()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::new(ClientErrorKind::Http(err.to_string()))
    }
}

/// Typed client for the REST endpoints.
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: String,
    client: reqwest::Client,
}

impl RestClient {
    /// Creates a client for the server at `base_url` (e.g. `http://127.0.0.1:5000`).
    #[instrument(skip_all, fields(base_url = %base_url.as_ref()))]
    pub fn new(base_url: impl AsRef<str>) -> Self {
        let base_url = base_url.as_ref().trim_end_matches('/').to_string();
        info!("Creating REST client");
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_data<B, T>(&self, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(SET_DATA_PATH))
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        let text = response.text().await?;
        debug!(%status, body = %text, "Got response");

        if !status.is_success() {
            return Err(match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => ClientError::new(ClientErrorKind::Refused(body)),
                Err(_) => {
                    error!(%status, body = %text, "Error response without error body");
                    ClientError::new(ClientErrorKind::UnexpectedResponse(format!(
                        "HTTP {status}: {text}"
                    )))
                }
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, body = %text, "Failed to parse response");
            ClientError::new(ClientErrorKind::UnexpectedResponse(e.to_string()))
        })
    }

    /// Pushes a tile selection, which flips the turn without touching the board.
    #[instrument(skip(self))]
    pub async fn set_tile(&self, id: &PlayerId, tile: Position) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .post_data(&TileRequest {
                tile_id: tile,
                id: id.clone(),
            })
            .await?;
        Ok(())
    }

    /// Most recently recorded tile.
    pub async fn last_tile(&self) -> Result<Option<Position>, ClientError> {
        self.get_data(LAST_TILE_PATH).await
    }

    /// Status of the canonical board.
    pub async fn status(&self) -> Result<GameStatus, ClientError> {
        self.get_data(STATUS_PATH).await
    }

    /// Clears all server state.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<(), ClientError> {
        info!("Resetting server");
        let response = self.client.post(self.url(CLEAR_PATH)).send().await?;
        let _: serde_json::Value = Self::decode(response).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl GameTransport for RestClient {
    #[instrument(skip(self))]
    async fn connect(&self, id: &PlayerId) -> Result<ConnectOutcome, ClientError> {
        let response: ConnectResponse = self
            .post_data(&ConnectRequest {
                i_am_here: true,
                id: id.clone(),
            })
            .await?;
        info!(prompt = %response.prompt, number = response.number, "Connected");
        ConnectOutcome::from_code(response.number).ok_or_else(|| {
            ClientError::new(ClientErrorKind::UnexpectedResponse(format!(
                "unknown slot code {}",
                response.number
            )))
        })
    }

    #[instrument(skip(self))]
    async fn set_marker(&self, id: &PlayerId, marker: Marker) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .post_data(&MarkerRequest {
                marker,
                id: id.clone(),
            })
            .await?;
        Ok(())
    }

    #[instrument(skip(self, board))]
    async fn set_board(&self, id: &PlayerId, board: &Board) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .post_data(&BoardRequest {
                current_board: board.clone(),
                id: id.clone(),
            })
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn commit_move(
        &self,
        id: &PlayerId,
        tile: Position,
    ) -> Result<MoveReceipt, ClientError> {
        self.post_data(&CommitRequest {
            commit_tile: tile,
            id: id.clone(),
        })
        .await
    }

    async fn board(&self) -> Result<Board, ClientError> {
        self.get_data(BOARD_PATH).await
    }

    async fn first_marker(&self) -> Result<Option<Marker>, ClientError> {
        self.get_data(FIRST_MARKER_PATH).await
    }

    async fn second_marker(&self) -> Result<Option<Marker>, ClientError> {
        self.get_data(SECOND_MARKER_PATH).await
    }

    async fn current_turn(&self) -> Result<Option<PlayerId>, ClientError> {
        self.get_data(CURRENT_TURN_PATH).await
    }

    #[instrument(skip(self))]
    async fn wait_for_turn(
        &self,
        id: &PlayerId,
        timeout: Duration,
    ) -> Result<Option<PlayerId>, ClientError> {
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let mut url = reqwest::Url::parse(&self.url(CURRENT_TURN_PATH))
            .map_err(|e| ClientError::new(ClientErrorKind::InvalidUrl(e.to_string())))?;
        url.query_pairs_mut()
            .append_pair("wait_for", id.as_str())
            .append_pair("timeout_ms", &timeout_ms.to_string());
        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }
}
