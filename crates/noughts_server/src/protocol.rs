//! JSON bodies exchanged between clients and the server.

use crate::coordinator::{ConnectOutcome, PlayerId};
use noughts_board::{Board, Marker, Position};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Path of the unified write endpoint.
pub const SET_DATA_PATH: &str = "/api/setdata";
/// Path of the reset endpoint.
pub const CLEAR_PATH: &str = "/api/clear";
/// Canonical board.
pub const BOARD_PATH: &str = "/api/getdata/board";
/// First player's marker.
pub const FIRST_MARKER_PATH: &str = "/api/getdata/stplayer_mark";
/// Second player's marker.
pub const SECOND_MARKER_PATH: &str = "/api/getdata/ndplayer_mark";
/// Current turn holder.
pub const CURRENT_TURN_PATH: &str = "/api/getdata/current_player";
/// Last recorded tile.
pub const LAST_TILE_PATH: &str = "/api/getdata/tile_id";
/// Board status.
pub const STATUS_PATH: &str = "/api/getdata/status";

/// `{i_am_here: true, id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectRequest {
    /// Presence flag; only its key matters for dispatch.
    pub i_am_here: bool,
    /// Caller.
    pub id: PlayerId,
}

/// `{marker, id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRequest {
    /// Chosen marker.
    pub marker: Marker,
    /// Caller.
    pub id: PlayerId,
}

/// `{current_board, id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardRequest {
    /// Full board pushed by the caller.
    pub current_board: Board,
    /// Caller.
    pub id: PlayerId,
}

/// `{tile_id, id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRequest {
    /// Selected tile (0-8).
    pub tile_id: Position,
    /// Caller.
    pub id: PlayerId,
}

/// `{commit_tile, id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRequest {
    /// Tile to place the caller's marker on.
    pub commit_tile: Position,
    /// Caller.
    pub id: PlayerId,
}

/// A decoded `/api/setdata` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDataRequest {
    /// Register or rejoin.
    Connect(ConnectRequest),
    /// First player's marker choice.
    SetMarker(MarkerRequest),
    /// Wholesale board push.
    SetBoard(BoardRequest),
    /// Tile selection that flips the turn.
    SetTile(TileRequest),
    /// Atomic place-and-flip.
    CommitMove(CommitRequest),
}

impl SetDataRequest {
    /// Dispatches on the first discriminating key present, in the order
    /// `i_am_here`, `marker`, `current_board`, `tile_id`, `commit_tile`.
    ///
    /// # Errors
    ///
    /// A message describing why the body is not a known request.
    pub fn from_value(value: Value) -> Result<Self, String> {
        let Value::Object(map) = value else {
            return Err("request body must be a JSON object".to_string());
        };

        if map.contains_key("i_am_here") {
            decode(map).map(SetDataRequest::Connect)
        } else if map.contains_key("marker") {
            decode(map).map(SetDataRequest::SetMarker)
        } else if map.contains_key("current_board") {
            decode(map).map(SetDataRequest::SetBoard)
        } else if map.contains_key("tile_id") {
            decode(map).map(SetDataRequest::SetTile)
        } else if map.contains_key("commit_tile") {
            decode(map).map(SetDataRequest::CommitMove)
        } else {
            debug!(keys = ?map.keys().collect::<Vec<_>>(), "No known discriminator");
            Err(
                "expected one of i_am_here, marker, current_board, tile_id, commit_tile"
                    .to_string(),
            )
        }
    }
}

fn decode<T: DeserializeOwned>(map: Map<String, Value>) -> Result<T, String> {
    serde_json::from_value(Value::Object(map)).map_err(|e| e.to_string())
}

/// Answer to a connection attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectResponse {
    /// Human-readable message.
    pub prompt: String,
    /// Slot code, see [`ConnectOutcome::code`].
    pub number: i8,
}

impl From<ConnectOutcome> for ConnectResponse {
    fn from(outcome: ConnectOutcome) -> Self {
        Self {
            prompt: outcome.prompt().to_string(),
            number: outcome.code(),
        }
    }
}

/// Query for the current-turn endpoint.
///
/// With `wait_for` set the server holds the request until that player
/// holds the turn or `timeout_ms` elapses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnQuery {
    /// Identifier to wait for.
    pub wait_for: Option<String>,
    /// Upper bound on the wait.
    pub timeout_ms: Option<u64>,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable kind, e.g. `not_your_turn`.
    pub error: String,
    /// Human-readable explanation.
    pub message: String,
}
