//! HTTP surface of the game server.

use crate::coordinator::{CoordinatorError, CoordinatorErrorKind, PlayerId};
use crate::protocol::{
    BOARD_PATH, CLEAR_PATH, CURRENT_TURN_PATH, ConnectResponse, ErrorBody, FIRST_MARKER_PATH,
    LAST_TILE_PATH, SECOND_MARKER_PATH, SET_DATA_PATH, STATUS_PATH, SetDataRequest, TurnQuery,
};
use crate::service::GameService;
use axum::body::{Body, Bytes};
use axum::extract::{Query, State};
use axum::http::{Request, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use derive_more::{Display, Error, From};
use noughts_board::{Board, BoardErrorKind, GameStatus, Marker, Position};
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceBuilder;
use tracing::{debug, info, instrument, warn};

/// Longest a single current-turn request may be held open.
pub const MAX_TURN_WAIT: Duration = Duration::from_secs(60);

/// Failure of a single HTTP request.
#[derive(Debug, Display, Error, From)]
pub enum ApiError {
    /// The body matched no known request shape.
    #[display("Bad request: {}", _0)]
    #[from(ignore)]
    BadRequest(#[error(not(source))] String),
    /// The coordinator refused the operation.
    #[display("{}", _0)]
    Coordinator(CoordinatorError),
}

impl ApiError {
    /// HTTP status and machine-readable kind.
    pub fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Coordinator(e) => match &e.kind {
                CoordinatorErrorKind::UnknownPlayer(_) => (StatusCode::FORBIDDEN, "unknown_player"),
                CoordinatorErrorKind::NotFirstPlayer(_) => {
                    (StatusCode::FORBIDDEN, "not_first_player")
                }
                CoordinatorErrorKind::NotInitialized => (StatusCode::CONFLICT, "not_initialized"),
                CoordinatorErrorKind::NotYourTurn { .. } => (StatusCode::CONFLICT, "not_your_turn"),
                CoordinatorErrorKind::OpponentMissing => (StatusCode::CONFLICT, "opponent_missing"),
                CoordinatorErrorKind::MarkerUnset => (StatusCode::CONFLICT, "marker_unset"),
                CoordinatorErrorKind::MarkerLocked(_) => (StatusCode::CONFLICT, "marker_locked"),
                CoordinatorErrorKind::BoardConflict(_) => (StatusCode::CONFLICT, "board_conflict"),
                CoordinatorErrorKind::GameOver(_) => (StatusCode::CONFLICT, "game_over"),
                CoordinatorErrorKind::Board(BoardErrorKind::CellOccupied(_)) => {
                    (StatusCode::CONFLICT, "cell_occupied")
                }
                CoordinatorErrorKind::Board(_) => (StatusCode::BAD_REQUEST, "invalid_board_input"),
            },
        }
    }

    /// The JSON body sent to the caller.
    pub fn body(&self) -> ErrorBody {
        let (_, kind) = self.status_and_kind();
        let message = match self {
            ApiError::BadRequest(message) => message.clone(),
            ApiError::Coordinator(e) => e.kind.to_string(),
        };
        ErrorBody {
            error: kind.to_string(),
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, _) = self.status_and_kind();
        let body = self.body();
        warn!(%status, kind = %body.error, message = %body.message, "Request refused");
        (status, Json(body)).into_response()
    }
}

/// Builds the router over `service`.
#[instrument(skip(service))]
pub fn router(service: GameService) -> Router {
    info!("Building game routes");
    Router::new()
        .route("/", get(homepage))
        .route(SET_DATA_PATH, post(set_data))
        .route(CLEAR_PATH, post(reset))
        .route(BOARD_PATH, get(board))
        .route(FIRST_MARKER_PATH, get(first_marker))
        .route(SECOND_MARKER_PATH, get(second_marker))
        .route(CURRENT_TURN_PATH, get(current_turn))
        .route(LAST_TILE_PATH, get(last_tile))
        .route(STATUS_PATH, get(status))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(service)
}

async fn homepage() -> Html<&'static str> {
    Html("<html><body>Tic-tac-toe</body></html>")
}

/// Unified write endpoint; the body's keys select the operation.
#[instrument(skip_all)]
async fn set_data(
    State(service): State<GameService>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("body is not JSON: {e}")))?;
    let request = SetDataRequest::from_value(value).map_err(ApiError::BadRequest)?;
    debug!(?request, "Decoded set-data request");

    let response = match request {
        SetDataRequest::Connect(req) => {
            let outcome = service.connect(req.id).await;
            json!(ConnectResponse::from(outcome))
        }
        SetDataRequest::SetMarker(req) => {
            service.set_marker(&req.id, req.marker).await?;
            json!({})
        }
        SetDataRequest::SetBoard(req) => {
            service.set_board(&req.id, req.current_board).await?;
            json!({})
        }
        SetDataRequest::SetTile(req) => {
            service.record_tile(req.tile_id).await?;
            json!({})
        }
        SetDataRequest::CommitMove(req) => {
            let receipt = service.commit_move(&req.id, req.commit_tile).await?;
            json!(receipt)
        }
    };
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip_all)]
async fn reset(State(service): State<GameService>) -> (StatusCode, Json<Value>) {
    service.reset().await;
    (StatusCode::CREATED, Json(json!({})))
}

async fn board(State(service): State<GameService>) -> Json<Board> {
    Json(service.board().await)
}

async fn first_marker(State(service): State<GameService>) -> Json<Option<Marker>> {
    Json(service.first_marker().await)
}

async fn second_marker(State(service): State<GameService>) -> Json<Option<Marker>> {
    Json(service.second_marker().await)
}

/// Current turn holder; long-polls when `wait_for` is given.
#[instrument(skip(service))]
async fn current_turn(
    State(service): State<GameService>,
    Query(query): Query<TurnQuery>,
) -> Json<Option<PlayerId>> {
    let turn = match query.wait_for {
        Some(id) => {
            let timeout = query
                .timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(MAX_TURN_WAIT)
                .min(MAX_TURN_WAIT);
            service.wait_for_turn(&PlayerId::new(id), timeout).await
        }
        None => service.current_turn().await,
    };
    Json(turn)
}

async fn last_tile(State(service): State<GameService>) -> Json<Option<Position>> {
    Json(service.last_tile().await)
}

async fn status(State(service): State<GameService>) -> Json<GameStatus> {
    Json(service.status().await)
}
