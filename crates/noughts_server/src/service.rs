//! Shared, serialized access to the coordinator.

use crate::coordinator::{
    ConnectOutcome, CoordinatorError, MoveReceipt, PlayerId, TurnCoordinator,
};
use noughts_board::{Board, GameStatus, Marker, Position};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tracing::{debug, instrument};

#[derive(Debug)]
struct Shared {
    coordinator: Mutex<TurnCoordinator>,
    turns: watch::Sender<Option<PlayerId>>,
}

/// Process-wide game state shared by every request handler.
///
/// Each operation takes the coordinator lock for its whole
/// read-modify-write, so two clients can never interleave inside a
/// registration, marker choice, move or reset. Turn changes are published
/// on a watch channel so waiting clients wake without polling.
#[derive(Debug, Clone)]
pub struct GameService {
    shared: Arc<Shared>,
}

impl GameService {
    /// Creates a service around a fresh coordinator.
    #[instrument]
    pub fn new() -> Self {
        debug!("Creating game service");
        let (turns, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                coordinator: Mutex::new(TurnCoordinator::new()),
                turns,
            }),
        }
    }

    /// Runs `f` under the lock and republishes the turn pointer.
    async fn mutate<T>(&self, f: impl FnOnce(&mut TurnCoordinator) -> T) -> T {
        let mut coordinator = self.shared.coordinator.lock().await;
        let result = f(&mut *coordinator);
        let turn = coordinator.current_turn().cloned();
        self.shared.turns.send_if_modified(|current| {
            if *current == turn {
                false
            } else {
                *current = turn;
                true
            }
        });
        result
    }

    async fn read<T>(&self, f: impl FnOnce(&TurnCoordinator) -> T) -> T {
        let coordinator = self.shared.coordinator.lock().await;
        f(&*coordinator)
    }

    /// See [`TurnCoordinator::connect`].
    pub async fn connect(&self, id: PlayerId) -> ConnectOutcome {
        self.mutate(|c| c.connect(id)).await
    }

    /// See [`TurnCoordinator::set_marker`].
    pub async fn set_marker(&self, id: &PlayerId, marker: Marker) -> Result<(), CoordinatorError> {
        self.mutate(|c| c.set_marker(id, marker)).await
    }

    /// See [`TurnCoordinator::set_board`].
    pub async fn set_board(&self, id: &PlayerId, board: Board) -> Result<(), CoordinatorError> {
        self.mutate(|c| c.set_board(id, board)).await
    }

    /// See [`TurnCoordinator::record_tile`].
    pub async fn record_tile(&self, tile: Position) -> Result<PlayerId, CoordinatorError> {
        self.mutate(|c| c.record_tile(tile)).await
    }

    /// See [`TurnCoordinator::commit_move`].
    pub async fn commit_move(
        &self,
        id: &PlayerId,
        tile: Position,
    ) -> Result<MoveReceipt, CoordinatorError> {
        self.mutate(|c| c.commit_move(id, tile)).await
    }

    /// See [`TurnCoordinator::reset`].
    pub async fn reset(&self) {
        self.mutate(TurnCoordinator::reset).await
    }

    /// Copy of the canonical board.
    pub async fn board(&self) -> Board {
        self.read(|c| c.board().clone()).await
    }

    /// First player's marker, if chosen.
    pub async fn first_marker(&self) -> Option<Marker> {
        self.read(TurnCoordinator::first_marker).await
    }

    /// Second player's marker, if the first has chosen.
    pub async fn second_marker(&self) -> Option<Marker> {
        self.read(TurnCoordinator::second_marker).await
    }

    /// Identifier allowed to move.
    pub async fn current_turn(&self) -> Option<PlayerId> {
        self.read(|c| c.current_turn().cloned()).await
    }

    /// Most recently recorded tile.
    pub async fn last_tile(&self) -> Option<Position> {
        self.read(TurnCoordinator::last_tile).await
    }

    /// Status of the canonical board.
    pub async fn status(&self) -> GameStatus {
        self.read(TurnCoordinator::status).await
    }

    /// Waits until `id` holds the turn or `timeout` elapses.
    ///
    /// Returns the turn holder at the moment of return, which equals `id`
    /// unless the wait timed out.
    #[instrument(skip(self))]
    pub async fn wait_for_turn(&self, id: &PlayerId, timeout: Duration) -> Option<PlayerId> {
        let mut turns = self.shared.turns.subscribe();
        let matched = tokio::time::timeout(timeout, async {
            turns
                .wait_for(|turn| turn.as_ref() == Some(id))
                .await
                .ok()
                .and_then(|turn| (*turn).clone())
        })
        .await;

        match matched {
            Ok(Some(turn)) => Some(turn),
            _ => {
                debug!(%id, "Turn wait elapsed without a match");
                self.current_turn().await
            }
        }
    }
}

impl Default for GameService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ready_service() -> GameService {
        let service = GameService::new();
        service.connect(PlayerId::from(11)).await;
        service.connect(PlayerId::from(22)).await;
        service
            .set_marker(&PlayerId::from(11), Marker::X)
            .await
            .unwrap();
        service
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_turn_matches() {
        let service = ready_service().await;
        let turn = service
            .wait_for_turn(&PlayerId::from(11), Duration::from_secs(5))
            .await;
        assert_eq!(turn, Some(PlayerId::from(11)));
    }

    #[tokio::test]
    async fn test_wait_times_out_with_current_holder() {
        let service = ready_service().await;
        let turn = service
            .wait_for_turn(&PlayerId::from(22), Duration::from_millis(20))
            .await;
        assert_eq!(turn, Some(PlayerId::from(11)));
    }

    #[tokio::test]
    async fn test_wait_wakes_on_committed_move() {
        let service = ready_service().await;
        let waiter = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .wait_for_turn(&PlayerId::from(22), Duration::from_secs(10))
                    .await
            })
        };
        tokio::task::yield_now().await;

        service
            .commit_move(&PlayerId::from(11), Position::Center)
            .await
            .unwrap();
        assert_eq!(waiter.await.unwrap(), Some(PlayerId::from(22)));
    }

    #[tokio::test]
    async fn test_concurrent_connects_fill_exactly_two_slots() {
        let service = GameService::new();
        let handles: Vec<_> = (1..=8u64)
            .map(|n| {
                let service = service.clone();
                tokio::spawn(async move { service.connect(PlayerId::from(n)).await })
            })
            .collect();

        let mut codes = Vec::new();
        for handle in handles {
            codes.push(handle.await.unwrap().code());
        }
        codes.sort();
        assert_eq!(codes, vec![-1, -1, -1, -1, -1, -1, 1, 2]);
    }
}
