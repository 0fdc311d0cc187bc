//! Player that replays a fixed list of tiles.

use super::Player;
use anyhow::Result;
use noughts_board::{Board, Marker, Position};
use std::collections::VecDeque;
use tracing::debug;

/// Plays the given tiles in order, skipping any already taken.
#[derive(Debug, Clone)]
pub struct Scripted {
    name: String,
    marker: Marker,
    tiles: VecDeque<Position>,
    seen: Vec<Board>,
}

impl Scripted {
    /// Creates a scripted player.
    pub fn new(
        name: impl Into<String>,
        marker: Marker,
        tiles: impl IntoIterator<Item = Position>,
    ) -> Self {
        Self {
            name: name.into(),
            marker,
            tiles: tiles.into_iter().collect(),
            seen: Vec::new(),
        }
    }

    /// Boards observed so far, oldest first.
    pub fn seen(&self) -> &[Board] {
        &self.seen
    }
}

#[async_trait::async_trait]
impl Player for Scripted {
    async fn choose_marker(&mut self) -> Result<Marker> {
        Ok(self.marker)
    }

    async fn choose_tile(&mut self, board: &Board, _marker: Marker) -> Result<Position> {
        while let Some(tile) = self.tiles.pop_front() {
            if board.is_empty(tile) {
                debug!(player = %self.name, ?tile, "Scripted tile");
                return Ok(tile);
            }
            debug!(player = %self.name, ?tile, "Scripted tile already taken, skipping");
        }
        anyhow::bail!("{} ran out of scripted tiles", self.name)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn observe(&mut self, board: &Board) {
        self.seen.push(board.clone());
    }
}
