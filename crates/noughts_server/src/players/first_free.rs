//! Automatic player that takes the first free tile.

use super::Player;
use anyhow::Result;
use noughts_board::{Board, Marker, Position};
use tracing::debug;

/// Picks the first empty tile in row-major order.
#[derive(Debug, Clone)]
pub struct FirstFree {
    name: String,
    marker: Marker,
}

impl FirstFree {
    /// Creates a player that chooses `marker` when it registers first.
    pub fn new(name: impl Into<String>, marker: Marker) -> Self {
        Self {
            name: name.into(),
            marker,
        }
    }
}

#[async_trait::async_trait]
impl Player for FirstFree {
    async fn choose_marker(&mut self) -> Result<Marker> {
        Ok(self.marker)
    }

    async fn choose_tile(&mut self, board: &Board, _marker: Marker) -> Result<Position> {
        let tile = board
            .empty_cells()
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("No valid moves available"))?;
        debug!(player = %self.name, ?tile, "Chose tile");
        Ok(tile)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
