//! Sources of marker and tile choices for a syncing client.

mod first_free;
mod scripted;
mod terminal;

pub use first_free::FirstFree;
pub use scripted::Scripted;
pub use terminal::TerminalPlayer;

use anyhow::Result;
use noughts_board::{Board, Marker, Position};

/// Anything that can decide what a client plays.
#[async_trait::async_trait]
pub trait Player: Send {
    /// Chooses the marker when this client registered first.
    async fn choose_marker(&mut self) -> Result<Marker>;

    /// Chooses an empty tile on `board` to place `marker` on.
    async fn choose_tile(&mut self, board: &Board, marker: Marker) -> Result<Position>;

    /// Returns the player's display name.
    fn name(&self) -> &str;

    /// Sees every board the client synchronizes to.
    fn observe(&mut self, _board: &Board) {}
}
