//! Noughts server library - turn-arbitrated tic-tac-toe over HTTP
//!
//! One server process holds the canonical game; two client processes keep
//! local boards in step with it.
//!
//! # Architecture
//!
//! - **Coordinator**: session registry, marker negotiation and turn pointer
//! - **Service**: lock-guarded coordinator shared by all request handlers
//! - **Routes**: the axum router exposing `/api/setdata` and `/api/getdata/*`
//! - **Client**: typed REST client for those endpoints
//! - **Sync**: per-client state machine from connection to game over
//!
//! # Example
//!
//! ```no_run
//! use noughts_server::{GameService, LocalTransport, PlayerId, SyncSession, SyncSettings};
//! use noughts_server::players::FirstFree;
//! use noughts_board::Marker;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let service = GameService::new();
//! let mut session = SyncSession::new(
//!     PlayerId::from(11),
//!     LocalTransport::new(service.clone()),
//!     FirstFree::new("alice", Marker::X),
//!     SyncSettings::default(),
//! );
//! let outcome = session.run().await?;
//! println!("{outcome}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod client;
mod config;
mod coordinator;
mod routes;
mod service;
mod sync;
mod transport;

// Public modules
pub mod players;
pub mod protocol;

// Crate-level exports - Coordinator
pub use coordinator::{
    ConnectOutcome, CoordinatorError, CoordinatorErrorKind, MoveReceipt, PlayerId, Slot,
    TurnCoordinator,
};

// Crate-level exports - Shared service and HTTP surface
pub use routes::{ApiError, MAX_TURN_WAIT, router};
pub use service::GameService;

// Crate-level exports - Client side
pub use client::{ClientError, ClientErrorKind, RestClient};
pub use sync::{
    SessionOutcome, SyncError, SyncErrorKind, SyncSession, SyncSettings, SyncState,
    terminal_outcome,
};
pub use transport::{GameTransport, LocalTransport};

// Crate-level exports - Configuration
pub use config::{ConfigError, DEFAULT_CONFIG_PATH, Settings};
