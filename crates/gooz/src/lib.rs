//! # Gooz
//!
//! Reconnecting client core for the Gooz board game.
//!
//! The server decides everything; this crate keeps a faithful local copy
//! of what it reported and sends the player's intentions back. It provides:
//!
//! - [`ConnectionAdapter`] — one WebSocket link that redials on its own
//! - [`GoozClient`] — adapter + reducer task + session store, with state
//!   published on a `watch` channel
//! - [`actions`] — outbound messages guarded by local preconditions
//! - [`telemetry`] — `tracing` subscriber setup for binaries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gooz::prelude::*;
//!
//! # async fn run() -> Result<(), GoozError> {
//! let client = GoozClient::builder()
//!     .url("ws://localhost:8080")
//!     .player_id("0xabc")
//!     .build()
//!     .await?;
//!
//! client.connect();
//! let mut states = client.subscribe();
//! while states.changed().await.is_ok() {
//!     let state = states.borrow_and_update().clone();
//!     if state.is_my_turn() {
//!         client.roll_dice()?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod actions;
mod adapter;
mod client;
mod config;
mod error;
pub mod telemetry;

pub use actions::{ActionError, PlayerProfile};
pub use adapter::{ConnectionAdapter, LinkStatus};
pub use client::{GoozClient, GoozClientBuilder};
pub use config::{ClientConfig, DEFAULT_SHUTDOWN_TIMEOUT, DEFAULT_URL};
pub use error::GoozError;

/// Re-exports for the common case.
pub mod prelude {
    pub use crate::actions::{ActionError, PlayerProfile};
    pub use crate::{ClientConfig, GoozClient, GoozClientBuilder, GoozError, LinkStatus};

    pub use gooz_protocol::{ClientMessage, GameId, JailChoice, Player, PlayerId, ServerMessage};
    pub use gooz_reconnect::{ReconnectConfig, ReconnectPolicy};
    pub use gooz_session::{FileStore, MemoryStore, SessionStore};
    pub use gooz_state::{
        ErrorPolicy, GameState, LocalEvent, PendingAction, board_position,
    };
}
