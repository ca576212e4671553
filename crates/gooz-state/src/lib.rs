//! Client-side game state for Gooz.
//!
//! The server owns every rule. This crate only keeps a local cache of what
//! the server reported, plus a few UI-only slots, and changes it in exactly
//! one place: [`Reducer::reduce`].
//!
//! # Key types
//!
//! - [`GameState`] — the state bag observers render
//! - [`Reducer`] — pure `(state, event) -> state` transition
//! - [`Event`] — a server message or a [`LocalEvent`] from the UI
//! - [`ErrorPolicy`] — whether server errors reach the state
//! - [`board_position`] — server position → rendered board cell

mod board;
mod reducer;
mod state;

pub use board::{BOARD_CELLS, SERVER_POSITIONS, board_position};
pub use reducer::{ErrorPolicy, Event, LocalEvent, Reducer};
pub use state::{
    ChatEntry, GameState, JailNotice, LiquidationPrompt, PendingAction, RentNotice,
};
