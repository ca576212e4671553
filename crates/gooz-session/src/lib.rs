//! Session persistence for the Gooz client.
//!
//! A client that restarts mid-game should land back in the same game. The
//! only thing that needs to survive a restart is the game id, so this crate
//! keeps exactly one key (`gameId`) behind the [`SessionStore`] trait:
//!
//! - [`MemoryStore`] keeps it in memory (tests, throwaway clients).
//! - [`FileStore`] writes it to a small JSON file.
//!
//! # How it fits in the stack
//!
//! ```text
//! Client shell (above)  ← restores the game id on start, saves on change
//!     ↕
//! Session Layer (this crate)  ← loads / saves / clears the game id
//!     ↕
//! Protocol Layer (below)  ← provides GameId
//! ```

mod error;
mod store;

pub use error::SessionError;
pub use store::{FileStore, MemoryStore, SessionStore};
