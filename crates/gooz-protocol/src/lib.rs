//! Wire protocol for the Gooz game server.
//!
//! This crate defines the "language" the client and the server speak:
//!
//! - **Types** ([`PlayerId`], [`GameId`], [`Player`], [`PropertyOffer`],
//!   [`JailChoice`]) — payload pieces shared by both directions.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]) — one enum per
//!   direction, each tagged by a `type` string on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how messages become
//!   text frames and back.
//! - **Errors** ([`ProtocolError`]) — what can go wrong doing so.
//!
//! # Architecture
//!
//! ```text
//! Transport (frames) → Protocol (ServerMessage) → State (reducer)
//! ```

mod codec;
mod error;
mod inbound;
mod outbound;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use inbound::{ServerMessage, Tag};
pub use outbound::ClientMessage;
pub use types::{GameId, JailChoice, Player, PlayerId, PropertyOffer};
