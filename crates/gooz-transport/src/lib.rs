//! Client transport abstraction for Gooz.
//!
//! Provides the [`Connector`] and [`Connection`] traits. A connector dials
//! the game server and yields a connection; a connection moves text frames
//! in both directions until either side closes it.
//!
//! The traits return `Send` futures so a supervisor task can own a
//! connector generically and still be `tokio::spawn`ed.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket client via `tokio-tungstenite`

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketConnector};

use std::fmt;
use std::future::Future;

/// Opaque identifier for one dialed connection.
///
/// Every successful dial gets a fresh id, so log lines from before and
/// after a reconnect can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Opens connections to one configured endpoint.
pub trait Connector: Send + Sync + 'static {
    /// The connection type produced by this connector.
    type Connection: Connection;

    /// Dials the endpoint and completes the protocol upgrade.
    fn connect(
        &self,
    ) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;

    /// The endpoint this connector dials, for logging.
    fn endpoint(&self) -> &str;
}

/// A single open connection that carries text frames.
pub trait Connection: Send + Sync + 'static {
    /// Sends one frame to the server.
    fn send(
        &self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next frame from the server.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>> + Send;

    /// Closes the connection.
    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
