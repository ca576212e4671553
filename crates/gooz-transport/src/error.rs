/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Dialing the server failed (refused, bad URL, failed upgrade).
    #[error("connect to {url} failed: {source}")]
    ConnectFailed {
        /// The endpoint that was dialed.
        url: String,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),
}
