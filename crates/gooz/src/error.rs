//! Unified error type for the Gooz client.

use gooz_protocol::ProtocolError;
use gooz_session::SessionError;
use gooz_transport::TransportError;

use crate::ActionError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `gooz` crate, you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum GoozError {
    /// A transport-level error (dial, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-store error (read, write, corrupt file).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// An action was refused before anything was sent.
    #[error(transparent)]
    Action(#[from] ActionError),
}
