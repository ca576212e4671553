//! Error types for the protocol layer.

/// Errors that can occur in the protocol layer.
///
/// A `ProtocolError` always means the bytes were the problem: they could
/// not be produced, or what arrived does not match any message shape this
/// client understands.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, a missing `type` field, or a known
    /// `type` whose fields have the wrong shape.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
