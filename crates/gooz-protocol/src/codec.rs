//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The game server speaks JSON text frames, so [`JsonCodec`] is the only
//! implementation today. The client shell is generic over [`Codec`], which
//! keeps tests free to swap in a codec that fails on purpose.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → the codec is shared between the client handle and
///   the background connection task.
/// - `'static` → it owns everything it needs, so it can live inside a
///   spawned task.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the result doesn't
/// borrow from the input bytes, so the receive buffer can be dropped
/// right after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use gooz_protocol::{ClientMessage, Codec, GameId, JsonCodec, PlayerId};
///
/// let codec = JsonCodec;
/// let msg = ClientMessage::RollDice {
///     game_id: GameId::from("00BF80D3"),
///     player_id: PlayerId::from("0xabc"),
/// };
///
/// let bytes = codec.encode(&msg).unwrap();
/// let text = String::from_utf8(bytes).unwrap();
/// assert!(text.contains(r#""type":"ROLL_DICE""#));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
