//! Payload types shared by inbound and outbound messages.
//!
//! Everything here travels "on the wire" as JSON. Field names follow the
//! game server's camelCase convention, so every struct carries
//! `#[serde(rename_all = "camelCase")]`.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// An opaque player identifier.
///
/// The server (or a connected wallet) hands these out; the client never
/// inspects them. The newtype keeps a player id from being passed where a
/// game id is expected, even though both are strings underneath.
///
/// `#[serde(transparent)]` serializes `PlayerId("0xabc")` as plain
/// `"0xabc"`, which is what the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Borrows the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// An opaque game (room) identifier, such as `"00BF80D3"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub String);

impl GameId {
    /// Borrows the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for GameId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Player and property payloads
// ---------------------------------------------------------------------------

/// One player's server-reported snapshot.
///
/// Snapshots are replaced wholesale whenever the server sends a fresh one.
/// `ownedProperties` is optional on the wire and defaults to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Player identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Color tag used to draw the player's token (e.g. `"#FF0000"`).
    pub color_code: String,
    /// Board position in the server's enumeration.
    #[serde(default)]
    pub position: u32,
    /// Currency balance. Negative once a player is bankrupt.
    #[serde(default)]
    pub pool_amt: i64,
    /// Names of the properties this player owns.
    #[serde(default)]
    pub owned_properties: Vec<String>,
}

/// The property offered in a buy-or-pass decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyOffer {
    /// Display name of the property.
    pub name: String,
    /// Purchase price.
    pub price: u64,
    /// Rent charged to other players, when the server reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent: Option<u64>,
    /// Board position of the property, when the server reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

/// How a jailed player wants to get out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JailChoice {
    /// Pay the fine and leave immediately.
    Pay,
    /// Roll the dice and hope for an escape.
    Roll,
}

impl fmt::Display for JailChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pay => f.write_str("pay"),
            Self::Roll => f.write_str("roll"),
        }
    }
}
