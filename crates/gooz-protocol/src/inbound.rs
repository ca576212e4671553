//! Messages the game server sends to the client.

use serde::{Deserialize, Serialize};

use crate::{GameId, Player, PlayerId, PropertyOffer};

/// Server → client messages.
///
/// Same tagging scheme as [`ClientMessage`](crate::ClientMessage):
/// internally tagged on `type`, SCREAMING_SNAKE_CASE tags, camelCase fields.
///
/// A `type` this client does not know decodes to
/// [`ServerMessage::Unrecognized`] instead of failing, so newer servers can
/// add events without breaking older clients. A *known* `type` with missing
/// or mistyped fields is still a decode error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// A new game exists; `player` is its creator.
    GameCreated { game_id: GameId, player: Player },

    /// Someone joined; `players` is the full roster.
    PlayerJoined { players: Vec<Player> },

    /// Someone left; `players` is the full roster.
    PlayerLeft { players: Vec<Player> },

    /// Play begins with `current_player_id` to move.
    GameStarted {
        current_player_id: PlayerId,
        players: Vec<Player>,
    },

    /// A player rolled and moved to `position`.
    DiceRolled {
        player_id: PlayerId,
        dice: u8,
        position: u32,
    },

    /// The local player landed on an unowned property and must decide.
    BuyOrPassRequired {
        property: PropertyOffer,
        #[serde(default)]
        player_id: Option<PlayerId>,
    },

    /// The offer was accepted.
    PropertyBought {
        player_id: PlayerId,
        #[serde(default)]
        player: Option<Player>,
    },

    /// The offer was declined.
    PropertyPassed {
        player_id: PlayerId,
        #[serde(default)]
        player: Option<Player>,
    },

    /// A player sold a property back to the bank.
    PropertySold {
        player_id: PlayerId,
        #[serde(default)]
        block_name: Option<String>,
        #[serde(default)]
        player: Option<Player>,
    },

    /// Rent moved from `payer` to `owner`.
    RentPaid {
        payer: Player,
        owner: Player,
        amount: u64,
        property_name: String,
    },

    /// The local player owes more rent than they hold.
    InsufficientFunds {
        rent_amount: u64,
        current_money: i64,
        #[serde(default)]
        owned_properties: Vec<String>,
    },

    /// The local player is in jail and must pay or roll.
    JailChoiceRequired {
        #[serde(default)]
        player_id: Option<PlayerId>,
    },

    /// Outcome of a roll-for-jail attempt.
    JailRollResult {
        #[serde(default)]
        player_id: Option<PlayerId>,
        dice: u8,
        escaped: bool,
    },

    /// The turn passed to `current_player_id`.
    NextTurn {
        current_player_id: PlayerId,
        players: Vec<Player>,
    },

    /// A chat line. `timestamp` is milliseconds since the Unix epoch.
    #[serde(rename = "MESSAGE")]
    Chat {
        player_id: PlayerId,
        player_name: String,
        message: String,
        #[serde(default)]
        timestamp: u64,
    },

    /// The server rejected something.
    Error { message: String },

    /// Any `type` this client does not know.
    #[serde(other)]
    Unrecognized,
}

impl ServerMessage {
    /// The wire discriminator of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GameCreated { .. } => "GAME_CREATED",
            Self::PlayerJoined { .. } => "PLAYER_JOINED",
            Self::PlayerLeft { .. } => "PLAYER_LEFT",
            Self::GameStarted { .. } => "GAME_STARTED",
            Self::DiceRolled { .. } => "DICE_ROLLED",
            Self::BuyOrPassRequired { .. } => "BUY_OR_PASS_REQUIRED",
            Self::PropertyBought { .. } => "PROPERTY_BOUGHT",
            Self::PropertyPassed { .. } => "PROPERTY_PASSED",
            Self::PropertySold { .. } => "PROPERTY_SOLD",
            Self::RentPaid { .. } => "RENT_PAID",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::JailChoiceRequired { .. } => "JAIL_CHOICE_REQUIRED",
            Self::JailRollResult { .. } => "JAIL_ROLL_RESULT",
            Self::NextTurn { .. } => "NEXT_TURN",
            Self::Chat { .. } => "MESSAGE",
            Self::Error { .. } => "ERROR",
            Self::Unrecognized => "UNRECOGNIZED",
        }
    }
}

/// Just the discriminator of a frame.
///
/// Used to name the `type` of a frame that decoded to
/// [`ServerMessage::Unrecognized`], since that variant drops it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tag {
    /// The raw `type` string.
    #[serde(rename = "type")]
    pub kind: String,
}
