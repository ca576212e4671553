//! Messages the client sends to the game server.

use serde::{Deserialize, Serialize};

use crate::{GameId, JailChoice, PlayerId};

/// Client → server messages.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON with the
/// discriminator inline:
///   `{ "type": "ROLL_DICE", "gameId": "00BF80D3", "playerId": "0xabc" }`
///
/// Variant tags are SCREAMING_SNAKE_CASE and fields are camelCase, which
/// is what the server expects. Every in-game message carries the game id
/// and the acting player's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    /// Open a new game with the sender as its first player.
    CreateGame {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<PlayerId>,
        player_name: String,
        color_code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stake_amount: Option<u64>,
    },

    /// Join an existing game by id.
    JoinGame {
        game_id: GameId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<PlayerId>,
        player_name: String,
        color_code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stake_amount: Option<u64>,
    },

    /// Ask the server to start the game with the players present.
    StartGame { game_id: GameId, player_id: PlayerId },

    /// Roll the dice on the sender's turn.
    RollDice { game_id: GameId, player_id: PlayerId },

    /// Accept the pending property offer.
    BuyProperty { game_id: GameId, player_id: PlayerId },

    /// Decline the pending property offer.
    PassProperty { game_id: GameId, player_id: PlayerId },

    /// Sell one owned property back to the bank.
    SellProperty {
        game_id: GameId,
        player_id: PlayerId,
        block_name: String,
    },

    /// Answer a jail decision.
    JailChoice {
        game_id: GameId,
        player_id: PlayerId,
        choice: JailChoice,
    },

    /// Post a chat line to everyone in the game.
    #[serde(rename = "MESSAGE")]
    Chat {
        game_id: GameId,
        player_id: PlayerId,
        message: String,
    },
}

impl ClientMessage {
    /// The wire discriminator of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateGame { .. } => "CREATE_GAME",
            Self::JoinGame { .. } => "JOIN_GAME",
            Self::StartGame { .. } => "START_GAME",
            Self::RollDice { .. } => "ROLL_DICE",
            Self::BuyProperty { .. } => "BUY_PROPERTY",
            Self::PassProperty { .. } => "PASS_PROPERTY",
            Self::SellProperty { .. } => "SELL_PROPERTY",
            Self::JailChoice { .. } => "JAIL_CHOICE",
            Self::Chat { .. } => "MESSAGE",
        }
    }
}
