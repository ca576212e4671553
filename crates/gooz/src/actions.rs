//! Outbound actions and their local preconditions.
//!
//! Each function here looks at the current [`GameState`] and either builds
//! the one [`ClientMessage`] for that action or explains why it cannot be
//! sent yet. The checks only catch requests that are certain to be
//! pointless (not connected, not your turn); the server still decides
//! whether an action is legal.
//!
//! [`GoozClient`](crate::GoozClient) calls these and hands the message to
//! the adapter.

use gooz_protocol::{ClientMessage, GameId, JailChoice, PlayerId};
use gooz_state::{GameState, PendingAction};

/// Why an action was not sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// The link to the server is not open.
    #[error("not connected to the game server")]
    NotConnected,

    /// No game has been created, joined, or restored.
    #[error("no game id known")]
    NoGame,

    /// The local player's id is not known.
    #[error("no player id known")]
    NoPlayer,

    /// A join needs a game id to join.
    #[error("game id must not be empty")]
    EmptyGameId,

    /// The action is only valid on the local player's turn.
    #[error("it is not your turn")]
    NotYourTurn,

    /// The action answers a decision the server has not asked for.
    #[error("no {expected:?} decision is pending")]
    NotPending { expected: PendingAction },

    /// A sell needs a property name.
    #[error("property name must not be empty")]
    EmptyPropertyName,

    /// A chat line was empty after trimming.
    #[error("chat message must not be empty")]
    EmptyMessage,

    /// The adapter refused the message (the link dropped between the
    /// check and the send).
    #[error("message was not handed to the connection")]
    SendRejected,
}

/// Name, color and optional stake a player presents when creating or
/// joining a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    pub name: String,
    pub color_code: String,
    pub stake_amount: Option<u64>,
}

impl PlayerProfile {
    pub fn new(name: impl Into<String>, color_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color_code: color_code.into(),
            stake_amount: None,
        }
    }

    /// Sets the entry stake.
    pub fn with_stake(mut self, stake_amount: u64) -> Self {
        self.stake_amount = Some(stake_amount);
        self
    }
}

fn ensure_connected(connected: bool) -> Result<(), ActionError> {
    if connected {
        Ok(())
    } else {
        Err(ActionError::NotConnected)
    }
}

/// Connected, in a game, and known to the server.
fn in_game(state: &GameState, connected: bool) -> Result<(GameId, PlayerId), ActionError> {
    ensure_connected(connected)?;
    let game_id = state.game_id.clone().ok_or(ActionError::NoGame)?;
    let player_id = state.player_id.clone().ok_or(ActionError::NoPlayer)?;
    Ok((game_id, player_id))
}

fn ensure_pending(state: &GameState, expected: PendingAction) -> Result<(), ActionError> {
    if state.pending == expected {
        Ok(())
    } else {
        Err(ActionError::NotPending { expected })
    }
}

// ---------------------------------------------------------------------------
// Lobby
// ---------------------------------------------------------------------------

pub fn create_game(
    state: &GameState,
    connected: bool,
    profile: &PlayerProfile,
) -> Result<ClientMessage, ActionError> {
    ensure_connected(connected)?;
    Ok(ClientMessage::CreateGame {
        player_id: state.player_id.clone(),
        player_name: profile.name.clone(),
        color_code: profile.color_code.clone(),
        stake_amount: profile.stake_amount,
    })
}

pub fn join_game(
    state: &GameState,
    connected: bool,
    game_id: &GameId,
    profile: &PlayerProfile,
) -> Result<ClientMessage, ActionError> {
    ensure_connected(connected)?;
    if game_id.as_str().trim().is_empty() {
        return Err(ActionError::EmptyGameId);
    }
    Ok(ClientMessage::JoinGame {
        game_id: game_id.clone(),
        player_id: state.player_id.clone(),
        player_name: profile.name.clone(),
        color_code: profile.color_code.clone(),
        stake_amount: profile.stake_amount,
    })
}

pub fn start_game(state: &GameState, connected: bool) -> Result<ClientMessage, ActionError> {
    let (game_id, player_id) = in_game(state, connected)?;
    Ok(ClientMessage::StartGame { game_id, player_id })
}

// ---------------------------------------------------------------------------
// Turn actions
// ---------------------------------------------------------------------------

pub fn roll_dice(state: &GameState, connected: bool) -> Result<ClientMessage, ActionError> {
    let (game_id, player_id) = in_game(state, connected)?;
    if !state.is_my_turn() {
        return Err(ActionError::NotYourTurn);
    }
    Ok(ClientMessage::RollDice { game_id, player_id })
}

pub fn buy_property(state: &GameState, connected: bool) -> Result<ClientMessage, ActionError> {
    let (game_id, player_id) = in_game(state, connected)?;
    ensure_pending(state, PendingAction::BuyOrPass)?;
    Ok(ClientMessage::BuyProperty { game_id, player_id })
}

pub fn pass_property(state: &GameState, connected: bool) -> Result<ClientMessage, ActionError> {
    let (game_id, player_id) = in_game(state, connected)?;
    ensure_pending(state, PendingAction::BuyOrPass)?;
    Ok(ClientMessage::PassProperty { game_id, player_id })
}

/// Sells `block_name`, typically to cover rent during liquidation.
pub fn sell_property(
    state: &GameState,
    connected: bool,
    block_name: &str,
) -> Result<ClientMessage, ActionError> {
    let (game_id, player_id) = in_game(state, connected)?;
    let block_name = block_name.trim();
    if block_name.is_empty() {
        return Err(ActionError::EmptyPropertyName);
    }
    Ok(ClientMessage::SellProperty {
        game_id,
        player_id,
        block_name: block_name.to_owned(),
    })
}

/// Answers a pending jail decision with `choice`.
pub fn jail_choice(
    state: &GameState,
    connected: bool,
    choice: JailChoice,
) -> Result<ClientMessage, ActionError> {
    let (game_id, player_id) = in_game(state, connected)?;
    ensure_pending(state, PendingAction::JailChoice)?;
    Ok(ClientMessage::JailChoice {
        game_id,
        player_id,
        choice,
    })
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

pub fn chat(state: &GameState, connected: bool, text: &str) -> Result<ClientMessage, ActionError> {
    let (game_id, player_id) = in_game(state, connected)?;
    let message = text.trim();
    if message.is_empty() {
        return Err(ActionError::EmptyMessage);
    }
    Ok(ClientMessage::Chat {
        game_id,
        player_id,
        message: message.to_owned(),
    })
}
