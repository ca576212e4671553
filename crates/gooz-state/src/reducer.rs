//! The event reducer: the only code that changes [`GameState`].

use gooz_protocol::{GameId, PlayerId, ServerMessage};
use tracing::{debug, trace, warn};

use crate::{
    ChatEntry, GameState, JailNotice, LiquidationPrompt, PendingAction, RentNotice,
};

/// What to do with a server `ERROR` message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Log it and leave the state alone.
    #[default]
    LogOnly,
    /// Log it and put its text in [`GameState::error_banner`].
    Banner,
}

/// Something that happened in the UI rather than on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalEvent {
    /// Select a card, or clear the selection with `None`.
    SelectCard(Option<u8>),
    DismissRentNotice,
    DismissJailNotice,
    DismissLiquidation,
    DismissError,
    /// The local player's id became known (e.g. a wallet connected).
    AdoptIdentity(PlayerId),
    /// A game id was restored from the session store.
    RestoreGame(GameId),
}

/// Input to [`Reducer::reduce`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Server(ServerMessage),
    Local(LocalEvent),
}

impl From<ServerMessage> for Event {
    fn from(msg: ServerMessage) -> Self {
        Self::Server(msg)
    }
}

impl From<LocalEvent> for Event {
    fn from(event: LocalEvent) -> Self {
        Self::Local(event)
    }
}

/// Maps `(state, event)` to the next state.
///
/// `reduce` has no side effects beyond logging, so the same inputs always
/// produce the same output. The server is trusted: a message is applied as
/// reported, without checking it against the current state.
#[derive(Debug, Clone, Default)]
pub struct Reducer {
    error_policy: ErrorPolicy,
}

impl Reducer {
    pub fn new(error_policy: ErrorPolicy) -> Self {
        Self { error_policy }
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }

    /// Applies one event and returns the resulting state.
    pub fn reduce(&self, state: GameState, event: &Event) -> GameState {
        match event {
            Event::Server(msg) => self.apply_server(state, msg),
            Event::Local(local) => apply_local(state, local),
        }
    }

    fn apply_server(&self, mut state: GameState, msg: &ServerMessage) -> GameState {
        trace!(tag = msg.kind(), "reducing server message");

        match msg {
            ServerMessage::GameCreated { game_id, player } => {
                debug!(%game_id, player_id = %player.id, "game created");
                state.game_id = Some(game_id.clone());
                state.player_id = Some(player.id.clone());
                state.players = vec![player.clone()];
            }

            ServerMessage::PlayerJoined { players } | ServerMessage::PlayerLeft { players } => {
                state.players = players.clone();
            }

            ServerMessage::GameStarted {
                current_player_id,
                players,
            } => {
                state.current_turn = Some(current_player_id.clone());
                state.players = players.clone();
            }

            ServerMessage::DiceRolled {
                player_id,
                dice,
                position,
            } => {
                state.last_dice = Some(*dice);
                match state.players.iter_mut().find(|p| &p.id == player_id) {
                    Some(player) => player.position = *position,
                    None => debug!(%player_id, "dice rolled by unlisted player"),
                }
            }

            ServerMessage::BuyOrPassRequired {
                property,
                player_id,
            } => {
                if addressed_to_me(&state, player_id.as_ref()) {
                    state.pending = PendingAction::BuyOrPass;
                    state.offer = Some(property.clone());
                } else {
                    trace!(?player_id, "offer for another player");
                }
            }

            ServerMessage::PropertyBought { player, .. }
            | ServerMessage::PropertyPassed { player, .. } => {
                state.pending = PendingAction::None;
                state.offer = None;
                if let Some(player) = player {
                    state.upsert_player(player.clone());
                }
            }

            ServerMessage::PropertySold {
                player_id, player, ..
            } => {
                if let Some(player) = player {
                    state.upsert_player(player.clone());
                }
                if state.is_local(player_id) {
                    state.liquidation = None;
                }
            }

            ServerMessage::RentPaid {
                payer,
                owner,
                amount,
                property_name,
            } => {
                state.upsert_player(payer.clone());
                state.upsert_player(owner.clone());
                if state.is_local(&payer.id) {
                    state.liquidation = None;
                    state.rent_notice = Some(RentNotice {
                        owner_name: owner.name.clone(),
                        amount: *amount,
                        property_name: property_name.clone(),
                    });
                }
            }

            ServerMessage::InsufficientFunds {
                rent_amount,
                current_money,
                owned_properties,
            } => {
                state.liquidation = Some(LiquidationPrompt {
                    rent_amount: *rent_amount,
                    current_money: *current_money,
                    owned_properties: owned_properties.clone(),
                });
            }

            ServerMessage::JailChoiceRequired { player_id } => {
                if addressed_to_me(&state, player_id.as_ref()) {
                    state.jailed = true;
                    state.pending = PendingAction::JailChoice;
                } else {
                    trace!(?player_id, "jail choice for another player");
                }
            }

            ServerMessage::JailRollResult {
                player_id,
                dice,
                escaped,
            } => {
                if addressed_to_me(&state, player_id.as_ref()) {
                    state.pending = PendingAction::None;
                    if *escaped {
                        state.jailed = false;
                    }
                    state.jail_notice = Some(JailNotice {
                        dice: *dice,
                        escaped: *escaped,
                    });
                }
            }

            ServerMessage::NextTurn {
                current_player_id,
                players,
            } => {
                state.current_turn = Some(current_player_id.clone());
                state.players = players.clone();
                state.pending = PendingAction::None;
                state.offer = None;
                state.last_dice = None;
            }

            ServerMessage::Chat {
                player_id,
                player_name,
                message,
                timestamp,
            } => {
                state.chat.push(ChatEntry {
                    player_id: player_id.clone(),
                    player_name: player_name.clone(),
                    message: message.clone(),
                    timestamp: *timestamp,
                });
            }

            ServerMessage::Error { message } => {
                warn!(%message, "server error");
                if self.error_policy == ErrorPolicy::Banner {
                    state.error_banner = Some(message.clone());
                }
            }

            ServerMessage::Unrecognized => {
                debug!("unrecognized server message ignored");
            }
        }

        state
    }
}

/// Prompts without a `playerId` are sent only to the player concerned.
fn addressed_to_me(state: &GameState, player_id: Option<&PlayerId>) -> bool {
    player_id.is_none_or(|id| state.is_local(id))
}

fn apply_local(mut state: GameState, event: &LocalEvent) -> GameState {
    match event {
        LocalEvent::SelectCard(card) => state.selected_card = *card,
        LocalEvent::DismissRentNotice => state.rent_notice = None,
        LocalEvent::DismissJailNotice => state.jail_notice = None,
        LocalEvent::DismissLiquidation => state.liquidation = None,
        LocalEvent::DismissError => state.error_banner = None,
        LocalEvent::AdoptIdentity(id) => state.player_id = Some(id.clone()),
        LocalEvent::RestoreGame(id) => state.game_id = Some(id.clone()),
    }
    state
}
