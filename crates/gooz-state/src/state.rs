//! The client-side state bag.
//!
//! Every field is either a cache of something the server reported or a
//! UI-only slot. Nothing here is computed from game rules.

use gooz_protocol::{GameId, Player, PlayerId, PropertyOffer};

// ---------------------------------------------------------------------------
// PendingAction
// ---------------------------------------------------------------------------

/// A decision the server is waiting on from the local player.
///
/// Only server messages set or clear it; the client never times it out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PendingAction {
    /// Nothing to decide.
    #[default]
    None,
    /// Buy or pass on the cached [`PropertyOffer`].
    BuyOrPass,
    /// Pay the fine or roll to leave jail.
    JailChoice,
}

// ---------------------------------------------------------------------------
// Notices and prompts
// ---------------------------------------------------------------------------

/// One chat line, in the order it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub player_id: PlayerId,
    pub player_name: String,
    pub message: String,
    /// Milliseconds since the Unix epoch, as stamped by the server.
    pub timestamp: u64,
}

/// Shown when the local player owes more rent than they hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidationPrompt {
    pub rent_amount: u64,
    pub current_money: i64,
    /// Properties the player could sell to cover the rent.
    pub owned_properties: Vec<String>,
}

impl LiquidationPrompt {
    /// How much more money the player needs.
    pub fn shortfall(&self) -> u64 {
        let owed = i64::try_from(self.rent_amount).unwrap_or(i64::MAX);
        u64::try_from(owed.saturating_sub(self.current_money)).unwrap_or(0)
    }
}

/// One-shot notice that the local player paid rent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RentNotice {
    pub owner_name: String,
    pub amount: u64,
    pub property_name: String,
}

/// One-shot notice with the outcome of a roll-for-jail attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JailNotice {
    pub dice: u8,
    pub escaped: bool,
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// Everything the UI renders.
///
/// `Default` is the state of a client that has not joined anything yet.
/// Player lists are always replaced wholesale from server snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    /// The game this client is in (or last was in).
    pub game_id: Option<GameId>,
    /// Who the local player is.
    pub player_id: Option<PlayerId>,
    /// Server snapshots of every player, in server order.
    pub players: Vec<Player>,
    /// Whose turn it is.
    pub current_turn: Option<PlayerId>,
    /// The last dice value rolled this turn.
    pub last_dice: Option<u8>,
    pub pending: PendingAction,
    /// The property on offer while `pending` is [`PendingAction::BuyOrPass`].
    pub offer: Option<PropertyOffer>,
    /// Whether the local player is in jail.
    pub jailed: bool,
    pub liquidation: Option<LiquidationPrompt>,
    pub rent_notice: Option<RentNotice>,
    pub jail_notice: Option<JailNotice>,
    /// Last server error, when errors are surfaced.
    pub error_banner: Option<String>,
    /// Chat log. Append-only.
    pub chat: Vec<ChatEntry>,
    /// The card the UI has selected, if any.
    pub selected_card: Option<u8>,
}

impl GameState {
    /// `true` if the local player is known and it is their turn.
    pub fn is_my_turn(&self) -> bool {
        matches!(
            (&self.player_id, &self.current_turn),
            (Some(me), Some(turn)) if me == turn
        )
    }

    /// `true` if `id` is the local player.
    pub fn is_local(&self, id: &PlayerId) -> bool {
        self.player_id.as_ref() == Some(id)
    }

    /// The snapshot for `id`, if the server has sent one.
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// The local player's snapshot.
    pub fn local_player(&self) -> Option<&Player> {
        self.player_id.as_ref().and_then(|id| self.player(id))
    }

    /// Replaces the snapshot with the same id, or appends it if the
    /// player is not listed yet.
    pub(crate) fn upsert_player(&mut self, player: Player) {
        match self.players.iter_mut().find(|p| p.id == player.id) {
            Some(slot) => *slot = player,
            None => self.players.push(player),
        }
    }
}
