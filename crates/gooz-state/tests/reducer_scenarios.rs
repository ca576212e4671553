//! Scenario tests for the reducer, driven by server JSON.
//!
//! Messages are decoded from the same JSON shapes the server sends, so
//! these tests also cover the protocol → state seam.

use gooz_protocol::{GameId, Player, PlayerId, ServerMessage};
use gooz_state::{
    ChatEntry, ErrorPolicy, Event, GameState, JailNotice, LiquidationPrompt, PendingAction,
    Reducer,
};

// =========================================================================
// Helpers
// =========================================================================

fn msg(json: &str) -> Event {
    let msg: ServerMessage = serde_json::from_str(json).unwrap();
    Event::Server(msg)
}

fn player(id: &str) -> Player {
    Player {
        id: PlayerId::from(id),
        name: id.into(),
        color_code: "#FF0000".into(),
        position: 0,
        pool_amt: 1500,
        owned_properties: Vec::new(),
    }
}

/// A state with every slot filled, so "unchanged" means something.
fn busy_state() -> GameState {
    GameState {
        game_id: Some(GameId::from("00BF80D3")),
        player_id: Some(PlayerId::from("p1")),
        players: vec![player("p1"), player("p2")],
        current_turn: Some(PlayerId::from("p1")),
        last_dice: Some(7),
        pending: PendingAction::JailChoice,
        offer: None,
        jailed: true,
        liquidation: Some(LiquidationPrompt {
            rent_amount: 200,
            current_money: 50,
            owned_properties: vec!["Baltic".into()],
        }),
        rent_notice: None,
        jail_notice: Some(JailNotice {
            dice: 3,
            escaped: false,
        }),
        error_banner: Some("earlier".into()),
        chat: vec![ChatEntry {
            player_id: PlayerId::from("p2"),
            player_name: "p2".into(),
            message: "hello".into(),
            timestamp: 1,
        }],
        selected_card: Some(2),
    }
}

/// One minimally-valid payload per known tag.
const MINIMAL_PAYLOADS: &[&str] = &[
    r##"{"type":"GAME_CREATED","gameId":"g","player":{"id":"p1","name":"a","colorCode":"#000"}}"##,
    r#"{"type":"PLAYER_JOINED","players":[]}"#,
    r#"{"type":"PLAYER_LEFT","players":[]}"#,
    r#"{"type":"GAME_STARTED","currentPlayerId":"p1","players":[]}"#,
    r#"{"type":"DICE_ROLLED","playerId":"p1","dice":1,"position":1}"#,
    r#"{"type":"BUY_OR_PASS_REQUIRED","property":{"name":"x","price":1}}"#,
    r#"{"type":"PROPERTY_BOUGHT","playerId":"p1"}"#,
    r#"{"type":"PROPERTY_PASSED","playerId":"p1"}"#,
    r#"{"type":"PROPERTY_SOLD","playerId":"p1"}"#,
    r##"{"type":"RENT_PAID","amount":1,"propertyName":"x",
        "payer":{"id":"p1","name":"a","colorCode":"#000"},
        "owner":{"id":"p2","name":"b","colorCode":"#fff"}}"##,
    r#"{"type":"INSUFFICIENT_FUNDS","rentAmount":1,"currentMoney":0}"#,
    r#"{"type":"JAIL_CHOICE_REQUIRED"}"#,
    r#"{"type":"JAIL_ROLL_RESULT","dice":1,"escaped":false}"#,
    r#"{"type":"NEXT_TURN","currentPlayerId":"p2","players":[]}"#,
    r#"{"type":"MESSAGE","playerId":"p1","playerName":"a","message":"m"}"#,
    r#"{"type":"ERROR","message":"e"}"#,
];

/// Structural checks that must hold after any reduction.
fn assert_well_formed(state: &GameState) {
    if state.offer.is_some() {
        assert_eq!(state.pending, PendingAction::BuyOrPass, "offer without pending decision");
    }
    if state.pending == PendingAction::JailChoice {
        assert!(state.jailed, "jail choice pending while not jailed");
    }
    if let Some(turn) = &state.current_turn {
        assert!(!turn.as_str().is_empty());
    }
}

// =========================================================================
// Totality
// =========================================================================

#[test]
fn test_every_known_tag_reduces_from_default() {
    let reducer = Reducer::default();
    for json in MINIMAL_PAYLOADS {
        let state = reducer.reduce(GameState::default(), &msg(json));
        assert_well_formed(&state);
    }
}

#[test]
fn test_every_known_tag_reduces_from_busy_state() {
    for policy in [ErrorPolicy::LogOnly, ErrorPolicy::Banner] {
        let reducer = Reducer::new(policy);
        for json in MINIMAL_PAYLOADS {
            let state = reducer.reduce(busy_state(), &msg(json));
            assert_well_formed(&state);
        }
    }
}

#[test]
fn test_whole_stream_in_sequence() {
    let reducer = Reducer::default();
    let state = MINIMAL_PAYLOADS
        .iter()
        .fold(GameState::default(), |state, json| {
            let next = reducer.reduce(state, &msg(json));
            assert_well_formed(&next);
            next
        });
    assert_eq!(state.chat.len(), 1);
}

// =========================================================================
// Unknown discriminators
// =========================================================================

#[test]
fn test_unknown_tag_leaves_state_unchanged() {
    let reducer = Reducer::new(ErrorPolicy::Banner);
    let before = busy_state();

    let after = reducer.reduce(
        before.clone(),
        &msg(r#"{"type":"AUCTION_STARTED","lot":{"name":"x"},"bids":[1,2]}"#),
    );

    assert_eq!(after, before);
}

// =========================================================================
// Next turn
// =========================================================================

#[test]
fn test_next_turn_always_clears_pending_and_dice() {
    let reducer = Reducer::default();
    let priors = [
        GameState::default(),
        busy_state(),
        reducer.reduce(
            busy_state(),
            &msg(r#"{"type":"BUY_OR_PASS_REQUIRED","property":{"name":"x","price":9}}"#),
        ),
    ];

    for prior in priors {
        let state = reducer.reduce(
            prior,
            &msg(r#"{"type":"NEXT_TURN","currentPlayerId":"p2","players":[]}"#),
        );
        assert_eq!(state.pending, PendingAction::None);
        assert_eq!(state.last_dice, None);
    }
}

// =========================================================================
// Chat
// =========================================================================

#[test]
fn test_chat_is_append_only_in_receipt_order() {
    let reducer = Reducer::default();
    let mut state = GameState::default();
    let mut seen: Vec<ChatEntry> = Vec::new();

    for n in 0..25u64 {
        let json = format!(
            r#"{{"type":"MESSAGE","playerId":"p{}","playerName":"n","message":"line {n}","timestamp":{n}}}"#,
            n % 3
        );
        state = reducer.reduce(state, &msg(&json));

        // Earlier entries are untouched.
        assert_eq!(&state.chat[..seen.len()], &seen[..]);
        seen = state.chat.clone();
    }

    assert_eq!(state.chat.len(), 25);
    for (n, entry) in state.chat.iter().enumerate() {
        assert_eq!(entry.message, format!("line {n}"));
    }
}

// =========================================================================
// Jail round trip
// =========================================================================

#[test]
fn test_jail_round_trip() {
    let reducer = Reducer::default();
    let state = GameState {
        player_id: Some(PlayerId::from("p1")),
        ..Default::default()
    };

    let state = reducer.reduce(state, &msg(r#"{"type":"JAIL_CHOICE_REQUIRED","playerId":"p1"}"#));
    assert!(state.jailed);
    assert_eq!(state.pending, PendingAction::JailChoice);

    let state = reducer.reduce(
        state,
        &msg(r#"{"type":"JAIL_ROLL_RESULT","playerId":"p1","dice":3,"escaped":false}"#),
    );
    assert!(state.jailed);
    assert_eq!(state.pending, PendingAction::None);
    assert_eq!(
        state.jail_notice,
        Some(JailNotice {
            dice: 3,
            escaped: false
        })
    );

    let state = reducer.reduce(
        state,
        &msg(r#"{"type":"JAIL_ROLL_RESULT","playerId":"p1","dice":6,"escaped":true}"#),
    );
    assert!(!state.jailed);
    assert_eq!(state.jail_notice.map(|n| n.escaped), Some(true));
}

#[test]
fn test_other_players_jail_messages_do_not_touch_mine() {
    let reducer = Reducer::default();
    let state = GameState {
        player_id: Some(PlayerId::from("p1")),
        ..Default::default()
    };

    // p2 being jailed does not jail me.
    let state = reducer.reduce(state, &msg(r#"{"type":"JAIL_CHOICE_REQUIRED","playerId":"p2"}"#));
    assert!(!state.jailed);
    assert_eq!(state.pending, PendingAction::None);

    // I am jailed; p2 escaping does not free me or drop my decision.
    let state = reducer.reduce(state, &msg(r#"{"type":"JAIL_CHOICE_REQUIRED","playerId":"p1"}"#));
    let state = reducer.reduce(
        state,
        &msg(r#"{"type":"JAIL_ROLL_RESULT","playerId":"p2","dice":6,"escaped":true}"#),
    );
    assert!(state.jailed);
    assert_eq!(state.pending, PendingAction::JailChoice);
    assert!(state.jail_notice.is_none());
    assert_well_formed(&state);
}

#[test]
fn test_offer_for_other_player_is_ignored() {
    let reducer = Reducer::default();
    let state = GameState {
        player_id: Some(PlayerId::from("p1")),
        ..Default::default()
    };

    let state = reducer.reduce(
        state,
        &msg(r#"{"type":"BUY_OR_PASS_REQUIRED","playerId":"p2",
                 "property":{"name":"Illinois","price":220}}"#),
    );
    assert_eq!(state.pending, PendingAction::None);
    assert!(state.offer.is_none());
}

#[test]
fn test_bankrupt_balance_still_advances_turn() {
    let reducer = Reducer::default();
    let state = reducer.reduce(
        busy_state(),
        &msg(r##"{"type":"NEXT_TURN","currentPlayerId":"p2","players":[
                 {"id":"p1","name":"p1","colorCode":"#FF0000","poolAmt":-120},
                 {"id":"p2","name":"p2","colorCode":"#00FF00","poolAmt":900}]}"##),
    );
    assert_eq!(state.current_turn, Some(PlayerId::from("p2")));
    assert_eq!(state.local_player().unwrap().pool_amt, -120);
}

// =========================================================================
// Buy flow
// =========================================================================

#[test]
fn test_buy_flow() {
    let reducer = Reducer::default();
    let state = GameState {
        player_id: Some(PlayerId::from("p1")),
        players: vec![player("p1")],
        ..Default::default()
    };

    let state = reducer.reduce(
        state,
        &msg(r#"{"type":"BUY_OR_PASS_REQUIRED","playerId":"p1",
                 "property":{"name":"Illinois","price":220,"rent":18}}"#),
    );
    assert_eq!(state.pending, PendingAction::BuyOrPass);
    assert_eq!(state.offer.as_ref().map(|o| o.price), Some(220));

    let state = reducer.reduce(
        state,
        &msg(r##"{"type":"PROPERTY_BOUGHT","playerId":"p1",
                 "player":{"id":"p1","name":"p1","colorCode":"#FF0000",
                           "poolAmt":1280,"ownedProperties":["Illinois"]}}"##),
    );
    assert_eq!(state.pending, PendingAction::None);
    assert!(state.offer.is_none());
    let me = state.local_player().unwrap();
    assert_eq!(me.pool_amt, 1280);
    assert_eq!(me.owned_properties, vec!["Illinois"]);
}
