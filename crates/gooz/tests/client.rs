//! End-to-end tests for `GoozClient` against a real WebSocket server.
//!
//! Each test binds a scripted `tokio-tungstenite` server on an
//! OS-assigned port, so the whole path (socket, codec, adapter, reducer,
//! store) is exercised.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use gooz::prelude::*;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ServerWs = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

const WAIT: Duration = Duration::from_secs(5);

async fn listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = listener.local_addr().expect("local addr");
    (listener, format!("ws://{addr}"))
}

async fn accept(listener: &TcpListener) -> ServerWs {
    let (stream, _) = tokio::time::timeout(WAIT, listener.accept())
        .await
        .expect("client should dial")
        .expect("should accept");
    tokio_tungstenite::accept_async(stream)
        .await
        .expect("upgrade should succeed")
}

async fn push(ws: &mut ServerWs, json: &str) {
    ws.send(Message::Text(json.to_owned().into()))
        .await
        .expect("server send");
}

/// Next text frame from the client, parsed as JSON.
async fn next_json(ws: &mut ServerWs) -> serde_json::Value {
    loop {
        let msg = tokio::time::timeout(WAIT, ws.next())
            .await
            .expect("client should send")
            .expect("stream open")
            .expect("frame ok");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("client sends JSON");
        }
    }
}

async fn wait_state(states: &mut watch::Receiver<GameState>, pred: impl FnMut(&GameState) -> bool) {
    tokio::time::timeout(WAIT, states.wait_for(pred))
        .await
        .expect("state should arrive")
        .expect("reducer alive");
}

async fn wait_link(client: &GoozClient, want: LinkStatus) {
    let mut link = client.subscribe_link();
    tokio::time::timeout(WAIT, link.wait_for(|s| *s == want))
        .await
        .expect("link status should arrive")
        .expect("adapter alive");
}

const GAME_CREATED: &str = r##"{"type":"GAME_CREATED","gameId":"00BF80D3",
    "player":{"id":"p1","name":"John Doe","colorCode":"#FF0000","poolAmt":1500}}"##;

// =========================================================================
// Full flow
// =========================================================================

#[tokio::test]
async fn test_create_start_roll_buy_flow() {
    let (listener, url) = listener().await;
    let dir = tempfile::tempdir().unwrap();
    let session_path = dir.path().join("session.json");

    let client = GoozClient::builder()
        .url(url)
        .store(FileStore::new(&session_path))
        .build()
        .await
        .expect("client should build");
    let mut states = client.subscribe();

    client.connect();
    let mut ws = accept(&listener).await;
    wait_link(&client, LinkStatus::Open).await;

    // Create.
    client
        .create_game(&PlayerProfile::new("John Doe", "#FF0000"))
        .expect("create should send");
    let sent = next_json(&mut ws).await;
    assert_eq!(sent["type"], "CREATE_GAME");
    assert_eq!(sent["playerName"], "John Doe");

    push(&mut ws, GAME_CREATED).await;
    wait_state(&mut states, |s| s.game_id.is_some()).await;
    let state = client.state();
    assert_eq!(state.game_id, Some(GameId::from("00BF80D3")));
    assert_eq!(state.player_id, Some(PlayerId::from("p1")));

    // The game id was persisted.
    let saved = FileStore::new(&session_path).load_game_id().await.unwrap();
    assert_eq!(saved, Some(GameId::from("00BF80D3")));

    // Start.
    client.start_game().expect("start should send");
    let sent = next_json(&mut ws).await;
    assert_eq!(sent["type"], "START_GAME");
    assert_eq!(sent["gameId"], "00BF80D3");
    assert_eq!(sent["playerId"], "p1");

    // Not our turn yet: refused locally.
    assert_eq!(client.roll_dice(), Err(ActionError::NotYourTurn));

    push(
        &mut ws,
        r##"{"type":"GAME_STARTED","currentPlayerId":"p1",
            "players":[{"id":"p1","name":"John Doe","colorCode":"#FF0000","poolAmt":1500}]}"##,
    )
    .await;
    wait_state(&mut states, |s| s.is_my_turn()).await;

    // Roll.
    client.roll_dice().expect("roll should send");
    assert_eq!(next_json(&mut ws).await["type"], "ROLL_DICE");

    push(&mut ws, r#"{"type":"DICE_ROLLED","playerId":"p1","dice":4,"position":4}"#).await;
    push(
        &mut ws,
        r#"{"type":"BUY_OR_PASS_REQUIRED","property":{"name":"Illinois","price":220}}"#,
    )
    .await;
    wait_state(&mut states, |s| s.pending == PendingAction::BuyOrPass).await;
    let state = client.state();
    assert_eq!(state.last_dice, Some(4));
    assert_eq!(state.local_player().unwrap().position, 4);
    assert_eq!(state.offer.as_ref().unwrap().price, 220);

    // Buy.
    client.buy_property().expect("buy should send");
    assert_eq!(next_json(&mut ws).await["type"], "BUY_PROPERTY");

    push(&mut ws, r#"{"type":"PROPERTY_BOUGHT","playerId":"p1"}"#).await;
    wait_state(&mut states, |s| s.pending == PendingAction::None).await;
    assert_eq!(
        client.buy_property(),
        Err(ActionError::NotPending {
            expected: PendingAction::BuyOrPass
        })
    );

    client.shutdown().await;
}

#[tokio::test]
async fn test_chat_round_trip() {
    let (listener, url) = listener().await;
    let client = GoozClient::builder()
        .url(url)
        .store(MemoryStore::with_game_id(GameId::from("g1")))
        .player_id("p1")
        .build()
        .await
        .unwrap();
    let mut states = client.subscribe();

    client.connect();
    let mut ws = accept(&listener).await;
    wait_link(&client, LinkStatus::Open).await;

    assert_eq!(client.send_chat("   "), Err(ActionError::EmptyMessage));
    client.send_chat("  good game  ").unwrap();
    let sent = next_json(&mut ws).await;
    assert_eq!(sent["type"], "MESSAGE");
    assert_eq!(sent["message"], "good game");

    push(
        &mut ws,
        r#"{"type":"MESSAGE","playerId":"p1","playerName":"John","message":"good game","timestamp":17}"#,
    )
    .await;
    wait_state(&mut states, |s| s.chat.len() == 1).await;
    assert_eq!(client.state().chat[0].timestamp, 17);

    client.shutdown().await;
}

// =========================================================================
// Preconditions and local state
// =========================================================================

#[tokio::test]
async fn test_actions_refused_while_disconnected() {
    let client = GoozClient::builder()
        .url("ws://127.0.0.1:9")
        .build()
        .await
        .unwrap();

    assert!(!client.is_connected());
    assert_eq!(
        client.create_game(&PlayerProfile::new("a", "#000")),
        Err(ActionError::NotConnected)
    );
    assert_eq!(client.roll_dice(), Err(ActionError::NotConnected));
    assert_eq!(client.send_chat("hi"), Err(ActionError::NotConnected));

    client.shutdown().await;
}

#[tokio::test]
async fn test_build_restores_session_and_identity() {
    let client = GoozClient::builder()
        .store(MemoryStore::with_game_id(GameId::from("00BF80D3")))
        .player_id("0xabc")
        .build()
        .await
        .unwrap();

    let state = client.state();
    assert_eq!(state.game_id, Some(GameId::from("00BF80D3")));
    assert_eq!(state.player_id, Some(PlayerId::from("0xabc")));

    client.shutdown().await;
}

#[tokio::test]
async fn test_corrupt_session_file_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, b"definitely not json").unwrap();

    let client = GoozClient::builder()
        .store(FileStore::new(&path))
        .build()
        .await
        .expect("corrupt session should not block startup");

    assert_eq!(client.state().game_id, None);
    assert!(!path.exists());

    client.shutdown().await;
}

#[tokio::test]
async fn test_dispatch_reaches_subscribers() {
    let client = GoozClient::builder().build().await.unwrap();
    let mut states = client.subscribe();

    client.dispatch(LocalEvent::SelectCard(Some(4)));
    wait_state(&mut states, |s| s.selected_card == Some(4)).await;

    client.dispatch(LocalEvent::SelectCard(None));
    wait_state(&mut states, |s| s.selected_card.is_none()).await;

    client.shutdown().await;
}

// =========================================================================
// Server errors
// =========================================================================

#[tokio::test]
async fn test_error_banner_policy() {
    let (listener, url) = listener().await;
    let client = GoozClient::builder()
        .url(url)
        .error_policy(ErrorPolicy::Banner)
        .build()
        .await
        .unwrap();
    let mut states = client.subscribe();

    client.connect();
    let mut ws = accept(&listener).await;
    push(&mut ws, r#"{"type":"ERROR","message":"Game not found"}"#).await;

    wait_state(&mut states, |s| s.error_banner.is_some()).await;
    assert_eq!(client.state().error_banner.as_deref(), Some("Game not found"));

    client.dispatch(LocalEvent::DismissError);
    wait_state(&mut states, |s| s.error_banner.is_none()).await;

    client.shutdown().await;
}

// =========================================================================
// Reconnect
// =========================================================================

#[tokio::test]
async fn test_redials_after_server_drops_connection() {
    let (listener, url) = listener().await;
    let client = GoozClient::builder()
        .url(url)
        .store(MemoryStore::with_game_id(GameId::from("g1")))
        .player_id("p1")
        .reconnect(ReconnectConfig::fixed(Duration::from_millis(100)))
        .build()
        .await
        .unwrap();

    client.connect();
    let mut first = accept(&listener).await;
    wait_link(&client, LinkStatus::Open).await;
    first.close(None).await.unwrap();
    drop(first);

    let mut second = accept(&listener).await;
    wait_link(&client, LinkStatus::Open).await;

    // State survives the reconnect; the new link carries actions.
    assert_eq!(client.state().game_id, Some(GameId::from("g1")));
    client.start_game().unwrap();
    assert_eq!(next_json(&mut second).await["type"], "START_GAME");

    client.shutdown().await;
}

#[tokio::test]
async fn test_disconnect_sends_close_frame() {
    let (listener, url) = listener().await;
    let client = GoozClient::builder().url(url).build().await.unwrap();

    client.connect();
    let mut ws = accept(&listener).await;
    wait_link(&client, LinkStatus::Open).await;

    client.disconnect().await;
    assert_eq!(client.link_status(), LinkStatus::Disconnected);

    let closed = tokio::time::timeout(WAIT, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "server should observe the close");

    client.shutdown().await;
}
