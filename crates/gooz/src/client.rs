//! `GoozClient` builder and reducer loop.
//!
//! This is the entry point for a Gooz client. It ties the layers
//! together: adapter → protocol → reducer → observers, with the session
//! store on the side.

use std::time::Duration;

use gooz_protocol::{ClientMessage, Codec, GameId, JailChoice, JsonCodec, PlayerId, ServerMessage};
use gooz_reconnect::ReconnectConfig;
use gooz_session::{MemoryStore, SessionError, SessionStore};
use gooz_state::{ErrorPolicy, Event, GameState, LocalEvent, Reducer};
use gooz_transport::{Connector, WebSocketConnector};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::actions::{self, ActionError, PlayerProfile};
use crate::{ClientConfig, ConnectionAdapter, GoozError, LinkStatus};

/// Builder for configuring and starting a Gooz client.
///
/// # Example
///
/// ```rust,no_run
/// use gooz::prelude::*;
///
/// # async fn run() -> Result<(), GoozError> {
/// let client = GoozClient::builder()
///     .url("ws://localhost:8080")
///     .store(FileStore::new("gooz-session.json"))
///     .build()
///     .await?;
/// client.connect();
/// # Ok(())
/// # }
/// ```
pub struct GoozClientBuilder<S = MemoryStore> {
    config: ClientConfig,
    player_id: Option<PlayerId>,
    store: S,
}

impl GoozClientBuilder<MemoryStore> {
    /// Creates a new builder with default settings and an in-memory store.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            player_id: None,
            store: MemoryStore::default(),
        }
    }
}

impl Default for GoozClientBuilder<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SessionStore> GoozClientBuilder<S> {
    /// Sets the server endpoint.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the reconnect schedule.
    pub fn reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.config.reconnect = reconnect;
        self
    }

    /// Sets how server errors are surfaced.
    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.config.error_policy = policy;
        self
    }

    /// Sets the bound on a graceful disconnect.
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout = timeout;
        self
    }

    /// Sets the local player's id up front (e.g. a wallet address).
    pub fn player_id(mut self, player_id: impl Into<PlayerId>) -> Self {
        self.player_id = Some(player_id.into());
        self
    }

    /// Sets where the game id is persisted.
    pub fn store<S2: SessionStore>(self, store: S2) -> GoozClientBuilder<S2> {
        GoozClientBuilder {
            config: self.config,
            player_id: self.player_id,
            store,
        }
    }

    /// Builds a client that dials the configured url over WebSocket.
    ///
    /// Nothing is dialed until [`GoozClient::connect`].
    pub async fn build(self) -> Result<GoozClient<WebSocketConnector>, GoozError> {
        let connector = WebSocketConnector::new(self.config.url.clone());
        self.build_with(connector).await
    }

    /// Builds a client around any [`Connector`].
    ///
    /// # Errors
    /// Returns [`GoozError::Session`] if the store cannot be read. A
    /// corrupt session file is logged, cleared, and ignored.
    pub async fn build_with<K: Connector>(
        self,
        connector: K,
    ) -> Result<GoozClient<K>, GoozError> {
        let reducer = Reducer::new(self.config.error_policy);

        let mut state = GameState::default();
        if let Some(game_id) = restore_game_id(&self.store).await? {
            info!(%game_id, "restored game id from session");
            state = reducer.reduce(state, &Event::Local(LocalEvent::RestoreGame(game_id)));
        }
        if let Some(player_id) = self.player_id {
            state = reducer.reduce(state, &Event::Local(LocalEvent::AdoptIdentity(player_id)));
        }

        let (adapter, inbound_rx) = ConnectionAdapter::new(
            connector,
            JsonCodec,
            self.config.reconnect.clone(),
            self.config.shutdown_timeout,
        );
        let (state_tx, state_rx) = watch::channel(state.clone());
        let (local_tx, local_rx) = mpsc::unbounded_channel();

        let reducer_task = tokio::spawn(run_reducer(
            reducer,
            state,
            inbound_rx,
            local_rx,
            state_tx,
            self.store,
        ));

        Ok(GoozClient {
            adapter,
            state_rx,
            local_tx,
            reducer_task,
            shutdown_timeout: self.config.shutdown_timeout,
        })
    }
}

async fn restore_game_id<S: SessionStore>(store: &S) -> Result<Option<GameId>, GoozError> {
    match store.load_game_id().await {
        Ok(game_id) => Ok(game_id),
        Err(e @ SessionError::Corrupt { .. }) => {
            warn!(error = %e, "discarding corrupt session");
            store.clear().await?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// A Gooz game client.
///
/// Owns the connection adapter and a reducer task that is the only writer
/// of [`GameState`]. Observers read snapshots with [`state`](Self::state)
/// or follow every change with [`subscribe`](Self::subscribe).
pub struct GoozClient<K: Connector = WebSocketConnector, C: Codec = JsonCodec> {
    adapter: ConnectionAdapter<K, C>,
    state_rx: watch::Receiver<GameState>,
    local_tx: mpsc::UnboundedSender<LocalEvent>,
    reducer_task: JoinHandle<()>,
    shutdown_timeout: Duration,
}

impl GoozClient<WebSocketConnector> {
    /// Creates a new builder.
    pub fn builder() -> GoozClientBuilder {
        GoozClientBuilder::new()
    }
}

impl<K: Connector, C: Codec> GoozClient<K, C> {
    // ── Connection ─────────────────────────────────────────────────

    /// Starts connecting. A no-op if the link is already active.
    pub fn connect(&self) {
        self.adapter.connect();
    }

    /// Closes the link and stops reconnecting.
    pub async fn disconnect(&self) {
        self.adapter.disconnect().await;
    }

    pub fn is_connected(&self) -> bool {
        self.adapter.is_connected()
    }

    pub fn link_status(&self) -> LinkStatus {
        self.adapter.status()
    }

    pub fn subscribe_link(&self) -> watch::Receiver<LinkStatus> {
        self.adapter.subscribe_status()
    }

    // ── State ──────────────────────────────────────────────────────

    /// A snapshot of the current state.
    pub fn state(&self) -> GameState {
        self.state_rx.borrow().clone()
    }

    /// A receiver that observes every new state.
    pub fn subscribe(&self) -> watch::Receiver<GameState> {
        self.state_rx.clone()
    }

    /// Feeds a UI event to the reducer.
    pub fn dispatch(&self, event: LocalEvent) {
        if self.local_tx.send(event).is_err() {
            warn!("reducer stopped; local event dropped");
        }
    }

    // ── Actions ────────────────────────────────────────────────────

    pub fn create_game(&self, profile: &PlayerProfile) -> Result<(), ActionError> {
        self.act(|state, connected| actions::create_game(state, connected, profile))
    }

    pub fn join_game(&self, game_id: &GameId, profile: &PlayerProfile) -> Result<(), ActionError> {
        self.act(|state, connected| actions::join_game(state, connected, game_id, profile))
    }

    pub fn start_game(&self) -> Result<(), ActionError> {
        self.act(actions::start_game)
    }

    pub fn roll_dice(&self) -> Result<(), ActionError> {
        self.act(actions::roll_dice)
    }

    pub fn buy_property(&self) -> Result<(), ActionError> {
        self.act(actions::buy_property)
    }

    pub fn pass_property(&self) -> Result<(), ActionError> {
        self.act(actions::pass_property)
    }

    pub fn sell_property(&self, block_name: &str) -> Result<(), ActionError> {
        self.act(|state, connected| actions::sell_property(state, connected, block_name))
    }

    pub fn pay_jail_fine(&self) -> Result<(), ActionError> {
        self.act(|state, connected| actions::jail_choice(state, connected, JailChoice::Pay))
    }

    pub fn roll_for_jail(&self) -> Result<(), ActionError> {
        self.act(|state, connected| actions::jail_choice(state, connected, JailChoice::Roll))
    }

    pub fn send_chat(&self, text: &str) -> Result<(), ActionError> {
        self.act(|state, connected| actions::chat(state, connected, text))
    }

    /// Checks preconditions against the current snapshot, then sends.
    fn act(
        &self,
        build: impl FnOnce(&GameState, bool) -> Result<ClientMessage, ActionError>,
    ) -> Result<(), ActionError> {
        let msg = {
            let state = self.state_rx.borrow();
            build(&state, self.adapter.is_connected())
        };
        let msg = msg.inspect_err(|e| debug!(error = %e, "action refused"))?;

        if self.adapter.send(&msg) {
            Ok(())
        } else {
            Err(ActionError::SendRejected)
        }
    }

    // ── Lifecycle ──────────────────────────────────────────────────

    /// Disconnects and stops the reducer task.
    ///
    /// The reducer drains events that already arrived before it exits.
    pub async fn shutdown(self) {
        self.adapter.disconnect().await;

        let Self {
            adapter,
            local_tx,
            mut reducer_task,
            shutdown_timeout,
            ..
        } = self;
        // Dropping both senders ends the reducer loop.
        drop(adapter);
        drop(local_tx);

        if tokio::time::timeout(shutdown_timeout, &mut reducer_task)
            .await
            .is_err()
        {
            warn!("reducer did not stop within timeout; aborting");
            reducer_task.abort();
        }
    }
}

/// The only writer of [`GameState`].
///
/// Applies events in arrival order, publishes each result, and saves the
/// game id whenever it changes. Runs until both event sources close.
async fn run_reducer<S: SessionStore>(
    reducer: Reducer,
    mut state: GameState,
    mut inbound_rx: mpsc::UnboundedReceiver<ServerMessage>,
    mut local_rx: mpsc::UnboundedReceiver<LocalEvent>,
    state_tx: watch::Sender<GameState>,
    store: S,
) {
    debug!("reducer started");

    loop {
        let event = tokio::select! {
            Some(msg) = inbound_rx.recv() => Event::Server(msg),
            Some(local) = local_rx.recv() => Event::Local(local),
            else => break,
        };

        let previous_game = state.game_id.clone();
        state = reducer.reduce(state, &event);

        if state.game_id != previous_game {
            if let Some(game_id) = &state.game_id {
                match store.save_game_id(game_id).await {
                    Ok(()) => debug!(%game_id, "game id saved"),
                    Err(e) => warn!(%game_id, error = %e, "could not save game id"),
                }
            }
        }

        state_tx.send_replace(state.clone());
    }

    debug!("reducer exited");
}
