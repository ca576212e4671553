//! The reconnecting connection adapter.
//!
//! [`ConnectionAdapter`] owns one logical link to the game server. Calling
//! [`connect`](ConnectionAdapter::connect) spawns a supervisor task that
//! dials, runs the connection until it drops, then waits out the reconnect
//! schedule and dials again. The handle talks to the supervisor through
//! channels:
//!
//! ```text
//! send() ──mpsc──▶ ┌────────────┐ ──frames──▶ server
//!                  │ supervisor │
//! inbound ◀──mpsc─ └────────────┘ ◀─frames── server
//!                        │
//!                  watch<LinkStatus>
//! ```

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use gooz_protocol::{ClientMessage, Codec, JsonCodec, ServerMessage, Tag};
use gooz_reconnect::{ReconnectConfig, ReconnectSchedule};
use gooz_transport::{Connection, Connector};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_SHUTDOWN_TIMEOUT;

/// Where the link to the server stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// No supervisor is running. Either `connect` was never called,
    /// `disconnect` was, or reconnect attempts ran out.
    Disconnected,
    /// A dial is in flight.
    Connecting,
    /// Frames flow in both directions.
    Open,
    /// The last connection dropped (or the dial failed) and a retry is
    /// scheduled.
    ClosedPendingRetry,
}

/// Handle to the running supervisor.
struct Supervisor {
    outbound_tx: mpsc::UnboundedSender<Vec<u8>>,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// One reconnecting link to the game server.
///
/// Decoded server messages are delivered on the receiver returned by
/// [`new`](Self::new), in arrival order, across reconnects.
pub struct ConnectionAdapter<K: Connector, C: Codec = JsonCodec> {
    connector: Arc<K>,
    codec: Arc<C>,
    reconnect: ReconnectConfig,
    shutdown_timeout: Duration,
    status: Arc<watch::Sender<LinkStatus>>,
    inbound_tx: mpsc::UnboundedSender<ServerMessage>,
    supervisor: Mutex<Option<Supervisor>>,
}

impl<K: Connector> ConnectionAdapter<K, JsonCodec> {
    /// Creates an adapter with the JSON codec, the default reconnect
    /// schedule and the default shutdown timeout.
    pub fn with_defaults(connector: K) -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        Self::new(
            connector,
            JsonCodec,
            ReconnectConfig::default(),
            DEFAULT_SHUTDOWN_TIMEOUT,
        )
    }
}

impl<K: Connector, C: Codec> ConnectionAdapter<K, C> {
    /// Creates an idle adapter. Nothing is dialed until
    /// [`connect`](Self::connect).
    pub fn new(
        connector: K,
        codec: C,
        reconnect: ReconnectConfig,
        shutdown_timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (status, _) = watch::channel(LinkStatus::Disconnected);

        let adapter = Self {
            connector: Arc::new(connector),
            codec: Arc::new(codec),
            reconnect,
            shutdown_timeout,
            status: Arc::new(status),
            inbound_tx,
            supervisor: Mutex::new(None),
        };
        (adapter, inbound_rx)
    }

    /// Starts the supervisor if none is running.
    ///
    /// A no-op while `Connecting`, `Open`, or `ClosedPendingRetry`: the
    /// running supervisor already owns the link.
    pub fn connect(&self) {
        let mut slot = self.lock_supervisor();

        if slot.is_some() && self.status() != LinkStatus::Disconnected {
            debug!(status = ?self.status(), "connect ignored, link already active");
            return;
        }
        // A supervisor that gave up leaves a finished task behind.
        if let Some(stale) = slot.take() {
            stale.task.abort();
        }

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        // Set before spawning so a second connect() sees the link as active.
        self.status.send_replace(LinkStatus::Connecting);

        let task = tokio::spawn(supervise(
            Arc::clone(&self.connector),
            Arc::clone(&self.codec),
            ReconnectSchedule::new(self.reconnect.clone()),
            Arc::clone(&self.status),
            self.inbound_tx.clone(),
            outbound_rx,
            shutdown_rx,
        ));

        *slot = Some(Supervisor {
            outbound_tx,
            shutdown_tx,
            task,
        });
    }

    /// Encodes `msg` and queues it on the open connection.
    ///
    /// Returns `false`, and logs why, if the link is not open or the
    /// message cannot be encoded. Nothing is queued for a later
    /// connection and nothing is retried.
    pub fn send(&self, msg: &ClientMessage) -> bool {
        let status = self.status();
        if status != LinkStatus::Open {
            warn!(tag = msg.kind(), ?status, "send dropped, link not open");
            return false;
        }

        let bytes = match self.codec.encode(msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(tag = msg.kind(), error = %e, "send dropped, encode failed");
                return false;
            }
        };

        let slot = self.lock_supervisor();
        let Some(supervisor) = slot.as_ref() else {
            warn!(tag = msg.kind(), "send dropped, no supervisor");
            return false;
        };
        if supervisor.outbound_tx.send(bytes).is_err() {
            warn!(tag = msg.kind(), "send dropped, supervisor gone");
            return false;
        }
        debug!(tag = msg.kind(), "message queued");
        true
    }

    /// Stops the supervisor: cancels a pending retry, closes an open
    /// connection, and sets the status to `Disconnected`.
    ///
    /// The graceful close is bounded by the shutdown timeout; after that
    /// the task is aborted.
    pub async fn disconnect(&self) {
        let supervisor = self.lock_supervisor().take();

        if let Some(Supervisor {
            shutdown_tx,
            mut task,
            ..
        }) = supervisor
        {
            debug!("disconnect requested");
            let _ = shutdown_tx.send(());

            match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    warn!(error = %join_err, "supervisor ended with join error");
                }
                Err(_) => {
                    warn!("supervisor did not stop within timeout; aborting");
                    task.abort();
                    if let Err(join_err) = task.await {
                        debug!(error = %join_err, "supervisor aborted");
                    }
                }
            }
        }

        self.status.send_replace(LinkStatus::Disconnected);
    }

    /// `true` while frames can be sent.
    pub fn is_connected(&self) -> bool {
        self.status() == LinkStatus::Open
    }

    /// The current link status.
    pub fn status(&self) -> LinkStatus {
        *self.status.borrow()
    }

    /// A receiver that observes every status change.
    pub fn subscribe_status(&self) -> watch::Receiver<LinkStatus> {
        self.status.subscribe()
    }

    /// The endpoint this adapter dials.
    pub fn endpoint(&self) -> &str {
        self.connector.endpoint()
    }

    fn lock_supervisor(&self) -> MutexGuard<'_, Option<Supervisor>> {
        // The slot is a plain Option; a poisoned lock still holds a usable value.
        self.supervisor
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<K: Connector, C: Codec> Drop for ConnectionAdapter<K, C> {
    fn drop(&mut self) {
        // Drop cannot await a graceful close; aborting is all that is left.
        if let Some(supervisor) = self.lock_supervisor().take() {
            supervisor.task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Supervisor task
// ---------------------------------------------------------------------------

/// Why the io loop returned.
enum LoopExit {
    /// `disconnect` was called or the adapter was dropped.
    Shutdown,
    /// The connection failed or the server closed it.
    Lost,
}

/// Dial, run, wait, repeat. Exits on shutdown or when the schedule runs
/// out of attempts.
async fn supervise<K: Connector, C: Codec>(
    connector: Arc<K>,
    codec: Arc<C>,
    mut schedule: ReconnectSchedule,
    status: Arc<watch::Sender<LinkStatus>>,
    inbound: mpsc::UnboundedSender<ServerMessage>,
    mut outbound_rx: mpsc::UnboundedReceiver<Vec<u8>>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let endpoint = connector.endpoint().to_owned();
    debug!(%endpoint, "supervisor started");

    loop {
        status.send_replace(LinkStatus::Connecting);

        let dialed = tokio::select! {
            result = connector.connect() => result,
            _ = &mut shutdown_rx => break,
        };

        match dialed {
            Ok(conn) => {
                let conn_id = conn.id();
                info!(%conn_id, %endpoint, "connected");
                schedule.reset();

                // Anything queued for the previous connection is stale.
                while outbound_rx.try_recv().is_ok() {}
                status.send_replace(LinkStatus::Open);

                let exit =
                    run_connection(&conn, codec.as_ref(), &inbound, &mut outbound_rx, &mut shutdown_rx)
                        .await;
                if let LoopExit::Shutdown = exit {
                    if let Err(e) = conn.close().await {
                        debug!(%conn_id, error = %e, "close failed");
                    }
                    info!(%conn_id, "disconnected");
                    break;
                }
            }
            Err(e) => {
                warn!(%endpoint, error = %e, "dial failed");
            }
        }

        status.send_replace(LinkStatus::ClosedPendingRetry);

        tokio::select! {
            retry = schedule.wait_for_retry() => match retry {
                Some(info) => {
                    info!(attempt = info.attempt, delay_ms = info.delay.as_millis() as u64, "reconnecting");
                }
                None => {
                    warn!(%endpoint, attempts = schedule.attempts(), "giving up on reconnect");
                    break;
                }
            },
            _ = &mut shutdown_rx => break,
        }
    }

    status.send_replace(LinkStatus::Disconnected);
    debug!(%endpoint, "supervisor exited");
}

/// Moves frames until the connection drops or shutdown is requested.
async fn run_connection<T: Connection, C: Codec>(
    conn: &T,
    codec: &C,
    inbound: &mpsc::UnboundedSender<ServerMessage>,
    outbound_rx: &mut mpsc::UnboundedReceiver<Vec<u8>>,
    shutdown_rx: &mut oneshot::Receiver<()>,
) -> LoopExit {
    let conn_id = conn.id();

    loop {
        tokio::select! {
            outgoing = outbound_rx.recv() => match outgoing {
                Some(bytes) => {
                    if let Err(e) = conn.send(&bytes).await {
                        warn!(%conn_id, error = %e, "send failed");
                        return LoopExit::Lost;
                    }
                }
                // Adapter dropped.
                None => return LoopExit::Shutdown,
            },

            _ = &mut *shutdown_rx => return LoopExit::Shutdown,

            incoming = conn.recv() => match incoming {
                Ok(Some(data)) => deliver(codec, &data, inbound),
                Ok(None) => {
                    info!(%conn_id, "connection closed by server");
                    return LoopExit::Lost;
                }
                Err(e) => {
                    warn!(%conn_id, error = %e, "receive failed");
                    return LoopExit::Lost;
                }
            },
        }
    }
}

/// Decodes one frame and forwards it. Malformed frames are dropped.
fn deliver<C: Codec>(codec: &C, data: &[u8], inbound: &mpsc::UnboundedSender<ServerMessage>) {
    let msg: ServerMessage = match codec.decode(data) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(error = %e, raw = %String::from_utf8_lossy(data), "malformed frame dropped");
            return;
        }
    };

    if let ServerMessage::Unrecognized = msg {
        let tag = codec
            .decode::<Tag>(data)
            .map(|t| t.kind)
            .unwrap_or_default();
        warn!(%tag, "unrecognized message type");
    }

    if inbound.send(msg).is_err() {
        debug!("inbound receiver dropped; message discarded");
    }
}
