//! WebSocket client transport using `tokio-tungstenite`.

use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::{Connection, ConnectionId, Connector, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A [`Connector`] that dials one `ws://` or `wss://` URL.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    url: String,
}

impl WebSocketConnector {
    /// Creates a connector for the given URL. Nothing is dialed yet.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Connector for WebSocketConnector {
    type Connection = WebSocketConnection;

    async fn connect(&self) -> Result<Self::Connection, TransportError> {
        let (ws, _response) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| TransportError::ConnectFailed {
                url: self.url.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                ),
            })?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, url = %self.url, "WebSocket connected");

        // Split so a pending `recv` never blocks a `send`.
        let (sink, stream) = ws.split();
        Ok(WebSocketConnection {
            id,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        })
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// A single client-side WebSocket connection.
pub struct WebSocketConnection {
    id: ConnectionId,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl Connection for WebSocketConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let text = std::str::from_utf8(data).map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e,
            ))
        })?;
        let msg = Message::Text(text.to_owned().into());
        self.sink.lock().await.send(msg).await.map_err(|e| match e {
            WsError::ConnectionClosed
            | WsError::AlreadyClosed
            | WsError::Protocol(ProtocolError::SendAfterClosing) => {
                TransportError::ConnectionClosed(format!("{} already closed", self.id))
            }
            e => TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            )),
        })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong/raw frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.sink.lock().await.close().await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
