//! WebSocket transport for the client.
//!
//! Provides [`ConnectedClient`] which carries text frames over one WebSocket
//! connection. This is a thin layer that only moves strings; protocol logic
//! remains in the Sans-IO [`Session`](crate::Session).

use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Message, protocol::CloseFrame},
};

use crate::SessionEvent;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Something the connection task observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Text frame from the server.
    Frame(String),
    /// Connection ended. Sent once, last.
    Closed {
        /// Close reason, or the error that ended the connection.
        reason: String,
    },
}

impl<I> From<TransportEvent> for SessionEvent<I> {
    fn from(event: TransportEvent) -> Self {
        match event {
            TransportEvent::Frame(raw) => SessionEvent::FrameReceived(raw),
            TransportEvent::Closed { reason } => SessionEvent::Closed { reason },
        }
    }
}

/// Handle to a connected client with WebSocket transport.
///
/// Frames are sent and received via the channels, and an internal task
/// handles the socket I/O. Dropping `to_server` closes the socket politely.
pub struct ConnectedClient {
    /// Send text frames to the server.
    pub to_server: mpsc::Sender<String>,
    /// Receive frames and the final close from the server.
    pub from_server: mpsc::Receiver<TransportEvent>,
    /// Abort handle to stop the connection task.
    abort_handle: tokio::task::AbortHandle,
}

impl ConnectedClient {
    /// Stop the connection.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Connect to a Pipechat server.
///
/// `url` is a `ws://` or `wss://` URL.
pub async fn connect(url: &str) -> Result<ConnectedClient, TransportError> {
    let (socket, _response) =
        connect_async(url).await.map_err(|e| TransportError::Connection(e.to_string()))?;
    tracing::info!(url, "websocket connected");

    let (to_server_tx, to_server_rx) = mpsc::channel::<String>(32);
    let (from_server_tx, from_server_rx) = mpsc::channel::<TransportEvent>(64);

    let handle = tokio::spawn(run_connection(socket, to_server_rx, from_server_tx));

    Ok(ConnectedClient {
        to_server: to_server_tx,
        from_server: from_server_rx,
        abort_handle: handle.abort_handle(),
    })
}

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Run the connection, bridging between channels and the socket.
async fn run_connection(
    socket: Socket,
    mut to_server: mpsc::Receiver<String>,
    from_server: mpsc::Sender<TransportEvent>,
) {
    let (mut writer, mut reader) = socket.split();

    let reason = loop {
        tokio::select! {
            outgoing = to_server.recv() => {
                let Some(frame) = outgoing else {
                    // Every sender dropped: the caller is done.
                    let _ = writer.send(Message::Close(None)).await;
                    break "closed by client".to_string();
                };
                tracing::trace!(%frame, "send");
                if let Err(e) = writer.send(Message::Text(frame)).await {
                    break format!("send failed: {e}");
                }
            },
            incoming = reader.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if from_server.send(TransportEvent::Frame(text)).await.is_err() {
                        return;
                    }
                },
                Some(Ok(Message::Close(frame))) => break close_reason(frame),
                // Pings are answered by tungstenite; binary frames are not part
                // of the protocol.
                Some(Ok(_)) => {},
                Some(Err(e)) => break e.to_string(),
                None => break String::new(),
            },
        }
    };

    tracing::info!(%reason, "websocket closed");
    let _ = from_server.send(TransportEvent::Closed { reason }).await;
}

fn close_reason(frame: Option<CloseFrame<'_>>) -> String {
    frame.map(|f| f.reason.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_events_map_to_session_events() {
        let frame: SessionEvent<std::time::Duration> = TransportEvent::Frame("SYS|hi".into()).into();
        assert!(matches!(frame, SessionEvent::FrameReceived(raw) if raw == "SYS|hi"));

        let closed: SessionEvent<std::time::Duration> =
            TransportEvent::Closed { reason: "bye".into() }.into();
        assert!(matches!(closed, SessionEvent::Closed { reason } if reason == "bye"));
    }
}
