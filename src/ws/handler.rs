//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use std::fmt;

use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::game::{Outbound, SessionInput};
use crate::replication::ConnectionId;
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::util::time::unix_millis;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let connection = ConnectionId::new_v4();
    debug!(connection = %connection, "WebSocket upgrade");
    ws.on_upgrade(move |socket| handle_socket(socket, connection, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, connection: ConnectionId, state: AppState) {
    info!(connection = %connection, "New WebSocket connection");

    let (ws_sink, ws_stream) = socket.split();

    // Subscribe before announcing so the welcome cannot be missed
    let outbound_rx = state.session.subscribe();
    let input_tx = state.session.input_tx.clone();

    if input_tx
        .send(SessionInput::Connected { connection })
        .await
        .is_err()
    {
        error!(connection = %connection, "Session is not running");
        return;
    }

    run_connection(connection, ws_sink, ws_stream, input_tx.clone(), outbound_rx).await;

    let _ = input_tx
        .send(SessionInput::Disconnected { connection })
        .await;

    info!(connection = %connection, "WebSocket connection closed");
}

/// Pump messages both ways until either side goes away.
/// Returns as soon as the writer stops, even if the client stays silent.
async fn run_connection<S, R, E>(
    connection: ConnectionId,
    ws_sink: S,
    ws_stream: R,
    input_tx: mpsc::Sender<SessionInput>,
    outbound_rx: broadcast::Receiver<Outbound>,
) where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: fmt::Display + Send,
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: fmt::Display,
{
    let mut writer_handle = tokio::spawn(write_outbound(connection, ws_sink, outbound_rx));

    tokio::select! {
        _ = &mut writer_handle => {
            debug!(connection = %connection, "Writer stopped, closing connection");
        }
        _ = read_inbound(connection, ws_stream, input_tx) => {}
    }

    writer_handle.abort();
}

/// Session fan-out -> WebSocket, filtered to this connection
async fn write_outbound<S>(
    connection: ConnectionId,
    mut ws_sink: S,
    mut outbound_rx: broadcast::Receiver<Outbound>,
) where
    S: Sink<Message> + Unpin,
    S::Error: fmt::Display,
{
    loop {
        match outbound_rx.recv().await {
            Ok(outbound) => {
                if !outbound.to.includes(connection) {
                    continue;
                }
                if let Err(e) = send_msg(&mut ws_sink, &outbound.msg).await {
                    debug!(connection = %connection, error = %e, "WebSocket send failed");
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                // Dropped replication cannot be recovered by the client
                warn!(connection = %connection, lagged_count = n, "Client lagged, closing");
                break;
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!(connection = %connection, "Outbound channel closed");
                break;
            }
        }
    }
    let _ = ws_sink.close().await;
}

/// WebSocket -> session
async fn read_inbound<R, E>(
    connection: ConnectionId,
    mut ws_stream: R,
    input_tx: mpsc::Sender<SessionInput>,
) where
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: fmt::Display,
{
    let rate_limiter = ConnectionRateLimiter::new();

    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_request() {
                    warn!(connection = %connection, "Rate limited client message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(msg) => {
                        let input = SessionInput::Message {
                            connection,
                            msg,
                            received_at: unix_millis(),
                        };
                        if input_tx.send(input).await.is_err() {
                            debug!(connection = %connection, "Input channel closed");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(connection = %connection, error = %e, "Failed to parse client message");
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(connection = %connection, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(connection = %connection, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(connection = %connection, error = %e, "WebSocket error");
                break;
            }
        }
    }
}

/// Send a message over WebSocket
async fn send_msg<S>(sink: &mut S, msg: &ServerMsg) -> Result<(), String>
where
    S: Sink<Message> + Unpin,
    S::Error: fmt::Display,
{
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
