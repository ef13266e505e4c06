//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::ConnectionId,
    infrastructure::dto::{conversion::ClientCommand, websocket::ClientMessage},
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// Outbound flow: everything the MessagePusher queues for this connection is
/// written to the socket in queue order.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    // Register the connection; the `connected` greeting is queued on tx
    let (tx, rx) = mpsc::unbounded_channel();
    let connection_id = state.connection_usecase.register(tx).await;

    let mut send_task = pusher_loop(rx, sender);

    let state_clone = state.clone();
    let connection_id_clone = connection_id.clone();

    // Frames from one connection are handled strictly in arrival order
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id_clone, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    dispatch(&state_clone, &connection_id_clone, text.as_str()).await;
                }
                Message::Binary(data) => {
                    tracing::debug!(
                        "Ignoring binary frame ({} bytes) from '{}'",
                        data.len(),
                        connection_id_clone
                    );
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id_clone);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other.
    // The receive task must be fully stopped before deregistering so that no
    // in-flight dispatch can run after the connection has left its room.
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => {
            recv_task.abort();
            let _ = (&mut recv_task).await;
        }
    };

    // Disconnect is handled exactly like an explicit leave
    if let Some(member) = state.connection_usecase.deregister(&connection_id).await {
        tracing::info!(
            "Connection '{}' dropped; '{}' removed from its room",
            connection_id,
            member.participant.name
        );
    }
}

/// Parse, validate and route one text frame.
///
/// Malformed frames and rejected events are dropped; nothing is reported back
/// to the sender.
async fn dispatch(state: &AppState, connection_id: &ConnectionId, text: &str) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Dropping unparsable frame from '{}': {}", connection_id, e);
            return;
        }
    };

    let command = match ClientCommand::try_from(message) {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!("Dropping malformed payload from '{}': {}", connection_id, e);
            return;
        }
    };

    match command {
        ClientCommand::Join {
            project_id,
            participant,
        } => {
            if let Err(e) = state
                .presence_usecase
                .join(project_id, participant, connection_id.clone())
                .await
            {
                tracing::warn!("Join from '{}' rejected: {}", connection_id, e);
            }
        }
        ClientCommand::Leave { project_id } => {
            state
                .presence_usecase
                .leave(&project_id, connection_id)
                .await;
        }
        ClientCommand::Event { project_id, event } => {
            if let Err(e) = state
                .route_event_usecase
                .execute(connection_id, &project_id, event)
                .await
            {
                tracing::warn!("Dropping event from '{}': {}", connection_id, e);
            }
        }
    }
}
