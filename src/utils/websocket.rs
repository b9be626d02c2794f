use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tracing::info;

use crate::state::AppState;
use crate::store::DocumentStore;

/// Subscribe-on-change: every committed update of the room document is pushed
/// to the socket as one JSON snapshot.
pub async fn handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, code))
}

async fn handle_socket(ws: WebSocket, state: AppState, code: String) {
    let Some(mut rx) = state.store.subscribe(&code).await else {
        info!("websocket subscriber rejected, unknown room {}", code);
        return;
    };
    info!("websocket subscriber attached to room {}", code);
    let (mut sender, mut receiver) = ws.split();

    // Send the current snapshot first so a late subscriber is not blank
    // until the next mutation.
    if let Some(room) = state.store.read(&code).await {
        if let Ok(text) = serde_json::to_string(&room) {
            let _ = sender.send(Message::Text(text)).await;
        }
    }

    let mut send_task = tokio::spawn(async move {
        while let Ok(room) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&room) else {
                continue;
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Clients only listen on this socket; intents arrive over HTTP. Drain
    // until the peer hangs up.
    let mut receive_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => receive_task.abort(),
        _ = &mut receive_task => send_task.abort(),
    }
    info!("websocket subscriber left room {}", code);
}
