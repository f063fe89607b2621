//! Flash Connection Handler
//!
//! Upgrades `GET /flash` to a WebSocket, hands the write half to the hub and
//! keeps draining the read half until the client leaves or the hub lets go.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::StreamExt;

use super::hub::BroadcastHub;
use super::subscriber::{Subscriber, WsSink};
use crate::startup::AppState;

/// WebSocket upgrade handler for the flash feed
pub async fn flash_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let max_message_size = state.settings.flash.max_message_size;
    let hub = state.hub.clone();

    ws.max_message_size(max_message_size)
        .max_frame_size(max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Serve one flash subscriber.
///
/// The subscriber is removed exactly once: by this loop when the client
/// closes or errors, or by the hub after a failed write (in which case the
/// release signal fires and this loop just returns).
async fn handle_socket(socket: WebSocket, hub: BroadcastHub) {
    let (sink, mut stream) = socket.split();
    let (subscriber, mut released) = Subscriber::new(WsSink::new(sink));
    let id = subscriber.id();

    if !hub.register(subscriber).await {
        return;
    }

    loop {
        tokio::select! {
            _ = &mut released => {
                tracing::debug!(subscriber_id = %id, "Flash subscriber released by hub");
                return;
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Close(_))) | None => break,
                // Subscribers are listen-only; inbound frames are ignored.
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    tracing::debug!(subscriber_id = %id, error = %e, "Flash read error");
                    break;
                }
            }
        }
    }

    hub.unregister(id).await;
}
