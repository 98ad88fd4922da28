//! Room relay for two-player games.
//!
//! Frames from one client are rebroadcast to the other members of a room
//! without being inspected: the relay holds no game state and trusts
//! nothing it forwards.
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use tracing::{debug, info, warn};

pub type ConnId = u64;

/// Frames queued per connection before further frames to it are dropped.
const OUTBOX_CAPACITY: usize = 64;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ClientFrame {
    JoinRoom {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    PlayerMove {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(flatten)]
        payload: Map<String, Value>,
    },
    ResetGame {
        #[serde(rename = "roomId")]
        room_id: String,
    },
}

#[derive(Default)]
struct Registry {
    members: HashMap<ConnId, Sender<String>>,
    rooms: HashMap<String, HashSet<ConnId>>,
}

#[derive(Default)]
pub struct Relay {
    registry: Mutex<Registry>,
    next_id: AtomicU64,
}

impl Relay {
    /// Adds a connection; frames addressed to it arrive on the receiver.
    pub fn register(&self) -> (ConnId, Receiver<String>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(OUTBOX_CAPACITY);
        self.registry.lock().members.insert(id, tx);
        (id, rx)
    }

    pub fn join(&self, id: ConnId, room: &str) {
        self.registry
            .lock()
            .rooms
            .entry(room.to_string())
            .or_default()
            .insert(id);
        info!(id, room, "joined room");
    }

    /// Sends `frame` to every member of `room`, skipping `from` unless
    /// `include_sender` is set. A member whose outbox is full misses the
    /// frame. Returns the number of recipients.
    pub fn broadcast(&self, from: ConnId, room: &str, frame: &str, include_sender: bool) -> usize {
        let registry = self.registry.lock();
        let Some(members) = registry.rooms.get(room) else {
            return 0;
        };
        let mut sent = 0;
        for member in members {
            if *member == from && !include_sender {
                continue;
            }
            if let Some(tx) = registry.members.get(member) {
                match tx.try_send(frame.to_string()) {
                    Ok(()) => sent += 1,
                    Err(TrySendError::Full(_)) => {
                        warn!(id = *member, room, "outbox full, dropping frame");
                    }
                    Err(TrySendError::Closed(_)) => {}
                }
            }
        }
        sent
    }

    /// Drops the connection from every room, removing rooms left empty.
    pub fn disconnect(&self, id: ConnId) {
        let mut registry = self.registry.lock();
        registry.members.remove(&id);
        registry.rooms.retain(|_, members| {
            members.remove(&id);
            !members.is_empty()
        });
    }

    #[cfg(test)]
    fn room_count(&self) -> usize {
        self.registry.lock().rooms.len()
    }

    pub fn handle_frame(&self, id: ConnId, text: &str) -> Result<(), serde_json::Error> {
        match serde_json::from_str::<ClientFrame>(text)? {
            ClientFrame::JoinRoom { room_id } => self.join(id, &room_id),
            ClientFrame::PlayerMove {
                room_id,
                mut payload,
            } => {
                payload.insert("type".to_string(), Value::from("updateGame"));
                let frame = Value::Object(payload).to_string();
                let sent = self.broadcast(id, &room_id, &frame, false);
                debug!(id, room = %room_id, sent, "relayed move");
            }
            ClientFrame::ResetGame { room_id } => {
                let frame = json!({ "type": "gameReset" }).to_string();
                let sent = self.broadcast(id, &room_id, &frame, true);
                debug!(id, room = %room_id, sent, "relayed reset");
            }
        }
        Ok(())
    }
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(relay): State<Arc<Relay>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_socket(socket, relay))
}

async fn serve_socket(mut socket: WebSocket, relay: Arc<Relay>) {
    let (id, mut outbox) = relay.register();
    info!(id, "client connected");
    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if let Err(err) = relay.handle_frame(id, &text) {
                        warn!(id, %err, "ignoring malformed frame");
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    debug!(id, %err, "socket error");
                    break;
                }
            },
            Some(frame) = outbox.recv() => {
                if socket.send(Message::Text(frame)).await.is_err() {
                    break;
                }
            }
        }
    }
    relay.disconnect(id);
    info!(id, "client disconnected");
}
