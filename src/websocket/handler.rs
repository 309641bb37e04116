use crate::{
    identity::{sanitize_username, PlayerIdentity},
    rooms::{RoomError, RoomPlayer},
    websocket::messages::{ClientMessage, ServerMessage},
    AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// WebSocket upgrade handler
pub async fn handle_websocket(
    identity: PlayerIdentity,
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::info!(
        "WebSocket upgrade for player: {} ({})",
        identity.username,
        identity.player_id
    );
    ws.on_upgrade(move |socket| handle_socket(socket, state, identity))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, identity: PlayerIdentity) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(state.config.server.channel_capacity);
    let player_id = identity.player_id;

    tracing::info!(
        "WebSocket connection established for player: {} ({})",
        identity.username,
        player_id
    );

    // Spawn a task to send messages to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                }
            }
        }
    });

    // Handle incoming messages from the client
    let state_for_recv = state.clone();
    let mut recv_task = tokio::spawn(async move {
        let mut identity = identity;
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        if let Err(e) =
                            handle_client_message(client_msg, &state_for_recv, &tx, &mut identity)
                                .await
                        {
                            tracing::warn!("Error handling message: {}", e);
                            let error_msg = ServerMessage::Error {
                                message: e.to_string(),
                            };
                            let _ = tx.send(error_msg).await;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse message: {}", e);
                        let error_msg = ServerMessage::Error {
                            message: format!("Invalid message format: {}", e),
                        };
                        let _ = tx.send(error_msg).await;
                    }
                },
                Message::Close(_) => {
                    tracing::info!(
                        "Client disconnected: {} ({})",
                        identity.username,
                        identity.player_id
                    );
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    // Tell the opponents in every room this player sat in
    for (room_id, player) in state.rooms.disconnect(player_id) {
        broadcast_to_room(
            &state,
            &room_id,
            Some(player_id),
            ServerMessage::PlayerDisconnected { player },
        )
        .await;
    }

    tracing::info!("WebSocket connection closed for player {}", player_id);
}

/// Send a message to every connected member of a room, optionally skipping one player
pub async fn broadcast_to_room(
    state: &AppState,
    room_id: &str,
    except: Option<Uuid>,
    message: ServerMessage,
) {
    for tx in state.rooms.recipients(room_id, except) {
        let _ = tx.send(message.clone()).await;
    }
}

/// Handle individual client messages
async fn handle_client_message(
    msg: ClientMessage,
    state: &AppState,
    tx: &mpsc::Sender<ServerMessage>,
    identity: &mut PlayerIdentity,
) -> anyhow::Result<()> {
    match msg {
        ClientMessage::Username { username } => {
            identity.username = sanitize_username(&username);
            state
                .rooms
                .rename_player(identity.player_id, &identity.username);
            tracing::info!(
                "Player {} is now known as {}",
                identity.player_id,
                identity.username
            );
        }
        ClientMessage::CreateRoom => {
            let player = RoomPlayer::new(identity.player_id, &identity.username, tx.clone());
            let room_id = state.rooms.create_room(player);
            tracing::info!(
                "Player {} ({}) created room {}",
                identity.username,
                identity.player_id,
                room_id
            );
            tx.send(ServerMessage::RoomCreated { room_id }).await?;
        }
        ClientMessage::JoinRoom { room_id } => {
            let player = RoomPlayer::new(identity.player_id, &identity.username, tx.clone());
            match state.rooms.join_room(&room_id, player) {
                Ok(snapshot) => {
                    tracing::info!(
                        "Player {} ({}) joined room {}",
                        identity.username,
                        identity.player_id,
                        snapshot.room_id
                    );
                    tx.send(ServerMessage::RoomJoined {
                        room_id: snapshot.room_id.clone(),
                        players: snapshot.players.clone(),
                    })
                    .await?;
                    broadcast_to_room(
                        state,
                        &snapshot.room_id,
                        Some(identity.player_id),
                        ServerMessage::OpponentJoined {
                            room_id: snapshot.room_id.clone(),
                            players: snapshot.players,
                        },
                    )
                    .await;
                }
                Err(e) => {
                    tracing::info!(
                        "Player {} ({}) could not join room {}: {}",
                        identity.username,
                        identity.player_id,
                        room_id,
                        e
                    );
                    tx.send(ServerMessage::JoinError {
                        message: e.to_string(),
                    })
                    .await?;
                }
            }
        }
        ClientMessage::Move { room, mv } => {
            if !state.rooms.is_member(&room, identity.player_id) {
                return Err(RoomError::NotMember(room).into());
            }
            tracing::debug!(
                "Relaying move {}{} from {} in room {}",
                mv.from,
                mv.to,
                identity.player_id,
                room
            );
            broadcast_to_room(
                state,
                &room,
                Some(identity.player_id),
                ServerMessage::Move { mv },
            )
            .await;
        }
        ClientMessage::CloseRoom { room_id } => {
            let Some(snapshot) = state.rooms.snapshot(&room_id) else {
                // Both players close after a finished game; the second finds nothing
                tracing::debug!("Room {} already closed", room_id);
                return Ok(());
            };
            if !snapshot.players.iter().any(|p| p.id == identity.player_id) {
                return Err(RoomError::NotMember(room_id).into());
            }

            // Remove first so members never see a room that is being closed
            let Some(room) = state.rooms.close_room(&snapshot.room_id) else {
                return Ok(());
            };
            let message = ServerMessage::CloseRoom {
                room_id: room.room_id.clone(),
            };
            for player in room.players.iter().filter(|p| p.is_connected()) {
                let _ = player.tx.send(message.clone()).await;
            }
            tracing::info!(
                "Player {} ({}) closed room {}",
                identity.username,
                identity.player_id,
                room.room_id
            );
        }
    }

    Ok(())
}
