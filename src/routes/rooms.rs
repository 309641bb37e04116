use crate::{models::RoomSnapshot, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct RoomListResponse {
    pub rooms: Vec<RoomSnapshot>,
}

/// List all open rooms
pub async fn list_rooms(State(state): State<Arc<AppState>>) -> Json<RoomListResponse> {
    Json(RoomListResponse {
        rooms: state.rooms.list(),
    })
}

/// Look up a single room by its code
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomSnapshot>, StatusCode> {
    state.rooms.snapshot(&room_id).map(Json).ok_or_else(|| {
        tracing::debug!("Room {} not found", room_id);
        StatusCode::NOT_FOUND
    })
}
