use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GameError;
use crate::models::room::Room;
use crate::models::settings::Settings;
use crate::services::room_service;
use crate::state::AppState;
use crate::utils::websocket;

pub fn routes(state: AppState) -> Router {
    Router::new()
        // Room creation
        // curl -X POST http://localhost:8080/api/room/create -d '{"hostName":"Alice"}'
        .route("/create", post(create_room))
        // Room document snapshot
        // curl http://localhost:8080/api/room/{code}
        .route("/:code", get(get_room))
        // Join / leave while in the lobby
        .route("/:code/join", post(join_room))
        .route("/:code/leave", post(leave_room))
        // Host-only partial settings update
        .route("/:code/settings", post(update_settings))
        // Subscribe to document changes
        // websocat ws://localhost:8080/api/room/{code}/ws
        .route("/:code/ws", get(websocket::handler))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub host_id: Option<String>,
    pub host_name: String,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub code: String,
    pub room: Room,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub player_id: String,
    #[serde(default)]
    pub name: String,
}

async fn create_room(
    State(state): State<AppState>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<Json<CreateRoomResponse>, GameError> {
    let host_id = req.host_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let room = room_service::create_room(&state, host_id, req.host_name, req.settings).await?;
    Ok(Json(CreateRoomResponse {
        code: room.code.clone(),
        room,
    }))
}

async fn get_room(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Room>, GameError> {
    Ok(Json(room_service::get_room(&state, &code).await?))
}

async fn join_room(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<JoinRequest>,
) -> Result<Json<Room>, GameError> {
    let name = if req.name.is_empty() {
        let tag: String = req.player_id.chars().take(4).collect();
        format!("Player {tag}")
    } else {
        req.name
    };
    Ok(Json(
        room_service::join_room(&state, &code, &req.player_id, &name).await?,
    ))
}

async fn leave_room(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<JoinRequest>,
) -> Result<Json<Room>, GameError> {
    Ok(Json(
        room_service::leave_room(&state, &code, &req.player_id).await?,
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    pub player_id: String,
    pub settings: serde_json::Value,
}

async fn update_settings(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<SettingsRequest>,
) -> Result<Json<Room>, GameError> {
    Ok(Json(
        room_service::update_settings(&state, &code, &req.player_id, req.settings).await?,
    ))
}
