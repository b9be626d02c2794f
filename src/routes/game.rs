use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::engine::analytics::PostGameStats;
use crate::error::GameError;
use crate::models::night::NightActionRequest;
use crate::models::room::Room;
use crate::models::vote::VoteChoice;
use crate::services::game_service::{self, NightActionResponse};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRequest {
    pub player_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub player_id: String,
    pub choice: VoteChoice,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HunterRequest {
    pub player_id: String,
    pub target: Option<String>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .nest(
            "/:code",
            Router::new()
                // Game lifecycle
                .route("/start", post(start_game_handler))
                .route("/ready", post(mark_ready_handler))
                .route("/reset", post(reset_handler))
                // Player actions
                .route("/night-action", post(night_action_handler))
                .route("/vote", post(cast_vote_handler))
                .route("/hunter", post(hunter_handler))
                // Level-triggered phase advancement
                .route("/advance", post(advance_handler))
                // Post-game voting statistics
                .route("/analytics", get(analytics_handler)),
        )
        .with_state(state)
}

async fn start_game_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<Room>, GameError> {
    Ok(Json(
        game_service::start_game(&state, &code, &req.player_id).await?,
    ))
}

async fn mark_ready_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<Room>, GameError> {
    Ok(Json(
        game_service::mark_ready(&state, &code, &req.player_id).await?,
    ))
}

async fn night_action_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<NightActionRequest>,
) -> Result<Json<NightActionResponse>, GameError> {
    Ok(Json(
        game_service::submit_night_action(&state, &code, &req).await?,
    ))
}

async fn cast_vote_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<Room>, GameError> {
    Ok(Json(
        game_service::submit_vote(&state, &code, &req.player_id, req.choice).await?,
    ))
}

async fn hunter_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<HunterRequest>,
) -> Result<Json<Room>, GameError> {
    Ok(Json(
        game_service::submit_hunter_target(&state, &code, &req.player_id, req.target.as_deref())
            .await?,
    ))
}

async fn advance_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<Room>, GameError> {
    Ok(Json(
        game_service::advance(&state, &code, &req.player_id).await?,
    ))
}

async fn reset_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<Room>, GameError> {
    Ok(Json(
        game_service::reset_room(&state, &code, &req.player_id).await?,
    ))
}

async fn analytics_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<PostGameStats>, GameError> {
    Ok(Json(game_service::post_game_stats(&state, &code).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::Settings;
    use crate::services::room_service;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn post(app: Router, uri: &str, body: String) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_start_game() {
        let state = AppState::new();
        let app = routes(state.clone());
        let room = room_service::create_room(
            &state,
            "host".into(),
            "Alice".into(),
            Settings::default(),
        )
        .await
        .unwrap();
        for i in 1..4 {
            room_service::join_room(&state, &room.code, &format!("p{i}"), "x")
                .await
                .unwrap();
        }

        let status = post(
            app,
            &format!("/{}/start", room.code),
            r#"{"playerId":"host"}"#.to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_start_game_without_host_is_forbidden() {
        let state = AppState::new();
        let app = routes(state.clone());
        let room = room_service::create_room(
            &state,
            "host".into(),
            "Alice".into(),
            Settings::default(),
        )
        .await
        .unwrap();

        let status = post(
            app,
            &format!("/{}/start", room.code),
            r#"{"playerId":"mallory"}"#.to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_vote_outside_day_phase_is_rejected() {
        let state = AppState::new();
        let app = routes(state.clone());
        let room = room_service::create_room(
            &state,
            "host".into(),
            "Alice".into(),
            Settings::default(),
        )
        .await
        .unwrap();

        let status = post(
            app,
            &format!("/{}/vote", room.code),
            r#"{"playerId":"host","choice":{"kind":"skip"}}"#.to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
