use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::engine::phase;
use crate::error::GameError;
use crate::models::player::{Player, AVATAR_COLORS};
use crate::models::room::{Phase, Room};
use crate::models::settings::Settings;
use crate::state::AppState;
use crate::store::DocumentStore;
use crate::utils::room_code;

pub async fn create_room(
    state: &AppState,
    host_id: String,
    host_name: String,
    settings: Settings,
) -> Result<Room, GameError> {
    let mut rng = StdRng::from_entropy();
    let room = room_code::allocate(state.store.as_ref(), &mut rng, |code| {
        let mut room = Room::new(code, host_id.clone(), settings.clone());
        room.players
            .push(Player::new(host_id.clone(), host_name.clone(), AVATAR_COLORS[0]));
        room
    })
    .await?;
    info!("room {} created by {}", room.code, host_id);
    Ok(room)
}

pub async fn get_room(state: &AppState, code: &str) -> Result<Room, GameError> {
    state.store.read(code).await.ok_or(GameError::RoomNotFound)
}

pub async fn join_room(
    state: &AppState,
    code: &str,
    player_id: &str,
    name: &str,
) -> Result<Room, GameError> {
    state
        .store
        .atomic_update(code, &|room| phase::join_room(room, player_id, name))
        .await
}

/// Leaving the lobby; an emptied room is discarded.
pub async fn leave_room(state: &AppState, code: &str, player_id: &str) -> Result<Room, GameError> {
    let room = state
        .store
        .atomic_update(code, &|room| phase::leave_room(room, player_id))
        .await?;
    if room.players.is_empty() {
        state.store.remove(code).await;
        info!("room {} emptied and discarded", code);
    }
    Ok(room)
}

/// Host-only partial settings update. The host and lobby checks run inside
/// the atomic update so they still hold at commit time.
pub async fn update_settings(
    state: &AppState,
    code: &str,
    actor: &str,
    partial: serde_json::Value,
) -> Result<Room, GameError> {
    state
        .store
        .atomic_update(code, &|room| {
            if !room.is_host(actor) {
                return Err(GameError::PermissionDenied);
            }
            if room.phase != Phase::Lobby {
                return Err(GameError::invalid("settings can only change in the lobby"));
            }
            let mut merged = serde_json::to_value(&room.settings)
                .map_err(|e| GameError::invalid(format!("serialize failed: {e}")))?;
            if let (Some(doc), Some(partial)) = (merged.as_object_mut(), partial.as_object()) {
                for (key, value) in partial {
                    doc.insert(key.clone(), value.clone());
                }
            }
            // Round-trip through Settings so malformed fields are rejected up front.
            let settings: Settings = serde_json::from_value(merged)
                .map_err(|e| GameError::invalid(format!("invalid settings: {e}")))?;
            if settings == room.settings {
                return Ok(None);
            }
            let mut room = room.clone();
            room.settings = settings;
            Ok(Some(room))
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_join_then_leave() {
        let state = AppState::new();
        let room = create_room(&state, "host".into(), "Alice".into(), Settings::default())
            .await
            .unwrap();

        let room = join_room(&state, &room.code, "p2", "Bob").await.unwrap();
        assert_eq!(room.players.len(), 2);

        // Joining twice is a no-op, not an error.
        let room = join_room(&state, &room.code, "p2", "Bob").await.unwrap();
        assert_eq!(room.players.len(), 2);

        let room = leave_room(&state, &room.code, "p2").await.unwrap();
        assert_eq!(room.players.len(), 1);
    }

    #[tokio::test]
    async fn join_on_unknown_code_is_not_found() {
        let state = AppState::new();
        let err = join_room(&state, "NOPE!", "p1", "Eve").await.unwrap_err();
        assert_eq!(err, GameError::RoomNotFound);
    }

    #[tokio::test]
    async fn host_leaving_passes_the_seat() {
        let state = AppState::new();
        let room = create_room(&state, "host".into(), "Alice".into(), Settings::default())
            .await
            .unwrap();
        join_room(&state, &room.code, "p2", "Bob").await.unwrap();

        let room = leave_room(&state, &room.code, "host").await.unwrap();
        assert_eq!(room.host_id, "p2");
    }

    #[tokio::test]
    async fn emptied_room_is_discarded() {
        let state = AppState::new();
        let room = create_room(&state, "host".into(), "Alice".into(), Settings::default())
            .await
            .unwrap();
        leave_room(&state, &room.code, "host").await.unwrap();
        assert!(state.store.read(&room.code).await.is_none());
    }

    #[tokio::test]
    async fn settings_merge_keeps_unnamed_fields() {
        let state = AppState::new();
        let mut settings = Settings::default();
        settings.voting_wait_time = 99;
        let room = create_room(&state, "host".into(), "Alice".into(), settings)
            .await
            .unwrap();

        let room = update_settings(
            &state,
            &room.code,
            "host",
            serde_json::json!({ "wolfCount": 2 }),
        )
        .await
        .unwrap();
        assert_eq!(room.settings.wolf_count, 2);
        assert_eq!(room.settings.voting_wait_time, 99);
    }

    #[tokio::test]
    async fn settings_are_frozen_outside_the_lobby() {
        let state = AppState::new();
        let room = create_room(&state, "host".into(), "Alice".into(), Settings::default())
            .await
            .unwrap();
        state
            .store
            .atomic_update(&room.code, &|room| {
                let mut room = room.clone();
                room.phase = Phase::RoleReveal;
                Ok(Some(room))
            })
            .await
            .unwrap();

        let err = update_settings(&state, &room.code, "host", serde_json::json!({ "wolfCount": 2 }))
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidActionForPhase(_)));
    }

    #[tokio::test]
    async fn unchanged_settings_partial_is_a_noop() {
        let state = AppState::new();
        let room = create_room(&state, "host".into(), "Alice".into(), Settings::default())
            .await
            .unwrap();
        let mut rx = state.store.subscribe(&room.code).await.unwrap();

        let current = room.settings.wolf_count;
        update_settings(
            &state,
            &room.code,
            "host",
            serde_json::json!({ "wolfCount": current }),
        )
        .await
        .unwrap();
        assert!(matches!(
            rx.try_recv(),
            Err(tokio::sync::broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn settings_update_is_host_only() {
        let state = AppState::new();
        let room = create_room(&state, "host".into(), "Alice".into(), Settings::default())
            .await
            .unwrap();
        join_room(&state, &room.code, "p2", "Bob").await.unwrap();

        let err = update_settings(&state, &room.code, "p2", serde_json::json!({ "wolfCount": 2 }))
            .await
            .unwrap_err();
        assert_eq!(err, GameError::PermissionDenied);
    }
}
