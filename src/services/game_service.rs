use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::analytics::{self, PostGameStats};
use crate::engine::phase;
use crate::error::GameError;
use crate::models::night::{ActionKind, NightActionRequest};
use crate::models::role::Team;
use crate::models::room::{Phase, Room};
use crate::models::vote::VoteChoice;
use crate::state::AppState;
use crate::store::DocumentStore;

pub async fn start_game(state: &AppState, code: &str, actor: &str) -> Result<Room, GameError> {
    // The seed is drawn once per request so the transform stays deterministic
    // if the optimistic write has to retry.
    let seed: u64 = rand::random();
    let room = state
        .store
        .atomic_update(code, &|room| phase::start_game(room, actor, seed))
        .await?;
    info!("game started in room {}", code);
    schedule_phase_timeout(state, &room);
    Ok(room)
}

pub async fn mark_ready(state: &AppState, code: &str, actor: &str) -> Result<Room, GameError> {
    let room = state
        .store
        .atomic_update(code, &|room| phase::mark_ready(room, actor))
        .await?;
    schedule_phase_timeout(state, &room);
    Ok(room)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NightActionResponse {
    pub room: Room,
    /// The seer's answer; present only for an inspect submission with a
    /// target, and meant for the acting player alone.
    pub revealed_team: Option<Team>,
}

pub async fn submit_night_action(
    state: &AppState,
    code: &str,
    req: &NightActionRequest,
) -> Result<NightActionResponse, GameError> {
    let room = state
        .store
        .atomic_update(code, &|room| phase::submit_night_action(room, req))
        .await?;
    debug!("night action {:?} accepted in room {}", req.kind, code);
    schedule_phase_timeout(state, &room);

    let revealed_team = match (req.kind, &req.target) {
        (ActionKind::SeerCheck, Some(target)) => phase::inspect_team(&room, target),
        _ => None,
    };
    Ok(NightActionResponse {
        room,
        revealed_team,
    })
}

pub async fn submit_vote(
    state: &AppState,
    code: &str,
    actor: &str,
    choice: VoteChoice,
) -> Result<Room, GameError> {
    let room = state
        .store
        .atomic_update(code, &|room| phase::submit_vote(room, actor, choice.clone()))
        .await?;
    schedule_phase_timeout(state, &room);
    Ok(room)
}

pub async fn submit_hunter_target(
    state: &AppState,
    code: &str,
    actor: &str,
    target: Option<&str>,
) -> Result<Room, GameError> {
    let room = state
        .store
        .atomic_update(code, &|room| phase::submit_hunter_target(room, actor, target))
        .await?;
    schedule_phase_timeout(state, &room);
    Ok(room)
}

/// Level-triggered advance: applies only when the current phase's
/// preconditions hold, otherwise a no-op.
pub async fn advance(state: &AppState, code: &str, actor: &str) -> Result<Room, GameError> {
    let room = state
        .store
        .atomic_update(code, &|room| phase::advance(room, actor))
        .await?;
    schedule_phase_timeout(state, &room);
    Ok(room)
}

pub async fn reset_room(state: &AppState, code: &str, actor: &str) -> Result<Room, GameError> {
    let room = state
        .store
        .atomic_update(code, &|room| phase::reset_room(room, actor))
        .await?;
    info!("room {} reset to lobby", code);
    Ok(room)
}

pub async fn post_game_stats(state: &AppState, code: &str) -> Result<PostGameStats, GameError> {
    let room = state.store.read(code).await.ok_or(GameError::RoomNotFound)?;
    if room.phase != Phase::GameOver {
        return Err(GameError::invalid("the game is not over yet"));
    }
    Ok(analytics::analyze(&room.vote_history, &room.players))
}

fn timeout_for(room: &Room) -> Option<Duration> {
    let seconds = match room.phase {
        Phase::DayVote => room.settings.voting_wait_time,
        Phase::RoleReveal
        | Phase::NightIntro
        | Phase::NightAction(_)
        | Phase::HunterAction
        | Phase::DayReveal => room.settings.action_wait_time,
        Phase::Lobby | Phase::GameOver => return None,
    };
    Some(Duration::from_secs(seconds))
}

/// Arm the current phase's timeout. The armed serial makes the callback
/// idempotent: if the phase has since moved on, the fired timer is a no-op.
pub fn schedule_phase_timeout(state: &AppState, room: &Room) {
    let Some(duration) = timeout_for(room) else {
        return;
    };
    let serial = room.phase_serial;
    let code = room.code.clone();
    let state = state.clone();
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        let result = state
            .store
            .atomic_update(&code, &|room| phase::advance_on_timeout(room, serial))
            .await;
        if let Ok(room) = result {
            if room.phase_serial == serial + 1 {
                debug!("phase timeout advanced room {} to {:?}", code, room.phase);
                schedule_phase_timeout(&state, &room);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::Settings;
    use crate::services::room_service;

    async fn lobby_of(state: &AppState, n: usize, settings: Settings) -> Room {
        let room = room_service::create_room(state, "p0".into(), "P0".into(), settings)
            .await
            .unwrap();
        for i in 1..n {
            room_service::join_room(state, &room.code, &format!("p{i}"), &format!("P{i}"))
                .await
                .unwrap();
        }
        room_service::get_room(state, &room.code).await.unwrap()
    }

    #[tokio::test]
    async fn only_the_host_starts_the_game() {
        let state = AppState::new();
        let room = lobby_of(&state, 4, Settings::default()).await;
        let err = start_game(&state, &room.code, "p1").await.unwrap_err();
        assert_eq!(err, GameError::PermissionDenied);

        let room = start_game(&state, &room.code, "p0").await.unwrap();
        assert_eq!(room.phase, Phase::RoleReveal);
        assert!(room.players.iter().all(|p| p.role.is_some()));
    }

    #[tokio::test]
    async fn ready_gate_opens_the_first_night() {
        let state = AppState::new();
        let room = lobby_of(&state, 4, Settings::default()).await;
        start_game(&state, &room.code, "p0").await.unwrap();

        for i in 0..3 {
            let room = mark_ready(&state, &room.code, &format!("p{i}")).await.unwrap();
            assert_eq!(room.phase, Phase::RoleReveal);
        }
        let room = mark_ready(&state, &room.code, "p3").await.unwrap();
        assert_eq!(room.phase, Phase::NightIntro);
        assert_eq!(room.night_number, 1);
    }

    #[tokio::test]
    async fn stats_require_a_finished_game() {
        let state = AppState::new();
        let room = lobby_of(&state, 4, Settings::default()).await;
        let err = post_game_stats(&state, &room.code).await.unwrap_err();
        assert!(matches!(err, GameError::InvalidActionForPhase(_)));
    }
}
