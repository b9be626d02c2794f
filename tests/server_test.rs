//! End-to-end game over the HTTP surface.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use lupine::app::create_app_with_state;
use lupine::engine::analytics::PostGameStats;
use lupine::models::role::{RoleId, Winner};
use lupine::models::room::{Phase, Room};
use lupine::state::AppState;
use tower::ServiceExt;

async fn post_json(app: &Router, uri: &str, body: String) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn get_room(app: &Router, code: &str) -> Room {
    let request = Request::builder()
        .method("GET")
        .uri(&format!("/api/room/{code}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn full_game_village_victory() {
    let app = create_app_with_state(AppState::new());

    // Create a 5-player room with a single wolf and no optional roles.
    let (status, body) = post_json(
        &app,
        "/api/room/create",
        r#"{"hostId":"p0","hostName":"Host","settings":{"wolfCount":1}}"#.to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let created: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let code = created["code"].as_str().unwrap().to_string();

    for i in 1..5 {
        let (status, _) = post_json(
            &app,
            &format!("/api/room/{code}/join"),
            format!(r#"{{"playerId":"p{i}","name":"P{i}"}}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = post_json(
        &app,
        &format!("/api/game/{code}/start"),
        r#"{"playerId":"p0"}"#.to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for i in 0..5 {
        post_json(
            &app,
            &format!("/api/game/{code}/ready"),
            format!(r#"{{"playerId":"p{i}"}}"#),
        )
        .await;
    }
    let room = get_room(&app, &code).await;
    assert_eq!(room.phase, Phase::NightIntro);

    // The document is open: find the wolf and a villager to bite.
    let wolf = room
        .players
        .iter()
        .find(|p| p.role == Some(RoleId::Werewolf))
        .unwrap()
        .id
        .clone();
    let victim = room
        .players
        .iter()
        .find(|p| p.role != Some(RoleId::Werewolf))
        .unwrap()
        .id
        .clone();

    let (status, _) = post_json(
        &app,
        &format!("/api/game/{code}/advance"),
        r#"{"playerId":"p0"}"#.to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let room = get_room(&app, &code).await;
    assert_eq!(room.phase, Phase::NightAction(RoleId::Werewolf));

    let (status, _) = post_json(
        &app,
        &format!("/api/game/{code}/night-action"),
        format!(
            r#"{{"playerId":"{wolf}","kind":"wolfTarget","target":"{victim}","secondTarget":null}}"#
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let room = get_room(&app, &code).await;
    assert_eq!(room.phase, Phase::DayReveal);
    assert!(!room.player(&victim).unwrap().is_alive);
    assert!(room.day_summary.contains("died tonight"));

    let (status, _) = post_json(
        &app,
        &format!("/api/game/{code}/advance"),
        r#"{"playerId":"p0"}"#.to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Every survivor votes out the wolf.
    let room = get_room(&app, &code).await;
    assert_eq!(room.phase, Phase::DayVote);
    let living: Vec<String> = room
        .players
        .iter()
        .filter(|p| p.is_alive)
        .map(|p| p.id.clone())
        .collect();
    for voter in &living {
        let choice = if *voter == wolf {
            r#"{"kind":"skip"}"#.to_string()
        } else {
            format!(r#"{{"kind":"player","target":"{wolf}"}}"#)
        };
        let (status, _) = post_json(
            &app,
            &format!("/api/game/{code}/vote"),
            format!(r#"{{"playerId":"{voter}","choice":{choice}}}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let room = get_room(&app, &code).await;
    assert_eq!(room.phase, Phase::GameOver);
    assert!(room.winners.contains(&Winner::Village));

    // Post-game analytics: everyone who hit the wolf shares the accuracy award.
    let request = Request::builder()
        .method("GET")
        .uri(&format!("/api/game/{code}/analytics"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let stats: PostGameStats = serde_json::from_slice(&bytes).unwrap();

    let mut accurate = stats.accolades.most_accurate.clone();
    accurate.sort();
    let mut expected: Vec<String> = living.iter().filter(|id| **id != wolf).cloned().collect();
    expected.sort();
    assert_eq!(accurate, expected);
    assert_eq!(stats.accolades.most_targeted, vec![wolf.clone()]);

    // One matrix row per player, one entry per recorded day.
    assert_eq!(stats.matrix.len(), 5);
    assert!(stats.matrix.values().all(|row| row.len() == 1));

    // Reset: players retained, game state cleared.
    let (status, _) = post_json(
        &app,
        &format!("/api/game/{code}/reset"),
        r#"{"playerId":"p0"}"#.to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let room = get_room(&app, &code).await;
    assert_eq!(room.phase, Phase::Lobby);
    assert_eq!(room.players.len(), 5);
    assert!(room.players.iter().all(|p| p.role.is_none()));
}

#[tokio::test]
async fn joining_a_running_game_is_rejected() {
    let app = create_app_with_state(AppState::new());

    let (_, body) = post_json(
        &app,
        "/api/room/create",
        r#"{"hostId":"p0","hostName":"Host"}"#.to_string(),
    )
    .await;
    let created: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let code = created["code"].as_str().unwrap().to_string();

    for i in 1..3 {
        post_json(
            &app,
            &format!("/api/room/{code}/join"),
            format!(r#"{{"playerId":"p{i}","name":"P{i}"}}"#),
        )
        .await;
    }
    post_json(
        &app,
        &format!("/api/game/{code}/start"),
        r#"{"playerId":"p0"}"#.to_string(),
    )
    .await;

    let (status, _) = post_json(
        &app,
        &format!("/api/room/{code}/join"),
        r#"{"playerId":"late","name":"Late"}"#.to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_room_is_404() {
    let app = create_app_with_state(AppState::new());
    let request = Request::builder()
        .method("GET")
        .uri("/api/room/QQQQ2")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
