use std::collections::{BTreeSet, HashSet};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::GameError;
use crate::models::night::{ActionKind, NightActionRequest, NightActions};
use crate::models::player::{Player, PlayerId, AVATAR_COLORS};
use crate::models::role::{DeathHook, NightEffect, RoleId, Team, VoteOutHook};
use crate::models::room::{HunterOrigin, Phase, Room};
use crate::models::vote::{DayVoteRecord, VoteChoice, VoteOutcome};

use super::{deck, night, vote, win};

pub const MAX_PLAYERS: usize = 12;
pub const MIN_PLAYERS: usize = 3;

/// Every intent is a pure transform `Room -> Room`, applied through the
/// store's atomic update. `Ok(None)` means the room is unchanged — the
/// idempotent no-op for duplicate triggers; `Err` is a rejected intent that
/// records nothing.
pub type Transformed = Result<Option<Room>, GameError>;

fn transition(room: &mut Room, phase: Phase) {
    room.phase = phase;
    room.phase_serial += 1;
}

// ---------------------------------------------------------------------------
// Lobby

pub fn join_room(room: &Room, player_id: &str, name: &str) -> Transformed {
    if room.phase != Phase::Lobby {
        return Err(GameError::invalid("the game has already started"));
    }
    if room.player(player_id).is_some() {
        return Ok(None);
    }
    if room.players.len() >= MAX_PLAYERS {
        return Err(GameError::invalid("the room is full"));
    }
    let mut room = room.clone();
    let color = AVATAR_COLORS[room.players.len() % AVATAR_COLORS.len()];
    room.players
        .push(Player::new(player_id.to_string(), name.to_string(), color));
    Ok(Some(room))
}

/// A player can only be removed by leaving before role assignment. When the
/// host leaves, the seat passes to the earliest remaining player.
pub fn leave_room(room: &Room, player_id: &str) -> Transformed {
    if room.phase != Phase::Lobby {
        return Err(GameError::invalid("cannot leave a running game"));
    }
    if room.player(player_id).is_none() {
        return Ok(None);
    }
    let mut room = room.clone();
    room.players.retain(|p| p.id != player_id);
    if room.host_id == player_id {
        if let Some(next_host) = room.players.first() {
            room.host_id = next_host.id.clone();
        }
    }
    Ok(Some(room))
}

/// Deal and shuffle the role deck, reset per-game state, and enter role
/// reveal. The shuffle seed is fixed per request so the transform stays
/// deterministic under optimistic-concurrency retries.
pub fn start_game(room: &Room, actor: &str, seed: u64) -> Transformed {
    if !room.is_host(actor) {
        return Err(GameError::PermissionDenied);
    }
    match room.phase {
        Phase::Lobby => {}
        Phase::RoleReveal => return Ok(None),
        _ => return Err(GameError::invalid("game is already in progress")),
    }
    if room.players.len() < MIN_PLAYERS {
        return Err(GameError::NotEnoughPlayers {
            needed: MIN_PLAYERS,
            have: room.players.len(),
        });
    }

    let mut deck = deck::build_deck(&room.settings, room.players.len())?;
    deck::shuffle_deck(&mut deck, &mut StdRng::seed_from_u64(seed));

    let mut room = room.clone();
    room.night_number = 0;
    room.night_actions = NightActions::default();
    room.lovers = None;
    room.ammo.clear();
    room.day_votes.clear();
    room.vote_history.clear();
    room.winners.clear();
    room.pending_hunters.clear();
    room.hunter_origin = None;
    room.day_summary.clear();
    for (player, role) in room.players.iter_mut().zip(deck) {
        player.role = Some(role);
        player.is_alive = true;
        player.ready = false;
        if let Some(ammo) = role.spec().ammo {
            room.ammo.insert(player.id.clone(), ammo);
        }
    }
    transition(&mut room, Phase::RoleReveal);
    Ok(Some(room))
}

/// Back to the lobby: players retained, everything game-specific cleared.
pub fn reset_room(room: &Room, actor: &str) -> Transformed {
    if !room.is_host(actor) {
        return Err(GameError::PermissionDenied);
    }
    if room.phase == Phase::Lobby {
        return Ok(None);
    }
    let mut room = room.clone();
    room.night_number = 0;
    room.night_actions = NightActions::default();
    room.lovers = None;
    room.ammo.clear();
    room.day_votes.clear();
    room.vote_history.clear();
    room.winners.clear();
    room.pending_hunters.clear();
    room.hunter_origin = None;
    room.day_summary.clear();
    for player in &mut room.players {
        player.role = None;
        player.is_alive = true;
        player.ready = false;
    }
    transition(&mut room, Phase::Lobby);
    Ok(Some(room))
}

// ---------------------------------------------------------------------------
// Role reveal

pub fn mark_ready(room: &Room, actor: &str) -> Transformed {
    if room.phase != Phase::RoleReveal {
        return Err(GameError::invalid("not in role reveal"));
    }
    let Some(player) = room.player(actor) else {
        return Err(GameError::invalid("unknown player"));
    };
    if player.ready {
        return Ok(None);
    }
    let mut room = room.clone();
    room.player_mut(actor)
        .expect("player existed in snapshot")
        .ready = true;
    if room.living_players().all(|p| p.ready) {
        enter_night_intro(&mut room);
    }
    Ok(Some(room))
}

// ---------------------------------------------------------------------------
// Night

fn enter_night_intro(room: &mut Room) {
    room.night_actions = NightActions::default();
    room.night_number += 1;
    transition(room, Phase::NightIntro);
}

/// Does this night sub-phase apply right now? One predicate decides
/// inclusion: the role must have a living holder, and the link phase only
/// runs night one while no pair exists yet.
fn night_role_applicable(room: &Room, role: RoleId) -> bool {
    if !room.has_living_holder(role) {
        return false;
    }
    match role.spec().night {
        Some((_, NightEffect::Link)) => {
            room.night_number <= 1
                && room.lovers.is_none()
                && room.night_actions.cupid_links.is_none()
        }
        Some(_) => true,
        None => false,
    }
}

fn next_night_role(room: &Room, after: Option<RoleId>) -> Option<RoleId> {
    let floor = after
        .and_then(|r| r.spec().night)
        .map(|(order, _)| order);
    RoleId::night_order()
        .into_iter()
        .filter(|r| {
            let (order, _) = r.spec().night.expect("night_order only lists night roles");
            floor.map_or(true, |f| order > f)
        })
        .find(|r| night_role_applicable(room, *r))
}

fn begin_night(room: &mut Room) {
    match next_night_role(room, None) {
        Some(role) => transition(room, Phase::NightAction(role)),
        // No night-acting role has a living holder: the night resolves
        // immediately (no deaths) into the day reveal.
        None => resolve_night(room),
    }
}

fn after_night_phase(room: &mut Room, current: RoleId) {
    match next_night_role(room, Some(current)) {
        Some(role) => transition(room, Phase::NightAction(role)),
        None => resolve_night(room),
    }
}

pub fn submit_night_action(room: &Room, req: &NightActionRequest) -> Transformed {
    let Phase::NightAction(phase_role) = room.phase else {
        return Err(GameError::invalid("no night action is expected right now"));
    };
    let Some(actor) = room.player(&req.player_id) else {
        return Err(GameError::invalid("unknown player"));
    };
    if !actor.is_alive || actor.role != Some(phase_role) {
        return Err(GameError::invalid("you do not act in this phase"));
    }
    let (_, effect) = phase_role
        .spec()
        .night
        .expect("phase role is night-acting");
    if expected_kind(effect) != req.kind {
        return Err(GameError::invalid("action kind does not match the phase"));
    }
    for target in [&req.target, &req.second_target].into_iter().flatten() {
        if !room.player(target).map(|p| p.is_alive).unwrap_or(false) {
            return Err(GameError::invalid("target is not a living player"));
        }
    }

    let mut updated = room.clone();
    match effect {
        NightEffect::Link => match (&req.target, &req.second_target) {
            (Some(a), Some(b)) if a != b => {
                updated.night_actions.cupid_links = Some((a.clone(), b.clone()));
            }
            (None, None) => {}
            _ => return Err(GameError::invalid("linking requires two distinct players")),
        },
        NightEffect::Kill => updated.night_actions.wolf_target = req.target.clone(),
        NightEffect::Protect => updated.night_actions.doctor_protect = req.target.clone(),
        // Informational only; the result goes back to the actor, nothing is
        // recorded in the shared action set.
        NightEffect::Inspect => {}
        NightEffect::LimitedKill => {
            if let Some(target) = &req.target {
                let ammo = updated.ammo.get(&req.player_id).copied().unwrap_or(0);
                if ammo == 0 {
                    return Err(GameError::InsufficientResource("no ammo left".into()));
                }
                // Spent at submission time, not at resolution.
                updated.ammo.insert(req.player_id.clone(), ammo - 1);
                updated.night_actions.vigilante_target = Some(target.clone());
            }
        }
    }
    after_night_phase(&mut updated, phase_role);
    Ok(Some(updated))
}

/// The seer's answer, delivered to the acting player only.
pub fn inspect_team(room: &Room, target: &str) -> Option<Team> {
    room.player(target).and_then(|p| p.role).map(|r| r.team())
}

fn expected_kind(effect: NightEffect) -> ActionKind {
    match effect {
        NightEffect::Link => ActionKind::CupidLinks,
        NightEffect::Kill => ActionKind::WolfTarget,
        NightEffect::Protect => ActionKind::DoctorProtect,
        NightEffect::Inspect => ActionKind::SeerCheck,
        NightEffect::LimitedKill => ActionKind::VigilanteTarget,
    }
}

/// Consume the night's action set in fixed precedence.
fn resolve_night(room: &mut Room) {
    if let Some(pair) = room.night_actions.cupid_links.clone() {
        room.lovers = Some(pair);
    }
    let living: HashSet<PlayerId> = room.living_players().map(|p| p.id.clone()).collect();
    let deaths = night::compute_night_deaths(&room.night_actions, &living, &room.lovers);
    room.day_summary = night::death_summary(room, &deaths);
    apply_deaths(room, &deaths);

    if !room.pending_hunters.is_empty() {
        room.hunter_origin = Some(HunterOrigin::Night);
        transition(room, Phase::HunterAction);
    } else {
        conclude(room, Phase::DayReveal);
    }
}

/// Mark players dead and run their death hooks. Hunters queue a revenge
/// interrupt instead of resolving inline.
fn apply_deaths(room: &mut Room, deaths: &[PlayerId]) {
    for id in deaths {
        let Some(player) = room.player_mut(id) else {
            continue;
        };
        if !player.is_alive {
            continue;
        }
        player.is_alive = false;
        if let Some(role) = player.role {
            if role.spec().on_death == DeathHook::Revenge {
                room.pending_hunters.push(id.clone());
            }
        }
    }
}

/// One-hop linked-death propagation for a death outside night resolution.
fn lover_partner_of(room: &Room, dead: &str) -> Option<PlayerId> {
    let (a, b) = room.lovers.as_ref()?;
    let partner = if a == dead {
        b
    } else if b == dead {
        a
    } else {
        return None;
    };
    room.player(partner)
        .filter(|p| p.is_alive)
        .map(|p| p.id.clone())
}

/// Run the win check and either end the game or move to `next`.
fn conclude(room: &mut Room, next: Phase) {
    let winners = win::evaluate(room);
    if winners.is_empty() {
        if next == Phase::NightIntro {
            enter_night_intro(room);
        } else {
            transition(room, next);
        }
    } else {
        room.winners.extend(winners);
        transition(room, Phase::GameOver);
    }
}

// ---------------------------------------------------------------------------
// Hunter interrupt

pub fn submit_hunter_target(room: &Room, actor: &str, target: Option<&str>) -> Transformed {
    if room.phase != Phase::HunterAction {
        return Err(GameError::invalid("no revenge shot is expected right now"));
    }
    if room.pending_hunters.first().map(String::as_str) != Some(actor) {
        return Err(GameError::invalid("it is not your revenge shot"));
    }
    let mut updated = room.clone();
    if let Some(target) = target {
        if !updated
            .player(target)
            .map(|p| p.is_alive)
            .unwrap_or(false)
        {
            return Err(GameError::invalid("target is not a living player"));
        }
        kill_with_cascade(&mut updated, target);
        updated.day_summary = format!(
            "{} {} was taken down by the hunter's revenge.",
            updated.day_summary,
            updated.display_name(target)
        )
        .trim()
        .to_string();
    }
    updated.pending_hunters.remove(0);
    finish_hunter(&mut updated);
    Ok(Some(updated))
}

fn kill_with_cascade(room: &mut Room, target: &str) {
    let mut deaths = vec![target.to_string()];
    deaths.extend(lover_partner_of(room, target));
    apply_deaths(room, &deaths);
}

/// After a revenge shot (or its timeout): either the next queued hunter
/// takes over, or the recorded origin phase decides where play resumes.
fn finish_hunter(room: &mut Room) {
    if !room.pending_hunters.is_empty() {
        transition(room, Phase::HunterAction);
        return;
    }
    let origin = room.hunter_origin.take();
    match origin {
        Some(HunterOrigin::DayVote) => conclude(room, Phase::NightIntro),
        _ => conclude(room, Phase::DayReveal),
    }
}

// ---------------------------------------------------------------------------
// Day

fn enter_day_vote(room: &mut Room) {
    room.day_votes.clear();
    transition(room, Phase::DayVote);
}

pub fn submit_vote(room: &Room, actor: &str, choice: VoteChoice) -> Transformed {
    if room.phase != Phase::DayVote {
        return Err(GameError::invalid("voting is not open"));
    }
    if !room.player(actor).map(|p| p.is_alive).unwrap_or(false) {
        return Err(GameError::invalid("only living players vote"));
    }
    if let VoteChoice::Player(target) = &choice {
        if !room.player(target).map(|p| p.is_alive).unwrap_or(false) {
            return Err(GameError::invalid("target is not a living player"));
        }
    }
    if room.day_votes.get(actor) == Some(&choice) {
        return Ok(None);
    }
    let mut updated = room.clone();
    updated.day_votes.insert(actor.to_string(), choice);
    if updated
        .living_players()
        .all(|p| updated.day_votes.contains_key(&p.id))
    {
        finalize_day_votes(&mut updated);
    }
    Ok(Some(updated))
}

/// Seal the day's ballots into the history, then consume only the outcome.
fn finalize_day_votes(room: &mut Room) {
    let outcome = vote::tally(&room.day_votes, &room.players);
    let votes = std::mem::take(&mut room.day_votes);
    room.vote_history.push(DayVoteRecord {
        votes,
        outcome: outcome.clone(),
    });

    match outcome {
        VoteOutcome::Eliminated(target) => resolve_elimination(room, &target),
        VoteOutcome::Tie => {
            room.day_summary = "The vote was tied; no one was eliminated.".to_string();
            enter_night_intro(room);
        }
        VoteOutcome::Skip => {
            room.day_summary = "The village chose not to eliminate anyone.".to_string();
            enter_night_intro(room);
        }
    }
}

fn resolve_elimination(room: &mut Room, target: &str) {
    room.day_summary = format!("{} was voted out.", room.display_name(target));
    let role = room.player(target).and_then(|p| p.role);
    kill_with_cascade(room, target);

    if let Some(VoteOutHook::SoloWin(winner)) = role.map(|r| r.spec().on_vote_out) {
        if room.settings.fool_ends_game {
            // Exclusive individual win: the game ends for everyone, here and
            // now, regardless of any other condition.
            room.winners = BTreeSet::from([winner]);
            room.pending_hunters.clear();
            room.hunter_origin = None;
            transition(room, Phase::GameOver);
            return;
        }
        room.winners.insert(winner);
    }

    if !room.pending_hunters.is_empty() {
        room.hunter_origin = Some(HunterOrigin::DayVote);
        transition(room, Phase::HunterAction);
    } else {
        conclude(room, Phase::NightIntro);
    }
}

// ---------------------------------------------------------------------------
// Level-triggered advancement

/// Any room member observing that the current phase's preconditions hold may
/// trigger the transition; anything else is a no-op.
pub fn advance(room: &Room, actor: &str) -> Transformed {
    if room.player(actor).is_none() {
        return Err(GameError::invalid("unknown player"));
    }
    let mut updated = room.clone();
    match room.phase {
        Phase::RoleReveal if room.living_players().all(|p| p.ready) => {
            enter_night_intro(&mut updated)
        }
        Phase::NightIntro => begin_night(&mut updated),
        Phase::DayReveal => enter_day_vote(&mut updated),
        _ => return Ok(None),
    }
    Ok(Some(updated))
}

/// Timeout path: advance with whatever was collected, treating missing inputs
/// as abstentions. `serial` is the phase serial captured when the timer was
/// armed; a stale timer is a no-op.
pub fn advance_on_timeout(room: &Room, serial: u64) -> Transformed {
    if room.phase_serial != serial {
        return Ok(None);
    }
    let mut updated = room.clone();
    match room.phase {
        Phase::RoleReveal | Phase::NightIntro => begin_or_intro(&mut updated),
        Phase::NightAction(role) => after_night_phase(&mut updated, role),
        Phase::DayReveal => enter_day_vote(&mut updated),
        Phase::DayVote => finalize_day_votes(&mut updated),
        Phase::HunterAction => {
            // The dead hunter never fired; the shot is forfeit.
            if !updated.pending_hunters.is_empty() {
                updated.pending_hunters.remove(0);
            }
            finish_hunter(&mut updated);
        }
        Phase::Lobby | Phase::GameOver => return Ok(None),
    }
    Ok(Some(updated))
}

fn begin_or_intro(room: &mut Room) {
    if room.phase == Phase::RoleReveal {
        enter_night_intro(room);
    } else {
        begin_night(room);
    }
}
