use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::night::NightActions;
use super::player::{Player, PlayerId};
use super::role::{RoleId, Team, Winner};
use super::settings::Settings;
use super::vote::{DayVoteRecord, VoteChoice};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "role", rename_all = "camelCase")]
pub enum Phase {
    Lobby,
    RoleReveal,
    NightIntro,
    NightAction(RoleId),
    HunterAction,
    DayReveal,
    DayVote,
    GameOver,
}

/// Which phase the hunter interrupt was entered from. Recorded on entry,
/// consumed and cleared on exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HunterOrigin {
    Night,
    DayVote,
}

/// The shared document for one game instance. All engine functions are pure
/// transforms over this value, applied through the store's atomic update.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub code: String,
    pub host_id: PlayerId,
    pub phase: Phase,
    /// Bumped on every phase transition; stale timeout callbacks and
    /// duplicate advance triggers compare against it and no-op.
    pub phase_serial: u64,
    pub night_number: u32,
    pub players: Vec<Player>,
    pub night_actions: NightActions,
    /// Remaining uses for limited-use night roles, keyed by player.
    pub ammo: HashMap<PlayerId, u8>,
    pub lovers: Option<(PlayerId, PlayerId)>,
    /// The current day's in-progress ballots; folded into `vote_history`
    /// when the day resolves.
    pub day_votes: HashMap<PlayerId, VoteChoice>,
    pub vote_history: Vec<DayVoteRecord>,
    pub settings: Settings,
    pub winners: BTreeSet<Winner>,
    /// Dead hunters still owed a revenge shot, oldest first.
    pub pending_hunters: Vec<PlayerId>,
    pub hunter_origin: Option<HunterOrigin>,
    /// Human-readable account of the last resolution, shown at DayReveal.
    pub day_summary: String,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    pub fn new(code: String, host_id: PlayerId, settings: Settings) -> Self {
        Self {
            code,
            host_id,
            phase: Phase::Lobby,
            phase_serial: 0,
            night_number: 0,
            players: Vec::new(),
            night_actions: NightActions::default(),
            ammo: HashMap::new(),
            lovers: None,
            day_votes: HashMap::new(),
            vote_history: Vec::new(),
            settings,
            winners: BTreeSet::new(),
            pending_hunters: Vec::new(),
            hunter_origin: None,
            day_summary: String::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn living_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive)
    }

    pub fn is_host(&self, id: &str) -> bool {
        self.host_id == id
    }

    /// The one predicate deciding night sub-phase inclusion: does `role`
    /// have at least one living holder?
    pub fn has_living_holder(&self, role: RoleId) -> bool {
        self.living_players().any(|p| p.role == Some(role))
    }

    pub fn living_team_count(&self, team: Team) -> usize {
        self.living_players()
            .filter(|p| p.role.map(|r| r.team()) == Some(team))
            .count()
    }

    pub fn display_name(&self, id: &str) -> String {
        self.player(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}
