use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoleId {
    Villager,
    Werewolf,
    Doctor,
    Seer,
    Hunter,
    Cupid,
    Vigilante,
    Fool,
    Mayor,
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.spec().display_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    Village,
    Werewolf,
    Neutral,
}

/// How a role's submitted night action participates in resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NightEffect {
    /// Pairs two players as lovers (night one only).
    Link,
    /// Records a shield on the target.
    Protect,
    /// The primary adversary elimination.
    Kill,
    /// Reveals the target's team to the actor only; records nothing.
    Inspect,
    /// Ammo-limited elimination.
    LimitedKill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathHook {
    None,
    /// The dead player picks a revenge target before the outcome is final.
    Revenge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutHook {
    None,
    /// Being voted out is this role's win condition.
    SoloWin(Winner),
}

/// Team or individual identifiers recorded in a room's terminal winner set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Winner {
    Village,
    Werewolves,
    Lovers,
    Cupid,
    Fool,
}

/// One immutable registry entry. All role-specific behavior is dispatched
/// through these fields; no engine component matches on `RoleId` directly.
#[derive(Debug, Clone, Copy)]
pub struct RoleSpec {
    pub id: RoleId,
    pub display_name: &'static str,
    pub team: Team,
    /// `(sub-phase order, effect)` for night-acting roles.
    pub night: Option<(u8, NightEffect)>,
    /// Balance weight for room-composition tuning; not used by gameplay logic.
    pub balance_weight: i8,
    /// Weighted day-vote tallying (Mayor counts double).
    pub vote_weight: u32,
    pub on_death: DeathHook,
    pub on_vote_out: VoteOutHook,
    /// Starting ammo for limited-use night actions.
    pub ammo: Option<u8>,
    /// Joins the lovers' terminal win as the one extra survivor when the
    /// room's cupid mode includes the matchmaker.
    pub shares_lovers_win: bool,
}

static REGISTRY: &[RoleSpec] = &[
    RoleSpec {
        id: RoleId::Villager,
        display_name: "Villager",
        team: Team::Village,
        night: None,
        balance_weight: 1,
        vote_weight: 1,
        on_death: DeathHook::None,
        on_vote_out: VoteOutHook::None,
        ammo: None,
        shares_lovers_win: false,
    },
    RoleSpec {
        id: RoleId::Werewolf,
        display_name: "Werewolf",
        team: Team::Werewolf,
        night: Some((1, NightEffect::Kill)),
        balance_weight: -6,
        vote_weight: 1,
        on_death: DeathHook::None,
        on_vote_out: VoteOutHook::None,
        ammo: None,
        shares_lovers_win: false,
    },
    RoleSpec {
        id: RoleId::Doctor,
        display_name: "Doctor",
        team: Team::Village,
        night: Some((2, NightEffect::Protect)),
        balance_weight: 4,
        vote_weight: 1,
        on_death: DeathHook::None,
        on_vote_out: VoteOutHook::None,
        ammo: None,
        shares_lovers_win: false,
    },
    RoleSpec {
        id: RoleId::Seer,
        display_name: "Seer",
        team: Team::Village,
        night: Some((3, NightEffect::Inspect)),
        balance_weight: 7,
        vote_weight: 1,
        on_death: DeathHook::None,
        on_vote_out: VoteOutHook::None,
        ammo: None,
        shares_lovers_win: false,
    },
    RoleSpec {
        id: RoleId::Hunter,
        display_name: "Hunter",
        team: Team::Village,
        night: None,
        balance_weight: 3,
        vote_weight: 1,
        on_death: DeathHook::Revenge,
        on_vote_out: VoteOutHook::None,
        ammo: None,
        shares_lovers_win: false,
    },
    RoleSpec {
        id: RoleId::Cupid,
        display_name: "Cupid",
        team: Team::Village,
        night: Some((0, NightEffect::Link)),
        balance_weight: -3,
        vote_weight: 1,
        on_death: DeathHook::None,
        on_vote_out: VoteOutHook::None,
        ammo: None,
        shares_lovers_win: true,
    },
    RoleSpec {
        id: RoleId::Vigilante,
        display_name: "Vigilante",
        team: Team::Village,
        night: Some((4, NightEffect::LimitedKill)),
        balance_weight: 2,
        vote_weight: 1,
        on_death: DeathHook::None,
        on_vote_out: VoteOutHook::None,
        ammo: Some(1),
        shares_lovers_win: false,
    },
    RoleSpec {
        id: RoleId::Fool,
        display_name: "Fool",
        team: Team::Neutral,
        night: None,
        balance_weight: -2,
        vote_weight: 1,
        on_death: DeathHook::None,
        on_vote_out: VoteOutHook::SoloWin(Winner::Fool),
        ammo: None,
        shares_lovers_win: false,
    },
    RoleSpec {
        id: RoleId::Mayor,
        display_name: "Mayor",
        team: Team::Village,
        night: None,
        balance_weight: 2,
        vote_weight: 2,
        on_death: DeathHook::None,
        on_vote_out: VoteOutHook::None,
        ammo: None,
        shares_lovers_win: false,
    },
];

impl RoleId {
    pub fn spec(self) -> &'static RoleSpec {
        REGISTRY
            .iter()
            .find(|s| s.id == self)
            .expect("every RoleId has a registry entry")
    }

    pub fn team(self) -> Team {
        self.spec().team
    }

    /// Roles that can be toggled on in room settings. Villager and Werewolf
    /// are always part of the deck and are not listed here.
    pub fn optional_roles() -> impl Iterator<Item = RoleId> {
        REGISTRY
            .iter()
            .map(|s| s.id)
            .filter(|id| !matches!(id, RoleId::Villager | RoleId::Werewolf))
    }

    /// Night-acting roles in their fixed sub-phase order.
    pub fn night_order() -> Vec<RoleId> {
        let mut acting: Vec<&RoleSpec> = REGISTRY.iter().filter(|s| s.night.is_some()).collect();
        acting.sort_by_key(|s| s.night.map(|(order, _)| order));
        acting.iter().map(|s| s.id).collect()
    }
}
