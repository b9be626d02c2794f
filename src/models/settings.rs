use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::role::RoleId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CupidMode {
    /// Cupid links others and does not share the lovers' win.
    Selfless,
    /// A living Cupid joins the lovers' win when only the three remain.
    Included,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Night-action phase timeout, seconds.
    pub action_wait_time: u64,
    /// Day-vote phase timeout, seconds.
    pub voting_wait_time: u64,
    pub wolf_count: usize,
    pub active_roles: HashMap<RoleId, bool>,
    pub cupid_mode: CupidMode,
    /// Whether a voted-out Fool ends the game immediately as sole winner,
    /// or only records the win while play continues.
    pub fool_ends_game: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            action_wait_time: 60,
            voting_wait_time: 180,
            wolf_count: 1,
            active_roles: HashMap::new(),
            cupid_mode: CupidMode::Selfless,
            fool_ends_game: true,
        }
    }
}

impl Settings {
    pub fn role_enabled(&self, role: RoleId) -> bool {
        self.active_roles.get(&role).copied().unwrap_or(false)
    }

    /// Roles dealt into the deck besides wolves and villager padding.
    pub fn enabled_optional_roles(&self) -> Vec<RoleId> {
        RoleId::optional_roles()
            .filter(|r| self.role_enabled(*r))
            .collect()
    }
}
