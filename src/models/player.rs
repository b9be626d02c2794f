use serde::{Deserialize, Serialize};

use super::role::RoleId;

pub type PlayerId = String;

/// Avatar palette, assigned round-robin at join. Presentation only.
pub const AVATAR_COLORS: &[&str] = &[
    "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#f032e6",
];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Option<RoleId>,
    pub is_alive: bool,
    pub ready: bool,
    pub color: String,
}

impl Player {
    pub fn new(id: PlayerId, name: String, color: &str) -> Self {
        Self {
            id,
            name,
            role: None,
            is_alive: true,
            ready: false,
            color: color.to_string(),
        }
    }
}
