use std::collections::BTreeSet;

use crate::models::role::{Team, Winner};
use crate::models::room::Room;
use crate::models::settings::CupidMode;

/// Inspect the living-player team composition and declare winners. Returns an
/// empty set while the game should continue. Run after every death-producing
/// event.
///
/// The lovers check runs before the team checks because it can pre-empt them:
/// a wolf/villager couple as the last two standing is a lovers win, not a
/// werewolf win.
pub fn evaluate(room: &Room) -> BTreeSet<Winner> {
    let mut winners = BTreeSet::new();

    if let Some(lovers_win) = lovers_victory(room) {
        return lovers_win;
    }

    let wolves = room.living_team_count(Team::Werewolf);
    let opposition = room.living_team_count(Team::Village);

    if wolves == 0 {
        winners.insert(Winner::Village);
    } else if wolves >= opposition {
        winners.insert(Winner::Werewolves);
    }
    winners
}

fn lovers_victory(room: &Room) -> Option<BTreeSet<Winner>> {
    let (a, b) = room.lovers.as_ref()?;
    let living: Vec<&str> = room.living_players().map(|p| p.id.as_str()).collect();
    if !living.contains(&a.as_str()) || !living.contains(&b.as_str()) {
        return None;
    }

    if living.len() == 2 {
        return Some(BTreeSet::from([Winner::Lovers]));
    }

    // Included mode: the one extra survivor shares the win if their role
    // carries the lovers-win capability.
    if room.settings.cupid_mode == CupidMode::Included && living.len() == 3 {
        let third_shares = room
            .living_players()
            .filter(|p| p.id != *a && p.id != *b)
            .all(|p| p.role.map_or(false, |r| r.spec().shares_lovers_win));
        if third_shares {
            return Some(BTreeSet::from([Winner::Lovers, Winner::Cupid]));
        }
    }
    None
}
