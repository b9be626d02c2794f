use std::collections::HashSet;

use crate::models::night::NightActions;
use crate::models::player::PlayerId;
use crate::models::room::Room;

/// The deterministic heart of night resolution: fixed precedence, independent
/// of submission order, no randomness. Returns the players who die, in
/// resolution order.
///
/// 1. The protective shield is computed first.
/// 2. The wolf target dies unless shielded.
/// 3. The vigilante target dies unless shielded or already dead.
/// 4. If either lover died, the partner dies too; the cascade is one hop.
pub fn compute_night_deaths(
    actions: &NightActions,
    living: &HashSet<PlayerId>,
    lovers: &Option<(PlayerId, PlayerId)>,
) -> Vec<PlayerId> {
    let shield = actions.doctor_protect.as_ref();
    let mut deaths: Vec<PlayerId> = Vec::new();

    if let Some(target) = &actions.wolf_target {
        if living.contains(target) && shield != Some(target) {
            deaths.push(target.clone());
        }
    }

    if let Some(target) = &actions.vigilante_target {
        if living.contains(target) && shield != Some(target) && !deaths.contains(target) {
            deaths.push(target.clone());
        }
    }

    if let Some((a, b)) = lovers {
        let partner = if deaths.contains(a) && living.contains(b) && !deaths.contains(b) {
            Some(b.clone())
        } else if deaths.contains(b) && living.contains(a) && !deaths.contains(a) {
            Some(a.clone())
        } else {
            None
        };
        deaths.extend(partner);
    }

    deaths
}

/// Summary line for the day reveal.
pub fn death_summary(room: &Room, deaths: &[PlayerId]) -> String {
    if deaths.is_empty() {
        "No one died tonight.".to_string()
    } else {
        let names: Vec<String> = deaths.iter().map(|id| room.display_name(id)).collect();
        format!("{} died tonight.", names.join(" and "))
    }
}
