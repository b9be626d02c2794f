use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::player::{Player, PlayerId};
use crate::models::role::Team;
use crate::models::vote::{DayVoteRecord, VoteChoice, VoteOutcome};

/// One cell of the per-player voting matrix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "camelCase")]
pub enum MatrixEntry {
    Voted(PlayerId),
    Skipped,
    DidNotVote,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Accolades {
    /// Most votes cast against a wolf-team player on the day that player was
    /// actually eliminated. Ties share the award.
    pub most_accurate: Vec<PlayerId>,
    /// Most votes received across all days, regardless of outcome.
    pub most_targeted: Vec<PlayerId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PostGameStats {
    /// For each player, one entry per day.
    pub matrix: HashMap<PlayerId, Vec<MatrixEntry>>,
    pub accolades: Accolades,
}

/// Pure function over the full vote history and the final player list.
pub fn analyze(history: &[DayVoteRecord], players: &[Player]) -> PostGameStats {
    let mut matrix: HashMap<PlayerId, Vec<MatrixEntry>> = players
        .iter()
        .map(|p| (p.id.clone(), Vec::with_capacity(history.len())))
        .collect();
    let mut accurate: HashMap<&str, u32> = HashMap::new();
    let mut targeted: HashMap<&str, u32> = HashMap::new();

    for day in history {
        for player in players {
            let entry = match day.votes.get(&player.id) {
                Some(VoteChoice::Player(target)) => MatrixEntry::Voted(target.clone()),
                Some(VoteChoice::Skip) => MatrixEntry::Skipped,
                None => MatrixEntry::DidNotVote,
            };
            if let Some(row) = matrix.get_mut(&player.id) {
                row.push(entry);
            }
        }

        let eliminated_wolf = match &day.outcome {
            VoteOutcome::Eliminated(target) => players
                .iter()
                .find(|p| p.id == *target)
                .filter(|p| p.role.map(|r| r.team()) == Some(Team::Werewolf))
                .map(|p| p.id.as_str()),
            _ => None,
        };

        for (voter, choice) in &day.votes {
            let VoteChoice::Player(target) = choice else {
                continue;
            };
            if let Some(t) = players.iter().find(|p| p.id == *target) {
                *targeted.entry(t.id.as_str()).or_insert(0) += 1;
            }
            if eliminated_wolf == Some(target.as_str()) {
                if let Some(v) = players.iter().find(|p| p.id == *voter) {
                    *accurate.entry(v.id.as_str()).or_insert(0) += 1;
                }
            }
        }
    }

    PostGameStats {
        matrix,
        accolades: Accolades {
            most_accurate: tied_leaders(&accurate, players),
            most_targeted: tied_leaders(&targeted, players),
        },
    }
}

/// All players tied for the highest count; empty when no one scored.
/// Player-list order keeps the result stable.
fn tied_leaders(counts: &HashMap<&str, u32>, players: &[Player]) -> Vec<PlayerId> {
    let Some(max) = counts.values().copied().max() else {
        return Vec::new();
    };
    players
        .iter()
        .filter(|p| counts.get(p.id.as_str()) == Some(&max))
        .map(|p| p.id.clone())
        .collect()
}
