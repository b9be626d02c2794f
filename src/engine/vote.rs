use std::collections::HashMap;

use crate::models::player::{Player, PlayerId};
use crate::models::vote::{VoteChoice, VoteOutcome};

/// Tally one day's ballots into an outcome. Vote weighting (the Mayor counts
/// double) is a tallying concern and is applied here, before the outcome is
/// finalized; resolution only ever consumes the outcome.
pub fn tally(votes: &HashMap<PlayerId, VoteChoice>, players: &[Player]) -> VoteOutcome {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for (voter, choice) in votes {
        let VoteChoice::Player(target) = choice else {
            continue;
        };
        let weight = players
            .iter()
            .find(|p| p.id == *voter)
            .and_then(|p| p.role)
            .map(|r| r.spec().vote_weight)
            .unwrap_or(1);
        *counts.entry(target.as_str()).or_insert(0) += weight;
    }

    let Some(max) = counts.values().copied().max() else {
        return VoteOutcome::Skip;
    };
    let mut leaders = counts.iter().filter(|(_, c)| **c == max);
    let (leader, _) = leaders.next().expect("max implies at least one entry");
    if leaders.next().is_some() {
        VoteOutcome::Tie
    } else {
        VoteOutcome::Eliminated(leader.to_string())
    }
}
