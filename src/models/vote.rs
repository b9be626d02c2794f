use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// One ballot in a day vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "camelCase")]
pub enum VoteChoice {
    Player(PlayerId),
    Skip,
}

/// The resolved outcome of one day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "camelCase")]
pub enum VoteOutcome {
    Eliminated(PlayerId),
    Tie,
    Skip,
}

/// One completed day. Appended to the room's history once and immutable
/// thereafter. Players absent from `votes` did not vote that day.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DayVoteRecord {
    pub votes: HashMap<PlayerId, VoteChoice>,
    pub outcome: VoteOutcome,
}
