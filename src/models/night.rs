use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// What kind of night action a client is submitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    WolfTarget,
    DoctorProtect,
    SeerCheck,
    VigilanteTarget,
    CupidLinks,
}

/// One night's in-progress action record. Cleared on entry to NightIntro.
/// At most one value per kind; `None` means the phase holder abstained or
/// the phase has not run yet. The seer's check is informational only and is
/// never recorded here.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct NightActions {
    pub wolf_target: Option<PlayerId>,
    pub doctor_protect: Option<PlayerId>,
    pub vigilante_target: Option<PlayerId>,
    pub cupid_links: Option<(PlayerId, PlayerId)>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NightActionRequest {
    pub player_id: PlayerId,
    pub kind: ActionKind,
    pub target: Option<PlayerId>,
    /// Second half of the cupid pair; unused by every other kind.
    pub second_target: Option<PlayerId>,
}
