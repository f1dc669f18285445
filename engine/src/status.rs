use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{prelude::*, Enemy};

/// Outcome of the session so far.
#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    PartialEq,
    Hash,
    Debug,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum ScenarioStatus {
    #[default]
    #[strum(serialize = "ongoing")]
    Ongoing,
    #[strum(serialize = "win")]
    Won,
    #[strum(serialize = "lose")]
    Lost,
}

impl ScenarioStatus {
    pub fn is_over(self) -> bool {
        self != ScenarioStatus::Ongoing
    }
}

/// Check the end conditions of the session.
///
/// An enemy on the player's tile is a loss even if the player is also
/// standing on the goal.
pub fn evaluate(
    player: IVec2,
    enemies: &[Enemy],
    goal: IVec2,
) -> ScenarioStatus {
    if enemies.iter().any(|e| e.pos() == player) {
        ScenarioStatus::Lost
    } else if player == goal {
        ScenarioStatus::Won
    } else {
        ScenarioStatus::Ongoing
    }
}
