//! Events emitted to the presentation layer.

use std::fmt;

use crate::{prelude::*, OverBudget, ScenarioStatus, Turn};

/// Things that happened in the session that a UI may want to show.
#[derive(Clone, PartialEq, Debug)]
pub enum Msg {
    /// Preview of where the player would go when clicking the hovered
    /// tile, already cut to the remaining move budget.
    PathPreview(Vec<IVec2>),

    /// Player committed to a path, moves left after it.
    MoveCommitted { path: Vec<IVec2>, remaining: u32 },

    /// A move request was refused.
    MoveRejected(Rejection),

    /// Enemy at the position saw the player.
    EnemyAlerted(IVec2),

    TurnChanged(Turn),

    /// The session is over. Sent only once.
    GameOver(ScenarioStatus),
}

/// Reason a preview or move request was turned down.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Rejection {
    NotPlayerTurn,
    GameOver,
    /// Target is off the map, blocked, or occupied.
    InvalidTarget(IVec2),
    NoPath(IVec2),
    OverBudget(OverBudget),
    /// A newer request replaced this one before it completed.
    Superseded,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotPlayerTurn => write!(f, "not the player's turn"),
            Rejection::GameOver => write!(f, "game is over"),
            Rejection::InvalidTarget(p) => write!(f, "can't move to {p}"),
            Rejection::NoPath(p) => write!(f, "no path to {p}"),
            Rejection::OverBudget(e) => write!(f, "{e}"),
            Rejection::Superseded => write!(f, "superseded by a newer move"),
        }
    }
}

impl std::error::Error for Rejection {}

impl From<OverBudget> for Rejection {
    fn from(e: OverBudget) -> Self {
        Rejection::OverBudget(e)
    }
}
