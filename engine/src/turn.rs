use std::fmt;

use serde::{Deserialize, Serialize};

/// Side that is currently acting.
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
pub enum Turn {
    #[default]
    Player,
    Ai,
}

/// A committed move cost more than the player has left.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct OverBudget {
    pub cost: u32,
    pub remaining: u32,
}

impl fmt::Display for OverBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "move costs {} but only {} left this turn",
            self.cost, self.remaining
        )
    }
}

impl std::error::Error for OverBudget {}

/// Turn order and the player's movement budget.
///
/// The budget is refilled when the player hands the turn over, so every
/// player turn starts with a full budget no matter how the previous one
/// ended.
#[derive(Clone, Debug)]
pub struct TurnController {
    turn: Turn,
    remaining: u32,
    max: u32,
}

impl TurnController {
    pub fn new(max_moves: u32) -> Self {
        TurnController {
            turn: Turn::Player,
            remaining: max_moves,
            max: max_moves,
        }
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn is_player_turn(&self) -> bool {
        self.turn == Turn::Player
    }

    /// Moves the player can still commit to this turn.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn can_afford(&self, cost: u32) -> bool {
        cost <= self.remaining
    }

    /// Deduct `cost` moves from the budget, return what's left.
    pub fn spend(&mut self, cost: u32) -> Result<u32, OverBudget> {
        if !self.can_afford(cost) {
            return Err(OverBudget {
                cost,
                remaining: self.remaining,
            });
        }
        self.remaining -= cost;
        Ok(self.remaining)
    }

    /// Hand the turn to the AI. Returns false if it wasn't the player's turn
    /// to give away.
    pub fn end_player_turn(&mut self) -> bool {
        if self.turn != Turn::Player {
            return false;
        }
        self.turn = Turn::Ai;
        self.remaining = self.max;
        true
    }

    /// Give the turn back to the player. Returns false if it wasn't the
    /// AI's turn.
    pub fn end_ai_turn(&mut self) -> bool {
        if self.turn != Turn::Ai {
            return false;
        }
        self.turn = Turn::Player;
        true
    }
}
