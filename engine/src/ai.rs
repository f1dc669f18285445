//! Enemies figuring out where to go on their own.

use rand::RngCore;
use util::RngExt;

use crate::{prelude::*, Alert, Enemy, GridMap};

/// How an alerted enemy picks its next step towards the player.
pub trait Pursuit {
    /// Unit step direction for an enemy at `from` hunting `target`.
    ///
    /// A zero vector means the enemy doesn't want to move.
    fn direction(
        &self,
        from: IVec2,
        target: IVec2,
        rng: &mut dyn RngCore,
    ) -> IVec2;
}

/// Walk straight at the target, closing the Manhattan distance by one on
/// every step.
#[derive(Copy, Clone, Default, Debug)]
pub struct Chase;

impl Pursuit for Chase {
    fn direction(
        &self,
        from: IVec2,
        target: IVec2,
        _rng: &mut dyn RngCore,
    ) -> IVec2 {
        from.dir4_towards(&target)
    }
}

/// Ignore the target and keep wandering randomly.
#[derive(Copy, Clone, Default, Debug)]
pub struct Wander;

impl Pursuit for Wander {
    fn direction(
        &self,
        _from: IVec2,
        _target: IVec2,
        rng: &mut dyn RngCore,
    ) -> IVec2 {
        rng.dir4()
    }
}

/// What happened during an enemy's turn.
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
pub struct TurnReport {
    /// Steps taken.
    pub steps: u32,
    /// Enemy went from idle to alerted during the turn.
    pub became_alerted: bool,
    /// Enemy stepped onto the player.
    pub captured: bool,
}

impl Enemy {
    /// Run one AI turn for the enemy.
    ///
    /// Cells in `occupied` hold other enemies and can't be entered. Movement
    /// stops at the first invalid step, after `max_move` steps, or when the
    /// enemy walks onto the player.
    pub fn take_turn(
        &mut self,
        grid: &GridMap,
        player: IVec2,
        occupied: &HashSet<IVec2>,
        pursuit: &dyn Pursuit,
        rng: &mut dyn RngCore,
    ) -> TurnReport {
        let was_alerted = self.is_alerted();
        let mut report = TurnReport::default();

        self.moved = 0;
        self.target = None;
        self.scan(grid, player);

        while self.moved < self.max_move {
            let dir = match self.alert {
                Alert::Idle => rng.dir4(),
                Alert::Alerted => pursuit.direction(self.pos, player, rng),
            };
            if dir == IVec2::ZERO {
                break;
            }

            let dest = self.pos + dir;
            self.target = Some(dest);
            if !grid.is_walkable(dest) || occupied.contains(&dest) {
                log::trace!("Enemy at {}: Step to {dest} blocked", self.pos);
                break;
            }

            self.pos = dest;
            self.facing = dir;
            self.moved += 1;
            self.scan(grid, player);

            if dest == player {
                log::info!("Enemy captured player at {dest}");
                report.captured = true;
                break;
            }
        }

        report.steps = self.moved;
        report.became_alerted = !was_alerted && self.is_alerted();
        report
    }
}
