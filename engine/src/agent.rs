//! Player and enemy state.

use serde::{Deserialize, Serialize};

use crate::{prelude::*, GridMap, Path, Vision, VisibilityMap};

/// Enemy behavior state.
///
/// Alert is one-way, an enemy that has seen the player keeps hunting for the
/// rest of the session.
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
pub enum Alert {
    #[default]
    Idle,
    Alerted,
}

/// The player token.
#[derive(Clone, Debug)]
pub struct Player {
    pos: IVec2,
    path: Path,
    cursor: usize,
}

impl Player {
    pub fn new(pos: IVec2) -> Self {
        Player {
            pos,
            path: Default::default(),
            cursor: 0,
        }
    }

    pub fn pos(&self) -> IVec2 {
        self.pos
    }

    /// Last committed path.
    pub fn path(&self) -> &[IVec2] {
        &self.path
    }

    /// Index of the next path tile to walk to.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Part of the committed path that hasn't been walked yet.
    pub fn remaining_path(&self) -> &[IVec2] {
        &self.path[self.cursor.min(self.path.len())..]
    }

    pub fn is_moving(&self) -> bool {
        !self.remaining_path().is_empty()
    }

    /// Replace the active path and start walking it from the beginning.
    pub fn set_path(&mut self, path: Path) {
        self.path = path;
        self.cursor = 0;
    }

    /// Move to the next tile on the path.
    ///
    /// Path tiles equal to the current position are skipped, so the start
    /// tile of a fresh path doesn't cost a step. Returns the new position if
    /// the player moved.
    pub fn advance(&mut self) -> Option<IVec2> {
        while let Some(&p) = self.path.get(self.cursor) {
            self.cursor += 1;
            if p != self.pos {
                self.pos = p;
                return Some(p);
            }
        }
        None
    }
}

/// A patrolling enemy.
#[derive(Clone, Debug)]
pub struct Enemy {
    pub(crate) pos: IVec2,
    pub(crate) alert: Alert,
    pub(crate) vision: Vision,
    /// Direction of the last step taken, the view cone points this way.
    pub(crate) facing: IVec2,
    /// Steps allowed per AI turn.
    pub(crate) max_move: u32,
    /// Steps taken during the current or latest AI turn.
    pub(crate) moved: u32,
    /// Last step tried during the latest AI turn, taken or not.
    pub(crate) target: Option<IVec2>,
    visibility: VisibilityMap,
}

impl Enemy {
    pub fn new(
        grid: &GridMap,
        pos: IVec2,
        vision: Vision,
        max_move: u32,
    ) -> Self {
        Enemy {
            pos,
            alert: Alert::Idle,
            vision,
            facing: ivec2(0, 1),
            max_move,
            moved: 0,
            target: None,
            visibility: VisibilityMap::new(grid),
        }
    }

    pub fn pos(&self) -> IVec2 {
        self.pos
    }

    pub fn alert(&self) -> Alert {
        self.alert
    }

    pub fn is_alerted(&self) -> bool {
        self.alert == Alert::Alerted
    }

    pub fn vision(&self) -> Vision {
        self.vision
    }

    pub fn facing(&self) -> IVec2 {
        self.facing
    }

    pub fn max_move(&self) -> u32 {
        self.max_move
    }

    pub fn moved(&self) -> u32 {
        self.moved
    }

    pub fn target(&self) -> Option<IVec2> {
        self.target
    }

    /// Cells seen during the latest scan.
    pub fn visibility(&self) -> &VisibilityMap {
        &self.visibility
    }

    /// Recompute what the enemy sees and look for the player.
    ///
    /// Previous visibility is discarded. Seeing the player switches an idle
    /// enemy to alerted. Returns whether the player is in sight.
    pub fn scan(&mut self, grid: &GridMap, player: IVec2) -> bool {
        let (origin, facing, vision) = (self.pos, self.facing, self.vision);
        let visibility = &mut self.visibility;
        let mut spotted = false;

        visibility.clear();
        grid.fov_from(origin, vision.range, |p| {
            if vision.admits(origin, facing, p) {
                visibility.reveal(p);
                spotted |= p == player;
            }
        });

        if spotted && self.alert == Alert::Idle {
            log::info!("Enemy at {origin} spotted player at {player}");
            self.alert = Alert::Alerted;
        }
        spotted
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn player_walks_path() {
        let mut player = Player::new(ivec2(0, 0));
        assert!(!player.is_moving());
        assert_eq!(player.advance(), None);

        player.set_path(vec![ivec2(0, 0), ivec2(1, 1), ivec2(2, 1)]);
        assert!(player.is_moving());
        assert_eq!(player.advance(), Some(ivec2(1, 1)));
        assert_eq!(player.cursor(), 2);
        assert_eq!(player.remaining_path(), &[ivec2(2, 1)]);
        assert_eq!(player.advance(), Some(ivec2(2, 1)));
        assert_eq!(player.advance(), None);
        assert_eq!(player.pos(), ivec2(2, 1));
        assert!(!player.is_moving());

        // New order replaces the old one.
        player.set_path(vec![ivec2(2, 1), ivec2(2, 2)]);
        assert_eq!(player.cursor(), 0);
        assert_eq!(player.advance(), Some(ivec2(2, 2)));
    }

    #[test]
    fn alert_on_sight() {
        let grid = GridMap::new(12, 3).unwrap();
        let mut enemy =
            Enemy::new(&grid, ivec2(0, 1), Vision::all_around(3), 0);
        assert_eq!(enemy.alert(), Alert::Idle);

        assert!(!enemy.scan(&grid, ivec2(5, 1)));
        assert_eq!(enemy.alert(), Alert::Idle);

        // Player walks up to distance 2.
        assert!(enemy.scan(&grid, ivec2(2, 1)));
        assert_eq!(enemy.alert(), Alert::Alerted);

        // And leaves, the enemy stays alerted.
        assert!(!enemy.scan(&grid, ivec2(10, 1)));
        assert_eq!(enemy.alert(), Alert::Alerted);
    }

    #[test]
    fn hidden_behind_wall() {
        let grid = GridMap::from_ascii(
            "
            .....
            .#...
            .....",
        )
        .unwrap();
        let mut enemy =
            Enemy::new(&grid, ivec2(0, 1), Vision::all_around(4), 0);
        assert!(!enemy.scan(&grid, ivec2(2, 1)));
        assert!(!enemy.is_alerted());
        assert!(enemy.visibility().is_visible(ivec2(1, 1)));
    }

    #[test]
    fn rescan_drops_stale_cells() {
        let grid = GridMap::new(10, 1).unwrap();
        let mut enemy =
            Enemy::new(&grid, ivec2(0, 0), Vision::all_around(2), 0);
        enemy.scan(&grid, ivec2(9, 0));
        assert!(enemy.visibility().is_visible(ivec2(2, 0)));

        enemy.pos = ivec2(7, 0);
        enemy.scan(&grid, ivec2(9, 0));
        assert!(!enemy.visibility().is_visible(ivec2(2, 0)));
        assert!(enemy.visibility().is_visible(ivec2(7, 0)));
        assert_eq!(
            enemy.visibility().iter().collect::<Vec<_>>(),
            (5..10).map(|x| ivec2(x, 0)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn cone_limits_sight() {
        let grid = GridMap::new(7, 7).unwrap();
        let mut enemy = Enemy::new(
            &grid,
            ivec2(3, 3),
            Vision {
                range: 3,
                cone: Some(90.0),
            },
            0,
        );
        // Facing south by default.
        assert!(!enemy.scan(&grid, ivec2(3, 1)));
        assert!(enemy.visibility().is_visible(ivec2(3, 3)));
        assert!(!enemy.is_alerted());
        assert!(enemy.scan(&grid, ivec2(3, 5)));
        assert!(enemy.is_alerted());
    }
}
