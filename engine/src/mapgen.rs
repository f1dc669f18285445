//! Initial placement of the map and everything on it.

use anyhow::{bail, Context};
use rand::prelude::*;

use crate::{prelude::*, GridMap, Result, SessionConfig};

/// Part of the map given as fractions of its width and height.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Region {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl Region {
    /// Upper-left quarter, where the goal goes.
    pub const GOAL: Region = Region {
        min: [0.0, 0.0],
        max: [0.5, 0.5],
    };

    /// Lower-right eighth, where the player starts.
    pub const PLAYER: Region = Region {
        min: [0.75, 0.5],
        max: [1.0, 1.0],
    };

    /// Middle of the map, where enemies patrol.
    pub const ENEMY: Region = Region {
        min: [0.25, 0.25],
        max: [0.75, 0.75],
    };

    /// Cells of the region on a map of the given size.
    ///
    /// Never empty for a non-empty map, a region too thin to cover a whole
    /// cell still gets one.
    pub fn cells(
        &self,
        width: i32,
        height: i32,
    ) -> impl Iterator<Item = IVec2> {
        let span = |size: i32, a: f32, b: f32| {
            if size <= 0 {
                return 0..0;
            }
            let lo = ((size as f32 * a).floor() as i32).clamp(0, size - 1);
            let hi = ((size as f32 * b).ceil() as i32).clamp(lo + 1, size);
            lo..hi
        };
        let xs = span(width, self.min[0], self.max[0]);
        let ys = span(height, self.min[1], self.max[1]);
        ys.flat_map(move |y| xs.clone().map(move |x| ivec2(x, y)))
    }
}

/// Pick a random open cell from the region that's not in `avoid`.
///
/// Falls back to any open cell on the map outside `avoid` and then to any
/// open cell at all. Returns `None` only if the map has no open cells.
pub fn place(
    grid: &GridMap,
    region: Region,
    avoid: &[IVec2],
    rng: &mut (impl Rng + ?Sized),
) -> Option<IVec2> {
    let free = |p: &IVec2| grid.is_walkable(*p) && !avoid.contains(p);

    let local: Vec<IVec2> =
        region.cells(grid.width(), grid.height()).filter(free).collect();
    if let Some(&p) = local.choose(rng) {
        return Some(p);
    }

    log::debug!("place: Region {region:?} is full, using the whole map");
    let anywhere: Vec<IVec2> = grid.positions().filter(free).collect();
    if let Some(&p) = anywhere.choose(rng) {
        return Some(p);
    }

    let open: Vec<IVec2> = grid.open_positions().collect();
    open.choose(rng).copied()
}

/// Map with the starting positions of the player, the goal and the enemies.
#[derive(Clone, Debug)]
pub struct Layout {
    pub grid: GridMap,
    pub player: IVec2,
    pub goal: IVec2,
    pub enemies: Vec<IVec2>,
}

impl Layout {
    /// Generate a random layout.
    ///
    /// Fails only if the configuration is malformed or the generated map
    /// has no open cells.
    pub fn generate(
        config: &SessionConfig,
        rng: &mut (impl Rng + ?Sized),
    ) -> Result<Self> {
        config.validate()?;
        let grid = GridMap::generate(
            config.grid_width,
            config.grid_height,
            config.obstacle_probability,
            rng,
        )?;

        let player = place(&grid, Region::PLAYER, &[], rng)
            .context("Layout: Map has no open cells")?;
        let goal = place(&grid, Region::GOAL, &[player], rng)
            .context("Layout: Map has no open cells")?;

        let mut taken = vec![player, goal];
        let mut enemies = Vec::with_capacity(config.enemy_count);
        for _ in 0..config.enemy_count {
            let Some(pos) = place(&grid, Region::ENEMY, &taken, rng)
                .filter(|p| !taken.contains(p))
            else {
                log::debug!("Layout: No room for more enemies");
                break;
            };
            taken.push(pos);
            enemies.push(pos);
        }

        log::info!(
            "Layout: Player at {player}, goal at {goal}, enemies at {enemies:?}"
        );
        Ok(Layout {
            grid,
            player,
            goal,
            enemies,
        })
    }

    /// Read a hand-drawn layout.
    ///
    /// `#` is a blocked cell, `@` the player, `G` the goal, `E` an enemy and
    /// anything else an open cell. The player and the goal may share a cell
    /// when drawn as `*`.
    pub fn from_ascii(map: &str) -> Result<Self> {
        let grid = GridMap::from_ascii(map)?;

        let mut player = None;
        let mut goal = None;
        let mut enemies = Vec::new();

        let rows = map
            .trim()
            .lines()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty());
        for (y, line) in rows.enumerate() {
            for (x, c) in line.chars().enumerate() {
                let p = ivec2(x as i32, y as i32);
                match c {
                    '@' => player = Some(p),
                    'G' => goal = Some(p),
                    '*' => {
                        player = Some(p);
                        goal = Some(p);
                    }
                    'E' => enemies.push(p),
                    _ => {}
                }
            }
        }

        let Some(player) = player else {
            bail!("Layout: No player in map");
        };
        let Some(goal) = goal else {
            bail!("Layout: No goal in map");
        };

        Ok(Layout {
            grid,
            player,
            goal,
            enemies,
        })
    }
}
