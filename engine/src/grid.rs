//! Static terrain of a session.

use std::fmt;

use anyhow::bail;
use rand::prelude::*;

use crate::{prelude::*, Result};

/// Terrain in a single map cell.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Debug)]
pub enum Cell {
    #[default]
    Open,
    Blocked,
}

impl Cell {
    pub fn is_walkable(self) -> bool {
        self == Cell::Open
    }

    pub fn blocks_sight(self) -> bool {
        self == Cell::Blocked
    }

    fn to_char(self) -> char {
        match self {
            Cell::Open => '.',
            Cell::Blocked => '#',
        }
    }
}

/// Rectangular map of open and blocked cells.
///
/// Dimensions never change after construction. All queries accept any
/// position and answer out-of-bounds ones with a definite negative.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct GridMap {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl GridMap {
    /// Create an all-open map.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            bail!("GridMap: Bad dimensions {width}x{height}");
        }
        // Cell indices are computed in i32.
        let Some(area) = width.checked_mul(height) else {
            bail!("GridMap: {width}x{height} map is too large");
        };

        Ok(GridMap {
            width,
            height,
            cells: vec![Cell::Open; area as usize],
        })
    }

    /// Generate a map where every cell is independently blocked with the
    /// given probability.
    ///
    /// There is no connectivity guarantee, any two open cells may end up
    /// walled off from each other.
    pub fn generate(
        width: i32,
        height: i32,
        obstacle_probability: f64,
        rng: &mut (impl Rng + ?Sized),
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&obstacle_probability) {
            bail!("GridMap: Bad obstacle probability {obstacle_probability}");
        }

        let mut ret = GridMap::new(width, height)?;
        for c in ret.cells.iter_mut() {
            if rng.gen_bool(obstacle_probability) {
                *c = Cell::Blocked;
            }
        }

        log::debug!(
            "GridMap: Generated {width}x{height} map with {} obstacles",
            ret.cells.iter().filter(|c| c.blocks_sight()).count()
        );
        Ok(ret)
    }

    /// Read a map drawn with `#` for blocked cells. Any other non-whitespace
    /// character is an open cell.
    ///
    /// Leading and trailing whitespace on each line is ignored, all lines
    /// must have the same length.
    pub fn from_ascii(map: &str) -> Result<Self> {
        let lines: Vec<&str> = map
            .trim()
            .lines()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect();

        let height = lines.len() as i32;
        let width = lines.first().map_or(0, |a| a.chars().count()) as i32;
        let mut ret = GridMap::new(width, height)?;

        for (y, line) in lines.iter().enumerate() {
            if line.chars().count() as i32 != width {
                bail!("GridMap: Ragged map line {y}");
            }
            for (x, c) in line.chars().enumerate() {
                if c == '#' {
                    ret.set(ivec2(x as i32, y as i32), Cell::Blocked);
                }
            }
        }

        Ok(ret)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of cells on the map.
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }

    fn idx(&self, pos: IVec2) -> Option<usize> {
        self.contains(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    pub fn get(&self, pos: IVec2) -> Option<Cell> {
        self.idx(pos).map(|i| self.cells[i])
    }

    pub(crate) fn set(&mut self, pos: IVec2, cell: Cell) {
        if let Some(i) = self.idx(pos) {
            self.cells[i] = cell;
        }
    }

    /// Whether an agent can stand on the cell.
    pub fn is_walkable(&self, pos: IVec2) -> bool {
        self.get(pos).is_some_and(Cell::is_walkable)
    }

    /// Whether sight passes through the cell.
    pub fn is_transparent(&self, pos: IVec2) -> bool {
        self.get(pos).is_some_and(|c| !c.blocks_sight())
    }

    /// Iterate all cell positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = IVec2> {
        let w = self.width;
        (0..self.width * self.height).map(move |i| ivec2(i % w, i / w))
    }

    pub fn open_positions(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.positions().filter(|&p| self.is_walkable(p))
    }
}

impl fmt::Display for GridMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width as usize) {
            for c in row {
                write!(f, "{}", c.to_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
