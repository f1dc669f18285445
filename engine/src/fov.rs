//! Logic for what an observer on the map can see.

use util::angle_between;

use crate::{prelude::*, GridMap};

/// Cells currently visible to a single observer.
///
/// Covers the whole map. Recomputed from scratch on every scan, nothing
/// carries over from earlier scans.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct VisibilityMap {
    width: i32,
    height: i32,
    cells: Vec<bool>,
}

impl VisibilityMap {
    pub fn new(grid: &GridMap) -> Self {
        VisibilityMap {
            width: grid.width(),
            height: grid.height(),
            cells: vec![false; grid.area()],
        }
    }

    fn idx(&self, pos: IVec2) -> Option<usize> {
        ((0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y))
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    /// Reset every cell to not visible.
    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// Mark a cell visible. Out-of-bounds cells are ignored and return
    /// false.
    pub fn reveal(&mut self, pos: IVec2) -> bool {
        if let Some(i) = self.idx(pos) {
            self.cells[i] = true;
            true
        } else {
            false
        }
    }

    pub fn is_visible(&self, pos: IVec2) -> bool {
        self.idx(pos).is_some_and(|i| self.cells[i])
    }

    /// Iterate visible cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = IVec2> + '_ {
        let w = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v)
            .map(move |(i, _)| ivec2(i as i32 % w, i as i32 / w))
    }

    pub fn len(&self) -> usize {
        self.cells.iter().filter(|&&v| v).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.cells.contains(&true)
    }
}

/// Perception parameters of an observer.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Vision {
    /// Sight radius in the chessboard metric.
    pub range: i32,
    /// Width of the view cone in degrees. `None` sees all around.
    pub cone: Option<f32>,
}

impl Vision {
    pub fn all_around(range: i32) -> Self {
        Vision { range, cone: None }
    }

    /// Whether a cell passes the view cone restriction of an observer at
    /// `origin` looking towards `facing`.
    pub fn admits(&self, origin: IVec2, facing: IVec2, pos: IVec2) -> bool {
        match self.cone {
            None => true,
            Some(angle) => is_within_cone_angle(origin, pos, facing, angle),
        }
    }
}

/// Whether `pos` lies within a view cone of `cone_angle` degrees centered
/// on `facing` as seen from `origin`.
///
/// The origin itself is always inside the cone, and a zero facing vector
/// looks everywhere.
pub fn is_within_cone_angle(
    origin: IVec2,
    pos: IVec2,
    facing: IVec2,
    cone_angle: f32,
) -> bool {
    let d = pos - origin;
    if d == IVec2::ZERO || facing == IVec2::ZERO {
        return true;
    }

    // Small slack so cells exactly on the cone edge stay in.
    angle_between(facing, d) <= cone_angle.to_radians() / 2.0 + 1e-4
}

impl GridMap {
    /// Compute field of view from `origin` and report every visible
    /// in-bounds cell.
    ///
    /// Open cells are transparent. Blocked cells at the edge of the lit
    /// area are reported too.
    pub fn fov_from(
        &self,
        origin: IVec2,
        range: i32,
        mut on_visible: impl FnMut(IVec2),
    ) {
        // Nothing on the map is further away than this.
        let range = range.min(self.width().max(self.height()));
        ::fov::compute(
            origin,
            range,
            |p| self.is_transparent(p),
            |p| {
                if self.contains(p) {
                    on_visible(p);
                }
            },
        );
    }
}
