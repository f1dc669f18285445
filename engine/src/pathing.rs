//! Shortest paths over the grid with queued, callback-completed queries.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use util::{astar_path, dijkstra_map};

use crate::{prelude::*, GridMap};

/// Sequence of adjacent tiles from a start tile to a goal tile, both
/// included.
pub type Path = Vec<IVec2>;

/// Movement rules for path search.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct PathSettings {
    /// Allow steps to the eight surrounding cells instead of just the four
    /// orthogonal ones.
    pub allow_diagonals: bool,
    /// Allow diagonal steps past blocked cells. When off, both orthogonal
    /// cells next to a diagonal step must be passable.
    pub allow_corner_cutting: bool,
}

impl Default for PathSettings {
    fn default() -> Self {
        PathSettings {
            allow_diagonals: true,
            allow_corner_cutting: true,
        }
    }
}

/// Identifies a queued path query. Later queries have greater tickets.
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Debug,
)]
pub struct Ticket(u64);

type Completion = Box<dyn FnOnce(Ticket, Option<Path>)>;

struct Query {
    ticket: Ticket,
    start: IVec2,
    goal: IVec2,
    blocked: HashSet<IVec2>,
    on_done: Completion,
}

/// Grid pathfinder.
///
/// Queries are queued with `find_path` and resolved when `calculate` runs,
/// at which point each query's completion handler gets the result.
#[derive(Default)]
pub struct Pathfinder {
    settings: PathSettings,
    queue: VecDeque<Query>,
    issued: u64,
}

impl Pathfinder {
    pub fn new(settings: PathSettings) -> Self {
        Pathfinder {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> PathSettings {
        self.settings
    }

    /// Queue a path query from `start` to `goal`.
    ///
    /// Tiles in `blocked` are treated as impassable for this query only, on
    /// top of the blocked terrain. The start tile is never considered
    /// blocked. `on_done` receives the query's ticket and the path, or
    /// `None` if the goal can't be reached.
    pub fn find_path(
        &mut self,
        start: IVec2,
        goal: IVec2,
        blocked: impl IntoIterator<Item = IVec2>,
        on_done: impl FnOnce(Ticket, Option<Path>) + 'static,
    ) -> Ticket {
        self.issued += 1;
        let ticket = Ticket(self.issued);
        self.queue.push_back(Query {
            ticket,
            start,
            goal,
            blocked: blocked.into_iter().collect(),
            on_done: Box::new(on_done),
        });
        ticket
    }

    /// Number of queries waiting for `calculate`.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Resolve all queued queries in the order they were issued. Returns
    /// the number of resolved queries.
    pub fn calculate(&mut self, grid: &GridMap) -> usize {
        let mut n = 0;
        while let Some(query) = self.queue.pop_front() {
            let path = self.shortest_path(
                grid,
                query.start,
                query.goal,
                &query.blocked,
            );
            log::trace!(
                "Pathfinder: {:?} {} -> {}: {:?}",
                query.ticket,
                query.start,
                query.goal,
                path.as_ref().map(|p| p.len())
            );
            (query.on_done)(query.ticket, path);
            n += 1;
        }
        n
    }

    /// Synchronous path search.
    ///
    /// Every step costs one move, diagonal or not, so the result has the
    /// fewest possible steps. Neighbors are expanded in clock face order,
    /// which makes the choice between equally short paths deterministic.
    pub fn shortest_path(
        &self,
        grid: &GridMap,
        start: IVec2,
        goal: IVec2,
        blocked: &HashSet<IVec2>,
    ) -> Option<Path> {
        if !grid.contains(start) {
            return None;
        }
        if start == goal {
            return Some(vec![start]);
        }
        if !is_passable(grid, blocked, goal) {
            return None;
        }

        let diagonals = self.settings.allow_diagonals;
        astar_path(
            &start,
            &goal,
            |&p| self.steps(grid, blocked, p),
            |a, b| {
                let d = *b - *a;
                if diagonals {
                    d.chess_len() as usize
                } else {
                    d.taxi_len() as usize
                }
            },
        )
    }

    /// Cells that can be entered with a single step from `pos`.
    pub fn steps<'a>(
        &self,
        grid: &'a GridMap,
        blocked: &'a HashSet<IVec2>,
        pos: IVec2,
    ) -> impl Iterator<Item = IVec2> + 'a {
        let dirs: &'static [IVec2] = if self.settings.allow_diagonals {
            &DIR_8
        } else {
            &DIR_4
        };
        let corner_cutting = self.settings.allow_corner_cutting;

        dirs.iter().filter_map(move |&d| {
            let next = pos + d;
            if !is_passable(grid, blocked, next) {
                return None;
            }

            if !corner_cutting && d.x != 0 && d.y != 0 {
                let side_a = pos + ivec2(d.x, 0);
                let side_b = pos + ivec2(0, d.y);
                if !is_passable(grid, blocked, side_a)
                    || !is_passable(grid, blocked, side_b)
                {
                    return None;
                }
            }

            Some(next)
        })
    }

    /// Step distances to every cell reachable from `start`.
    pub fn reachable(
        &self,
        grid: &GridMap,
        start: IVec2,
        blocked: &HashSet<IVec2>,
    ) -> HashMap<IVec2, usize> {
        if !grid.contains(start) {
            return Default::default();
        }

        dijkstra_map(
            |&p| self.steps(grid, blocked, p).collect::<Vec<_>>(),
            [start],
        )
        .collect()
    }
}

fn is_passable(grid: &GridMap, blocked: &HashSet<IVec2>, pos: IVec2) -> bool {
    grid.is_walkable(pos) && !blocked.contains(&pos)
}
