use std::{collections::VecDeque, hash::Hash};

use crate::HashSet;

/// Generate a shortest paths map on a grid according to a neighbors function.
pub fn dijkstra_map<'a, T, I>(
    mut neighbors: impl FnMut(&T) -> I + 'a,
    starts: impl IntoIterator<Item = T>,
) -> impl Iterator<Item = (T, usize)> + 'a
where
    T: Clone + Eq + Hash + 'a,
    I: IntoIterator<Item = T>,
{
    let mut edge: VecDeque<(T, usize)> =
        starts.into_iter().map(|s| (s, 0)).collect();
    let mut seen = HashSet::default();

    std::iter::from_fn(move || {
        // Candidates are in a queue and consumed first-in, first-out. This
        // should guarantee that the first time a node is popped from the queue
        // it shows the shortest path length from start to that node.

        while let Some((node, len)) = edge.pop_front() {
            if !seen.contains(&node) {
                seen.insert(node.clone());
                for n in neighbors(&node) {
                    edge.push_back((n, len + 1));
                }
                return Some((node, len));
            }
        }
        None
    })
}

/// Find a shortest path between two nodes where every step has unit cost.
///
/// The returned path includes both `start` and `end`, a path from a node to
/// itself is the single node. The heuristic must not overestimate the number
/// of steps between its two arguments.
pub fn astar_path<T, I>(
    start: &T,
    end: &T,
    mut neighbors: impl FnMut(&T) -> I,
    mut heuristic: impl FnMut(&T, &T) -> usize,
) -> Option<Vec<T>>
where
    T: Clone + Eq + Hash,
    I: IntoIterator<Item = T>,
{
    pathfinding::prelude::astar(
        start,
        |a| neighbors(a).into_iter().map(|b| (b, 1usize)),
        |a| heuristic(a, end),
        |a| a == end,
    )
    .map(|(path, _)| path)
}
