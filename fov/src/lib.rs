//! Generic field-of-view computation.
//!
//! Symmetric shadowcasting: if floor cell A can see floor cell B, then B can
//! also see A. Opaque cells that border the lit area are reported as visible
//! themselves, so walls around a room show up.

use std::collections::HashSet;

mod quadrant;
use quadrant::{Quadrant, Row, Slope};

/// Compute the cells visible from `origin` out to Chebyshev distance
/// `range`.
///
/// `is_transparent` tells whether sight passes through a cell. It will be
/// called for cells outside any map the caller has, so it should answer
/// `false` for those. `on_visible` is called exactly once for each visible
/// cell. The origin is always visible, regardless of its own transparency or
/// a non-positive range.
pub fn compute<V>(
    origin: V,
    range: i32,
    mut is_transparent: impl FnMut(V) -> bool,
    mut on_visible: impl FnMut(V),
) where
    V: From<[i32; 2]> + Into<[i32; 2]> + Copy,
{
    on_visible(origin);
    if range <= 0 {
        return;
    }

    let [ox, oy] = origin.into();

    // Quadrants overlap along the diagonals, keep track of the diagonal
    // cells reported already. Every other cell belongs to one quadrant.
    let mut diagonals = HashSet::new();
    let mut mark = |[dx, dy]: [i32; 2]| {
        debug_assert!(dx.abs() <= range && dy.abs() <= range);
        dx.abs() != dy.abs() || diagonals.insert([dx, dy])
    };

    let mut stack = Vec::new();
    for quadrant in Quadrant::ALL {
        stack.push(Row::first());

        while let Some(mut row) = stack.pop() {
            // Transparency of the previous cell on this row.
            let mut prev = None;

            for col in row.cols() {
                let offset = quadrant.transform(row.depth, col);
                let pos = V::from([ox + offset[0], oy + offset[1]]);
                let open = is_transparent(pos);

                if (!open || row.is_symmetric(col)) && mark(offset) {
                    on_visible(pos);
                }

                match (prev, open) {
                    // Came out of a shadow, narrow the row from the start.
                    (Some(false), true) => {
                        row.start = Slope::of_cell(row.depth, col);
                    }
                    // Ran into an obstacle, the lit part so far continues
                    // on the next row.
                    (Some(true), false) if row.depth < range => {
                        let mut next = row.next();
                        next.end = Slope::of_cell(row.depth, col);
                        stack.push(next);
                    }
                    _ => {}
                }
                prev = Some(open);
            }

            if prev == Some(true) && row.depth < range {
                stack.push(row.next());
            }
        }
    }
}
