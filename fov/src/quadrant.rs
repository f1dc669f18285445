use std::cmp::Ordering;

/// Exact rational slope of a ray from the origin, `num / den` with a
/// positive denominator.
///
/// Slopes are measured as column offset per unit of depth, so the full
/// quadrant spans from -1 to 1.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) struct Slope {
    num: i32,
    den: i32,
}

impl Slope {
    pub const fn new(num: i32, den: i32) -> Self {
        debug_assert!(den > 0);
        Slope { num, den }
    }

    /// Slope of the left edge of the cell at `col` on the row at `depth`.
    pub const fn of_cell(depth: i32, col: i32) -> Self {
        Slope::new(2 * col - 1, 2 * depth)
    }

    /// `depth * self` rounded to the nearest integer, halves round up.
    fn round_ties_up(self, depth: i32) -> i32 {
        (2 * depth * self.num + self.den).div_euclid(2 * self.den)
    }

    /// `depth * self` rounded to the nearest integer, halves round down.
    fn round_ties_down(self, depth: i32) -> i32 {
        -(self.den - 2 * depth * self.num).div_euclid(2 * self.den)
    }

    /// Compare `col` against `depth * self`.
    fn cmp_scaled(self, depth: i32, col: i32) -> Ordering {
        (col * self.den).cmp(&(depth * self.num))
    }
}

/// One row of a quadrant scan, the cells at a fixed depth between two
/// slopes.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Row {
    pub depth: i32,
    pub start: Slope,
    pub end: Slope,
}

impl Row {
    /// The row right next to the origin that covers the whole quadrant.
    pub const fn first() -> Self {
        Row {
            depth: 1,
            start: Slope::new(-1, 1),
            end: Slope::new(1, 1),
        }
    }

    pub fn next(&self) -> Self {
        Row {
            depth: self.depth + 1,
            ..*self
        }
    }

    /// Column range touched by the row's sector.
    pub fn cols(&self) -> std::ops::RangeInclusive<i32> {
        self.start.round_ties_up(self.depth)
            ..=self.end.round_ties_down(self.depth)
    }

    /// Whether the center of the cell at `col` lies inside the sector.
    ///
    /// Floor cells are only lit when this holds, which is what makes the
    /// result symmetric between two floor cells.
    pub fn is_symmetric(&self, col: i32) -> bool {
        self.start.cmp_scaled(self.depth, col) != Ordering::Less
            && self.end.cmp_scaled(self.depth, col) != Ordering::Greater
    }
}

/// The four cardinal quadrants scanned around the origin.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Quadrant {
    North,
    East,
    South,
    West,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::North,
        Quadrant::East,
        Quadrant::South,
        Quadrant::West,
    ];

    /// Convert a quadrant-local (depth, col) pair into an offset from the
    /// origin.
    pub fn transform(self, depth: i32, col: i32) -> [i32; 2] {
        match self {
            Quadrant::North => [col, -depth],
            Quadrant::East => [depth, col],
            Quadrant::South => [col, depth],
            Quadrant::West => [-depth, col],
        }
    }
}
