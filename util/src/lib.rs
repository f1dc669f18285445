//! Unopinionated standalone utilities.

mod geom;
pub use geom::{angle_between, VecExt, DIR_4, DIR_8};

mod path;
pub use path::{astar_path, dijkstra_map};

mod rng;
pub use rng::{srng, RngExt};

pub type FastHasher = rustc_hash::FxHasher;

/// Map with an efficient hash function.
pub use rustc_hash::FxHashMap as HashMap;

/// Set with an efficient hash function.
pub use rustc_hash::FxHashSet as HashSet;

/// Good default concrete rng.
pub type GameRng = rand_xorshift::XorShiftRng;
