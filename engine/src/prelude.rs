pub use crate::{
    Enemy, GridMap, Msg, Player, ScenarioStatus, Session, SessionConfig, Turn,
};
pub use glam::{ivec2, IVec2};
pub use util::{HashMap, HashSet, VecExt, DIR_4, DIR_8};
