//! Game logic layer machinery.

mod agent;
pub use agent::{Alert, Enemy, Player};

mod ai;
pub use ai::{Chase, Pursuit, TurnReport, Wander};

mod config;
pub use config::SessionConfig;

mod fov;
pub use crate::fov::{is_within_cone_angle, Vision, VisibilityMap};

mod grid;
pub use grid::{Cell, GridMap};

pub mod mapgen;
pub use mapgen::Layout;

mod msg;
pub use msg::{Msg, Rejection};

mod pathing;
pub use pathing::{Path, PathSettings, Pathfinder, Ticket};

pub mod prelude;

mod runtime;
pub use runtime::Session;

mod status;
pub use status::{evaluate, ScenarioStatus};

mod turn;
pub use turn::{OverBudget, Turn, TurnController};

pub type Result<T, E = anyhow::Error> = std::result::Result<T, E>;
