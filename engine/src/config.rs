//! Session setup parameters.

use std::str::FromStr;

use anyhow::bail;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{prelude::*, PathSettings, Result, Vision};

/// Everything that's fixed when a session starts.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SessionConfig {
    /// Seed string for the session generator. Empty means pick one at
    /// random.
    pub seed: String,

    pub grid_width: i32,
    pub grid_height: i32,
    /// Chance for each cell to be generated as blocked.
    pub obstacle_probability: f64,
    /// Side length of a tile in pixels, used only for converting between
    /// screen and grid coordinates.
    pub tile_size: i32,

    /// Player move budget per turn.
    pub max_move_distance: u32,

    pub enemy_count: usize,
    pub enemy_vision_range: i32,
    /// View cone width in degrees, used when `enemy_vision_cone` is set.
    pub enemy_vision_angle: f32,
    pub enemy_vision_cone: bool,
    pub enemy_max_move_distance: u32,

    pub allow_diagonals: bool,
    pub allow_corner_cutting: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            seed: Default::default(),
            grid_width: 20,
            grid_height: 14,
            obstacle_probability: 0.1,
            tile_size: 40,
            max_move_distance: 4,
            enemy_count: 3,
            enemy_vision_range: 3,
            enemy_vision_angle: 90.0,
            enemy_vision_cone: false,
            enemy_max_move_distance: 5,
            allow_diagonals: true,
            allow_corner_cutting: true,
        }
    }
}

impl FromStr for SessionConfig {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let ret: SessionConfig = idm::from_str(s)?;
        ret.validate()?;
        Ok(ret)
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.grid_width <= 0 || self.grid_height <= 0 {
            bail!(
                "SessionConfig: Bad grid size {}x{}",
                self.grid_width,
                self.grid_height
            );
        }
        if self.grid_width.checked_mul(self.grid_height).is_none() {
            bail!(
                "SessionConfig: Grid size {}x{} is too large",
                self.grid_width,
                self.grid_height
            );
        }
        if !(0.0..=1.0).contains(&self.obstacle_probability) {
            bail!(
                "SessionConfig: Obstacle probability {} not in [0, 1]",
                self.obstacle_probability
            );
        }
        if self.tile_size <= 0 {
            bail!("SessionConfig: Bad tile size {}", self.tile_size);
        }
        if self.enemy_vision_range < 0 {
            bail!(
                "SessionConfig: Negative vision range {}",
                self.enemy_vision_range
            );
        }
        if !(0.0..=360.0).contains(&self.enemy_vision_angle) {
            bail!(
                "SessionConfig: Vision angle {} not in [0, 360]",
                self.enemy_vision_angle
            );
        }
        Ok(())
    }

    /// Perception of a freshly spawned enemy.
    pub fn vision(&self) -> Vision {
        Vision {
            range: self.enemy_vision_range,
            cone: self.enemy_vision_cone.then_some(self.enemy_vision_angle),
        }
    }

    pub fn path_settings(&self) -> PathSettings {
        PathSettings {
            allow_diagonals: self.allow_diagonals,
            allow_corner_cutting: self.allow_corner_cutting,
        }
    }

    /// Tile under a pixel position. May be off the map.
    pub fn tile_at_pixel(&self, pixel: Vec2) -> IVec2 {
        (pixel / self.tile_size as f32).floor().as_ivec2()
    }

    /// Pixel position of the center of a tile.
    pub fn pixel_center(&self, tile: IVec2) -> Vec2 {
        let s = self.tile_size as f32;
        tile.as_vec2() * s + Vec2::splat(s / 2.0)
    }
}
