//! World and grid configuration, loadable from TOML.
//!
//! Missing fields fall back to the defaults below; unknown fields are
//! rejected so typos do not silently become defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, GridError};
use crate::types::Axis;

/// Configuration trait
pub trait Config: for<'de> Deserialize<'de> + Default {
    /// Check values that parsed but cannot be used.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Parse and validate a TOML document.
    fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from a TOML file
    fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

/// Spatial world settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Axis the sweep-and-prune pass sorts and sweeps along. Pick the axis
    /// along which boxes are most spread out.
    pub sweep_axis: Axis,
}

impl Config for WorldConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Tile grid layout. Defaults reproduce the tower-defense board: 7 rows of
/// 16 tiles, 64 px each, path from the left edge to the right edge of the
/// middle row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
    /// Edge length of a tile, also the cost of one step between tiles.
    pub tile_size: f32,
    /// Screen y of the first row's tile centers.
    pub start_y: f32,
    /// (row, col) enemies spawn on.
    pub start: (usize, usize),
    /// (row, col) of the base enemies walk to.
    pub goal: (usize, usize),
    /// How close a navigating agent must get to a tile center before it
    /// moves on to the next one.
    pub arrive_radius: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 7,
            cols: 16,
            tile_size: 64.0,
            start_y: 192.0,
            start: (3, 0),
            goal: (3, 15),
            arrive_radius: 2.0,
        }
    }
}

impl GridConfig {
    /// Structural checks shared by [`Config::validate`] and grid construction.
    pub fn check(&self) -> Result<(), GridError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GridError::InvalidDimensions { rows: self.rows, cols: self.cols });
        }
        for (row, col) in [self.start, self.goal] {
            if row >= self.rows || col >= self.cols {
                return Err(GridError::TileOutOfBounds { row, col, rows: self.rows, cols: self.cols });
            }
        }
        if self.start == self.goal {
            return Err(GridError::StartIsGoal);
        }
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(GridError::InvalidTileSize(self.tile_size));
        }
        if !(self.arrive_radius >= 0.0) {
            return Err(GridError::InvalidArriveRadius(self.arrive_radius));
        }
        Ok(())
    }
}

impl Config for GridConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.check().map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
