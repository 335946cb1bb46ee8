//! Error types for configuration and grid construction.
//!
//! Geometric queries never produce errors; see the `Option` returns in
//! [`crate::narrowphase`].

/// Configuration errors.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parsed but do not describe a usable grid or world
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Grid construction and addressing errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("grid must have at least one row and one column (got {rows}x{cols})")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("tile ({row}, {col}) is outside a {rows}x{cols} grid")]
    TileOutOfBounds { row: usize, col: usize, rows: usize, cols: usize },

    #[error("start and goal tiles must differ")]
    StartIsGoal,

    #[error("tile_size must be positive and finite, got {0}")]
    InvalidTileSize(f32),

    #[error("arrive_radius must not be negative, got {0}")]
    InvalidArriveRadius(f32),
}
