//! tilephys: collision queries and grid pathfinding for a small actor-based
//! game engine (primitives, narrowphase tests, box world, A* tile grid)

pub mod types;
pub mod error;
pub mod config;
pub mod geometry;
pub mod api;
pub mod narrowphase;
pub mod world;
pub mod grid;
pub mod nav;

pub use crate::types::*;
pub use crate::api::*;
pub use crate::config::{Config, GridConfig, WorldConfig};
pub use crate::error::{ConfigError, GridError};
pub use crate::geometry::{near_zero, Aabb, Capsule, Circle, ConvexPolygon, LineSegment, Plane, Sphere};
pub use crate::narrowphase::{Narrowphase, Shape};
pub use crate::world::{BoxComponent, PhysWorld};
pub use crate::grid::{Grid, SearchState, Tile, TileId, TileState};
pub use crate::nav::NavAgent;
