use glam::Vec2;

use crate::geometry::near_zero_eps;
use crate::grid::{Grid, TileId};

/// Steers an agent along the grid's solved path one tile center at a time.
///
/// Holds only the id of the next waypoint; positions are looked up in the
/// grid on every update so a replanned path is picked up immediately for
/// the following waypoint.
#[derive(Clone, Debug)]
pub struct NavAgent {
    next: Option<TileId>,
    arrive_radius: f32,
}

impl NavAgent {
    pub fn new(arrive_radius: f32) -> Self {
        Self { next: None, arrive_radius }
    }

    /// Agent using the grid's configured arrival radius.
    pub fn for_grid(grid: &Grid) -> Self {
        Self::new(grid.cfg().arrive_radius)
    }

    /// Aim at the first tile after the start. Returns the facing angle, or
    /// `None` when the grid has no path.
    pub fn start_path(&mut self, grid: &Grid) -> Option<f32> {
        let start = grid.start_tile();
        self.next = grid.parent(start);
        let from = grid.tile(start)?.position();
        self.heading_from(grid, from)
    }

    pub fn next_waypoint(&self) -> Option<TileId> {
        self.next
    }

    /// No waypoint left: the goal was reached, or no path was started.
    pub fn has_arrived(&self) -> bool {
        self.next.is_none()
    }

    /// Advance to the following waypoint once `position` is within the
    /// arrival radius of the current one. Returns the facing angle toward
    /// the current waypoint, `None` after arrival.
    pub fn update(&mut self, grid: &Grid, position: Vec2) -> Option<f32> {
        let next = self.next?;
        let target = grid.tile(next)?.position();
        if near_zero_eps((position - target).length(), self.arrive_radius) {
            self.next = if next == grid.end_tile() { None } else { grid.parent(next) };
        }
        self.heading_from(grid, position)
    }

    fn heading_from(&self, grid: &Grid, from: Vec2) -> Option<f32> {
        let target = grid.tile(self.next?)?.position();
        Some(facing_angle(from, target))
    }
}

/// Angle to face `to` from `from` in screen space, where +y points down.
pub fn facing_angle(from: Vec2, to: Vec2) -> f32 {
    let dir = to - from;
    (-dir.y).atan2(dir.x)
}
