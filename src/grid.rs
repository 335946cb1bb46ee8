//! Tile grid with A* pathfinding and path-preserving tower placement.
//!
//! The grid owns its tiles. A* bookkeeping lives in a [`SearchState`]
//! indexed in parallel with the tile array, so a search can run against an
//! immutable grid with caller-owned scratch space.
//!
//! The grid searches from the goal back to the start. Following
//! [`Grid::parent`] from any reached tile therefore walks toward the goal,
//! which is what navigating enemies need.

use glam::Vec2;
use log::{debug, info, warn};

use crate::config::GridConfig;
use crate::error::GridError;

/// (row, col) address of a tile. Orders row-major.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileId {
    pub row: usize,
    pub col: usize,
}

impl TileId {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Grid steps between two tiles with orthogonal moves only.
    pub fn manhattan(self, other: TileId) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

/// Display state consumed by the UI layer. The search never reads it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TileState {
    #[default]
    Default,
    Path,
    Start,
    Base,
}

#[derive(Clone, Debug)]
pub struct Tile {
    id: TileId,
    position: Vec2,
    adjacent: Vec<TileId>,
    blocked: bool,
    state: TileState,
    selected: bool,
}

impl Tile {
    pub fn id(&self) -> TileId {
        self.id
    }

    /// Center of the tile in screen space.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Orthogonal neighbours: up, down, left, right (when present).
    pub fn adjacent(&self) -> &[TileId] {
        &self.adjacent
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn state(&self) -> TileState {
        self.state
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }
}

/// Per-tile A* scratch values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct NodeScratch {
    pub g: f32,
    pub h: f32,
    pub f: f32,
    pub parent: Option<TileId>,
    pub in_open: bool,
    pub in_closed: bool,
}

/// A* bookkeeping for every tile of one grid. Only meaningful right after
/// the search that filled it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchState {
    nodes: Vec<NodeScratch>,
    cols: usize,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self, rows: usize, cols: usize) {
        self.cols = cols;
        self.nodes.clear();
        self.nodes.resize(rows * cols, NodeScratch::default());
    }

    pub fn node(&self, id: TileId) -> Option<&NodeScratch> {
        if id.col >= self.cols {
            return None;
        }
        self.nodes.get(id.row * self.cols + id.col)
    }

    pub fn parent(&self, id: TileId) -> Option<TileId> {
        self.node(id).and_then(|n| n.parent)
    }

    fn at(&mut self, id: TileId) -> &mut NodeScratch {
        &mut self.nodes[id.row * self.cols + id.col]
    }
}

pub struct Grid {
    cfg: GridConfig,
    tiles: Vec<Tile>,
    search: SearchState,
    selected: Option<TileId>,
}

impl Grid {
    /// Build the tile array, wire orthogonal adjacency and solve the
    /// initial path.
    pub fn new(cfg: GridConfig) -> Result<Self, GridError> {
        cfg.check()?;
        let (rows, cols, ts) = (cfg.rows, cfg.cols, cfg.tile_size);

        let mut tiles = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let mut adjacent = Vec::with_capacity(4);
                if row > 0 {
                    adjacent.push(TileId::new(row - 1, col));
                }
                if row + 1 < rows {
                    adjacent.push(TileId::new(row + 1, col));
                }
                if col > 0 {
                    adjacent.push(TileId::new(row, col - 1));
                }
                if col + 1 < cols {
                    adjacent.push(TileId::new(row, col + 1));
                }
                tiles.push(Tile {
                    id: TileId::new(row, col),
                    position: Vec2::new(ts / 2.0 + col as f32 * ts, cfg.start_y + row as f32 * ts),
                    adjacent,
                    blocked: false,
                    state: TileState::Default,
                    selected: false,
                });
            }
        }

        let mut grid = Self { cfg, tiles, search: SearchState::new(), selected: None };
        let (start, goal) = (grid.start_tile(), grid.end_tile());
        grid.tile_mut(start).state = TileState::Start;
        grid.tile_mut(goal).state = TileState::Base;

        grid.find_path(goal, start);
        grid.update_path_tiles();
        Ok(grid)
    }

    fn index(&self, id: TileId) -> Option<usize> {
        (id.row < self.cfg.rows && id.col < self.cfg.cols).then(|| id.row * self.cfg.cols + id.col)
    }

    // Only called with ids produced by the grid itself
    fn tile_mut(&mut self, id: TileId) -> &mut Tile {
        let cols = self.cfg.cols;
        &mut self.tiles[id.row * cols + id.col]
    }

    /// Layout the grid was built with. Fixed for the grid's lifetime.
    pub fn cfg(&self) -> &GridConfig {
        &self.cfg
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.index(id).map(|i| &self.tiles[i])
    }

    pub fn tile_at(&self, row: usize, col: usize) -> Result<&Tile, GridError> {
        self.tile(TileId::new(row, col)).ok_or(GridError::TileOutOfBounds {
            row,
            col,
            rows: self.cfg.rows,
            cols: self.cfg.cols,
        })
    }

    /// All tiles, row-major.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn start_tile(&self) -> TileId {
        TileId::new(self.cfg.start.0, self.cfg.start.1)
    }

    /// The base enemies walk to.
    pub fn end_tile(&self) -> TileId {
        TileId::new(self.cfg.goal.0, self.cfg.goal.1)
    }

    pub fn selected_tile(&self) -> Option<TileId> {
        self.selected
    }

    pub fn is_blocked(&self, id: TileId) -> bool {
        self.tile(id).is_some_and(|t| t.blocked)
    }

    /// Scratch state of the last search run by this grid.
    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    /// Next tile toward the goal from `id`, as left by the last search.
    pub fn parent(&self, id: TileId) -> Option<TileId> {
        self.search.parent(id)
    }

    /// Run A* from `start` to `goal` over unblocked tiles, storing the
    /// result in the grid's own search state.
    pub fn find_path(&mut self, start: TileId, goal: TileId) -> bool {
        let mut search = std::mem::take(&mut self.search);
        let found = self.find_path_with(start, goal, &mut search);
        self.search = search;
        found
    }

    /// Run A* into caller-owned scratch space. `state` is fully reset first.
    ///
    /// Edge cost is one tile size, the heuristic is straight-line distance
    /// to `goal`. Among open tiles with equal `f` the lowest row, then
    /// lowest column, is expanded first.
    pub fn find_path_with(&self, start: TileId, goal: TileId, state: &mut SearchState) -> bool {
        state.reset(self.cfg.rows, self.cfg.cols);
        let (Some(si), Some(gi)) = (self.index(start), self.index(goal)) else {
            warn!("find_path: {:?} -> {:?} is outside the grid", start, goal);
            return false;
        };
        let goal_pos = self.tiles[gi].position;
        let step = self.cfg.tile_size;

        let mut open: Vec<TileId> = Vec::new();
        let mut current = self.tiles[si].id;
        state.at(current).in_closed = true;
        let mut expanded = 0usize;

        while current != goal {
            let current_g = state.at(current).g;
            for &neighbor in &self.tiles[current.row * self.cfg.cols + current.col].adjacent {
                let tile = &self.tiles[neighbor.row * self.cfg.cols + neighbor.col];
                if tile.blocked {
                    continue;
                }
                let node = state.at(neighbor);
                if node.in_closed {
                    continue;
                }
                let new_g = current_g + step;
                if !node.in_open {
                    node.parent = Some(current);
                    node.h = (tile.position - goal_pos).length();
                    node.g = new_g;
                    node.f = node.g + node.h;
                    node.in_open = true;
                    open.push(neighbor);
                } else if new_g < node.g {
                    node.parent = Some(current);
                    node.g = new_g;
                    node.f = node.g + node.h;
                }
            }

            let f_of = |id: &TileId| state.node(*id).map_or(f32::INFINITY, |n| n.f);
            let best = open
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| f_of(*a).total_cmp(&f_of(*b)).then(a.cmp(b)))
                .map(|(i, _)| i);
            let Some(pos) = best else {
                debug!("find_path: {:?} -> {:?} unreachable after {} expansions", start, goal, expanded);
                return false;
            };
            current = open.swap_remove(pos);
            let node = state.at(current);
            node.in_open = false;
            node.in_closed = true;
            expanded += 1;
        }

        debug!("find_path: {:?} -> {:?} found after {} expansions", start, goal, expanded);
        true
    }

    /// Tiles from the start to the goal following the last search's parent
    /// chain. Empty when the chain is broken.
    pub fn path(&self) -> Vec<TileId> {
        let goal = self.end_tile();
        let mut out = vec![self.start_tile()];
        let mut current = self.start_tile();
        while current != goal {
            match self.parent(current) {
                // A chain longer than the grid means stale scratch data
                Some(next) if out.len() <= self.tiles.len() => {
                    out.push(next);
                    current = next;
                }
                _ => return Vec::new(),
            }
        }
        out
    }

    /// Block the selected tile if the goal stays reachable.
    ///
    /// On success returns the tile center where the tower goes. When the
    /// block would cut every path, the tile is unblocked again and the
    /// previous path is recomputed, so the grid is left as it was.
    pub fn build_tower(&mut self) -> Option<Vec2> {
        let id = self.selected?;
        if self.is_blocked(id) {
            return None;
        }

        self.tile_mut(id).blocked = true;
        let (start, goal) = (self.start_tile(), self.end_tile());
        let built = if self.find_path(goal, start) {
            info!("tower built on {:?}", id);
            Some(self.tile_mut(id).position)
        } else {
            info!("tower on {:?} rejected: it would block the only path", id);
            self.tile_mut(id).blocked = false;
            self.find_path(goal, start);
            None
        };
        self.update_path_tiles();
        built
    }

    /// Select a tile for building. The start and base cannot be selected.
    /// Returns whether the selection changed to `(row, col)`.
    pub fn select_tile(&mut self, row: usize, col: usize) -> Result<bool, GridError> {
        let id = self.tile_at(row, col)?.id;
        if matches!(self.tile_mut(id).state, TileState::Start | TileState::Base) {
            return Ok(false);
        }
        if let Some(prev) = self.selected {
            self.tile_mut(prev).selected = false;
        }
        self.selected = Some(id);
        self.tile_mut(id).selected = true;
        Ok(true)
    }

    /// Map a screen-space click to a tile and select it.
    pub fn process_click(&mut self, x: i32, y: i32) -> Option<TileId> {
        let ts = self.cfg.tile_size as i32;
        if ts <= 0 {
            return None;
        }
        let y = y - (self.cfg.start_y - self.cfg.tile_size / 2.0) as i32;
        if x < 0 || y < 0 {
            return None;
        }
        let (row, col) = ((y / ts) as usize, (x / ts) as usize);
        match self.select_tile(row, col) {
            Ok(true) => Some(TileId::new(row, col)),
            _ => None,
        }
    }

    /// Reset display states and mark the tiles between start and base that
    /// lie on the current path.
    pub fn update_path_tiles(&mut self) {
        for tile in &mut self.tiles {
            if !matches!(tile.state, TileState::Start | TileState::Base) {
                tile.state = TileState::Default;
            }
        }
        let path = self.path();
        if path.len() > 2 {
            for id in &path[1..path.len() - 1] {
                self.tile_mut(*id).state = TileState::Path;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(rows: usize, cols: usize, start: (usize, usize), goal: (usize, usize)) -> Grid {
        Grid::new(GridConfig { rows, cols, start, goal, ..Default::default() }).unwrap()
    }

    fn build_at(grid: &mut Grid, row: usize, col: usize) -> Option<Vec2> {
        assert!(grid.select_tile(row, col).unwrap());
        grid.build_tower()
    }

    #[test]
    fn test_default_board_layout() {
        let grid = Grid::new(GridConfig::default()).unwrap();
        assert_eq!(grid.tiles().len(), 7 * 16);
        let t = grid.tile_at(3, 0).unwrap();
        assert_eq!(t.position(), Vec2::new(32.0, 192.0 + 3.0 * 64.0));
        assert_eq!(t.state(), TileState::Start);
        assert_eq!(grid.tile_at(3, 15).unwrap().state(), TileState::Base);
        // Corner has 2 neighbours, edge 3, interior 4
        assert_eq!(grid.tile_at(0, 0).unwrap().adjacent().len(), 2);
        assert_eq!(grid.tile_at(0, 5).unwrap().adjacent().len(), 3);
        assert_eq!(grid.tile_at(3, 5).unwrap().adjacent().len(), 4);
    }

    #[test]
    fn test_initial_path_is_straight_row() {
        let grid = Grid::new(GridConfig::default()).unwrap();
        let path = grid.path();
        assert_eq!(path.len(), 16);
        assert!(path.iter().all(|id| id.row == 3));
        for col in 1..15 {
            assert_eq!(grid.tile_at(3, col).unwrap().state(), TileState::Path);
        }
        assert_eq!(grid.tile_at(2, 5).unwrap().state(), TileState::Default);
    }

    #[test]
    fn test_unblocked_path_length_is_manhattan() {
        let grid = small(6, 9, (0, 0), (5, 8));
        let path = grid.path();
        assert_eq!(path.len() - 1, TileId::new(0, 0).manhattan(TileId::new(5, 8)));
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan(pair[1]), 1);
        }
    }

    #[test]
    fn test_search_state_g_is_steps_times_tile_size() {
        let grid = small(3, 5, (1, 0), (1, 4));
        // The search ran from the goal, so g at the start is the full cost
        let node = grid.search_state().node(grid.start_tile()).unwrap();
        assert_eq!(node.g, 4.0 * 64.0);
        assert!(node.in_closed);
        assert!(grid.search_state().parent(grid.end_tile()).is_none());
    }

    #[test]
    fn test_deterministic_tie_break_prefers_low_row() {
        // Every shortest path from (0,0) to (1,1) costs the same
        let mut grid = small(2, 2, (0, 0), (1, 1));
        assert!(grid.find_path(TileId::new(0, 0), TileId::new(1, 1)));
        // Both (0,1) and (1,0) tie on f; (0,1) is expanded, and reaches the goal
        assert_eq!(grid.parent(TileId::new(1, 1)), Some(TileId::new(0, 1)));
    }

    #[test]
    fn test_tower_detour() {
        let mut grid = small(3, 5, (1, 0), (1, 4));
        let pos = build_at(&mut grid, 1, 2).unwrap();
        assert_eq!(pos, grid.tile_at(1, 2).unwrap().position());
        assert!(grid.is_blocked(TileId::new(1, 2)));
        let path = grid.path();
        assert_eq!(path.len() - 1, 6);
        assert!(!path.contains(&TileId::new(1, 2)));
        // Building again on a blocked tile is a no-op
        assert!(grid.build_tower().is_none());
    }

    #[test]
    fn test_tower_that_cuts_the_path_is_rejected() {
        let mut grid = small(3, 5, (1, 0), (1, 4));
        assert!(build_at(&mut grid, 0, 2).is_some());
        assert!(build_at(&mut grid, 2, 2).is_some());
        let before_state = grid.search_state().clone();
        let before_path = grid.path();

        assert!(build_at(&mut grid, 1, 2).is_none());
        assert!(!grid.is_blocked(TileId::new(1, 2)));
        assert_eq!(grid.path(), before_path);
        assert_eq!(*grid.search_state(), before_state);
        assert_eq!(grid.tile_at(1, 2).unwrap().state(), TileState::Path);
    }

    #[test]
    fn test_build_never_completes_a_wall() {
        let mut grid = small(3, 3, (1, 0), (1, 2));
        assert!(build_at(&mut grid, 0, 1).is_some());
        assert!(build_at(&mut grid, 2, 1).is_some());
        assert!(build_at(&mut grid, 1, 1).is_none());
        assert!(grid.find_path(grid.end_tile(), grid.start_tile()));
    }

    #[test]
    fn test_find_path_fails_when_walled_off() {
        let mut grid = small(3, 3, (1, 0), (1, 2));
        for row in 0..3 {
            grid.tile_mut(TileId::new(row, 1)).blocked = true;
        }
        assert!(!grid.find_path(grid.end_tile(), grid.start_tile()));
        assert!(grid.path().is_empty());
    }

    #[test]
    fn test_find_path_with_external_state_leaves_grid_untouched() {
        let grid = small(4, 4, (0, 0), (3, 3));
        let before = grid.search_state().clone();
        let mut scratch = SearchState::new();
        assert!(grid.find_path_with(TileId::new(3, 0), TileId::new(0, 3), &mut scratch));
        assert_eq!(*grid.search_state(), before);
        assert!(scratch.parent(TileId::new(0, 3)).is_some());
    }

    #[test]
    fn test_find_path_out_of_bounds() {
        let mut grid = small(2, 2, (0, 0), (1, 1));
        assert!(!grid.find_path(TileId::new(0, 0), TileId::new(5, 5)));
    }

    #[test]
    fn test_select_tile_rules() {
        let mut grid = Grid::new(GridConfig::default()).unwrap();
        assert_eq!(grid.select_tile(3, 0), Ok(false));
        assert_eq!(grid.select_tile(3, 15), Ok(false));
        assert!(grid.selected_tile().is_none());
        assert_eq!(grid.select_tile(1, 1), Ok(true));
        assert_eq!(grid.select_tile(2, 2), Ok(true));
        assert!(!grid.tile_at(1, 1).unwrap().is_selected());
        assert!(grid.tile_at(2, 2).unwrap().is_selected());
        assert!(matches!(grid.select_tile(9, 0), Err(GridError::TileOutOfBounds { .. })));
    }

    #[test]
    fn test_process_click_maps_pixels() {
        let mut grid = Grid::new(GridConfig::default()).unwrap();
        // Row 0 spans y in [160, 224) on screen
        assert_eq!(grid.process_click(70, 165), Some(TileId::new(0, 1)));
        assert_eq!(grid.process_click(10, 100), None);
        assert_eq!(grid.process_click(5000, 200), None);
        // Start tile cannot be picked
        assert_eq!(grid.process_click(10, 160 + 3 * 64), None);
        assert_eq!(grid.selected_tile(), Some(TileId::new(0, 1)));
    }

    #[test]
    fn test_build_without_selection() {
        let mut grid = Grid::new(GridConfig::default()).unwrap();
        assert!(grid.build_tower().is_none());
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let cfg = GridConfig { rows: 0, ..Default::default() };
        assert!(matches!(Grid::new(cfg), Err(GridError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_new_rejects_bad_tile_size_and_radius() {
        for tile_size in [0.0, -64.0, f32::NAN, f32::INFINITY] {
            let cfg = GridConfig { tile_size, ..Default::default() };
            assert!(matches!(Grid::new(cfg), Err(GridError::InvalidTileSize(_))));
        }
        let cfg = GridConfig { arrive_radius: -0.5, ..Default::default() };
        assert_eq!(Grid::new(cfg).err(), Some(GridError::InvalidArriveRadius(-0.5)));
    }

    #[test]
    fn test_cfg_accessor_reports_layout() {
        let cfg = GridConfig { rows: 4, cols: 5, start: (0, 0), goal: (3, 4), ..Default::default() };
        let grid = Grid::new(cfg.clone()).unwrap();
        assert_eq!(*grid.cfg(), cfg);
        assert_eq!(grid.tiles().len(), grid.cfg().rows * grid.cfg().cols);
    }

    #[test]
    fn test_out_of_range_column_has_no_scratch() {
        let grid = Grid::new(GridConfig::default()).unwrap();
        // Column 16 would wrap onto (3, 0) with unchecked row-major math
        let id = TileId::new(2, 16);
        assert!(grid.parent(TileId::new(3, 0)).is_some());
        assert!(grid.parent(id).is_none());
        assert!(grid.search_state().node(id).is_none());
        assert!(grid.tile(id).is_none());
        assert!(grid.search_state().node(TileId::new(7, 0)).is_none());
    }
}
